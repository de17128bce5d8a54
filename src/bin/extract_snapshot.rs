//! Snapshot Extraction Binary
//!
//! Runs the extraction profiles against saved page sources, without a
//! browser:
//! - `overview.html` is matched with the overview profiles
//! - `promoter.html` (optional) with the promoter-tab profiles
//!
//! Prints which strategy resolved each field and the assembled record.

use anyhow::{bail, Context, Result};
use rera_projects::assembler::assemble;
use rera_projects::document::{Document, HtmlDocument};
use rera_projects::matcher::{resolve_region, Resolution};
use rera_projects::types::{FieldValues, Region};
use std::fs;

fn load(path: &str) -> Result<HtmlDocument> {
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    Ok(HtmlDocument::parse(&source))
}

fn extract(doc: &HtmlDocument, region: Region) -> FieldValues {
    println!("  title: {}", doc.title());
    let mut found = FieldValues::new();
    for (field, resolution) in resolve_region(doc, region) {
        match resolution {
            Resolution::Matched { value, strategy } => {
                println!("  ✓ {:<17} {}  [{}]", field.key(), value, strategy);
                found.insert(field, value);
            }
            Resolution::NoMatch => {
                println!("  ✗ {:<17} (no match)", field.key());
            }
        }
    }
    found
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        bail!("usage: extract_snapshot <overview.html> [promoter.html]");
    }

    println!("=== Snapshot Extraction ===");

    println!("\nOverview: {}", args[0]);
    let overview = extract(&load(&args[0])?, Region::Overview);

    let promoter = match args.get(1) {
        Some(path) => {
            println!("\nPromoter tab: {}", path);
            extract(&load(path)?, Region::PromoterTab)
        }
        None => FieldValues::new(),
    };

    let record = assemble(overview, promoter);
    println!("\n=== Record ===");
    for (field, value) in record.fields() {
        println!("{}: {}", field.label(), value);
    }
    println!("\n{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
