use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::types::{BatchResult, Field};

const SEP: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header plus one row per record, columns in `Field::ALL` order.
pub fn write_records<W: Write>(mut w: W, batch: &BatchResult) -> io::Result<()> {
    let header: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
    write_row(&mut w, &header)?;
    for record in batch {
        let row: Vec<&str> = record.fields().map(|(_, v)| v).collect();
        write_row(&mut w, &row)?;
    }
    Ok(())
}

pub fn write_csv(path: impl AsRef<Path>, batch: &BatchResult) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let mut writer = BufWriter::new(file);
    write_records(&mut writer, batch).with_context(|| format!("Failed to write CSV to {:?}", path))?;
    writer.flush().context("Failed to flush CSV")?;
    Ok(())
}

/// Console listing of every record, numbered from 1.
pub fn render_table(batch: &BatchResult) -> String {
    let mut out = String::new();
    let rule = "=".repeat(100);

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "SCRAPED ODISHA RERA PROJECTS DATA");
    let _ = writeln!(out, "{}", rule);

    for (i, record) in batch.iter().enumerate() {
        let _ = writeln!(out, "\nProject {}:", i + 1);
        let _ = writeln!(out, "{}", "-".repeat(50));
        for (field, value) in record.fields() {
            let _ = writeln!(out, "{}: {}", field.label(), value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn sample() -> BatchResult {
        let mut batch = BatchResult::default();
        let mut record = Record::empty();
        record.set(Field::ReraRegdNo, "RP/01/2023/00012".to_string());
        record.set(Field::ProjectName, "Lotus \"Grand\" Enclave".to_string());
        record.set(Field::PromoterAddress, "Plot 5, Dist. Khordha".to_string());
        batch.push(record);
        batch.push(Record::empty());
        batch
    }

    #[test]
    fn test_write_records_quotes_and_orders_columns() {
        let mut buf = Vec::new();
        write_records(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "RERA_Regd_No,Project_Name,Promoter_Name,Promoter_Address,GST_No");
        assert_eq!(
            lines[1],
            "RP/01/2023/00012,\"Lotus \"\"Grand\"\" Enclave\",,\"Plot 5, Dist. Khordha\","
        );
        assert_eq!(lines[2], ",,,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_csv_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/projects.csv");
        write_csv(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("RERA_Regd_No,"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_render_table_lists_every_project() {
        let table = render_table(&sample());
        assert!(table.contains("Project 1:"));
        assert!(table.contains("Project 2:"));
        assert!(table.contains("RERA Regd. No: RP/01/2023/00012"));
        assert!(table.contains("GST No: "));
        assert!(!table.contains("Project 3:"));
    }
}
