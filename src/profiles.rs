//! Field Extraction Profiles
//!
//! One profile per tracked field:
//! - ordered strategies, most structural first, loose text scans last
//! - a normalizer applied to every candidate text
//! - a validator that must accept the normalized text
//!
//! Overview fields come from the project detail page, the rest from the
//! "Promoter Details" tab.

use crate::document::{collapse_whitespace, Query};
use crate::types::{Field, Region};
use once_cell::sync::Lazy;
use regex::Regex;

/// Where a strategy's candidates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Query(Query),
    /// Siblings of the node holding an already-resolved field's value.
    /// Skipped when that field is unresolved.
    NearField(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub name: &'static str,
    pub source: Source,
}

impl Strategy {
    fn query(name: &'static str, query: Query) -> Self {
        Self { name, source: Source::Query(query) }
    }
}

pub struct FieldProfile {
    pub field: Field,
    pub strategies: Vec<Strategy>,
    pub normalize: fn(&str) -> String,
    pub validate: fn(&str) -> bool,
}

impl FieldProfile {
    pub fn region(&self) -> Region {
        self.field.region()
    }
}

impl std::fmt::Debug for FieldProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldProfile")
            .field("field", &self.field)
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

// ---- keyword sets ----

pub const PROJECT_NAME_STOPLIST: &[&str] =
    &["Details", "Overview", "Project", "RERA", "Registration", "Projects"];

pub const COMPANY_KEYWORDS: &[&str] =
    &["M/S", "PVT", "LTD", "PRIVATE", "DEVELOPERS", "BUILDERS", "CONSTRUCTION", "INFRA"];

pub const ADDRESS_KEYWORDS: &[&str] = &["PO-", "PIN", "Dist", "Odisha", "Plot", "Road", "Street"];

static RERA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(RP|PS)/\d{1,2}/\d{4}/\d{4,6}").expect("static RERA pattern")
});

static RERA_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(RP|PS)/\d{1,2}/\d{4}/\d{4,6}$").expect("static RERA pattern")
});

// ---- normalizers / validators ----

pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(text)
}

/// The registration number embedded in the text, or the text itself
pub fn normalize_rera(text: &str) -> String {
    match RERA_PATTERN.find(text) {
        Some(m) => m.as_str().to_string(),
        None => normalize_text(text),
    }
}

pub fn is_valid_rera(text: &str) -> bool {
    RERA_EXACT.is_match(text)
}

pub fn is_valid_project_name(text: &str) -> bool {
    text.chars().count() > 3 && !PROJECT_NAME_STOPLIST.iter().any(|w| text.contains(w))
}

pub fn is_valid_promoter_name(text: &str) -> bool {
    let upper = text.to_uppercase();
    text.chars().count() > 5 && COMPANY_KEYWORDS.iter().any(|k| upper.contains(k))
}

pub fn is_valid_address(text: &str) -> bool {
    text.chars().count() > 15 && ADDRESS_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Uppercase alphanumerics of the text when they form the 15-character
/// tax-ID shape: two digits, five letters, eight more alphanumerics.
pub fn canonical_gst(text: &str) -> Option<String> {
    let clean: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let bytes = clean.as_bytes();
    let shaped = bytes.len() == 15
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2..7].iter().all(u8::is_ascii_alphabetic);
    shaped.then_some(clean)
}

/// Canonical tax ID when the text has that shape, otherwise the trimmed text as is.
pub fn normalize_gst(text: &str) -> String {
    canonical_gst(text).unwrap_or_else(|| text.trim().to_string())
}

pub fn is_valid_gst(text: &str) -> bool {
    if canonical_gst(text).as_deref() == Some(text) {
        return true;
    }
    text.chars().count() >= 15
        && text.chars().any(|c| c.is_alphabetic())
        && text.chars().any(|c| c.is_ascii_digit())
}

// ---- strategy lists ----

const ANY_TAG: &[&str] = &[];
const TEXT_TAGS: &[&str] = &["span", "div", "p"];
const EMPHASIS_TAGS: &[&str] = &["strong", "b", "span", "div", "p"];

const RERA_PREFIX: &[&[&str]] = &[&["RP/", "PS/"]];
const MS_WITH_SUFFIX: &[&[&str]] = &[&["M/S"], &["PVT", "LTD", "PRIVATE"]];
const TRADE_WITH_SUFFIX: &[&[&str]] =
    &[&["DEVELOPERS", "BUILDERS", "CONSTRUCTION"], &["PVT", "LTD"]];
const MS_ONLY: &[&[&str]] = &[&["M/S"]];
const PO_WITH_PIN: &[&[&str]] = &[&["PO-"], &["PIN", "Dist"]];
const DIST_WITH_PIN: &[&[&str]] = &[&["Dist."], &["PIN", "PO-", "Odisha"]];
const ODISHA_LINE: &[&[&str]] = &[&["Odisha"], &["-"]];
const TITLE_EXCLUDE: &[&str] = &["Odisha"];

fn rera_strategies() -> Vec<Strategy> {
    vec![
        Strategy::query("any-own-text", Query::OwnText { tags: ANY_TAG, all_of: RERA_PREFIX }),
        Strategy::query("rera-regd-label", Query::LabelNextSibling("RERA Regd")),
        Strategy::query("registration-label", Query::LabelNextSibling("Registration")),
        Strategy::query("text-tags", Query::OwnText { tags: TEXT_TAGS, all_of: RERA_PREFIX }),
    ]
}

fn project_name_strategies() -> Vec<Strategy> {
    vec![
        Strategy::query("label-sibling", Query::LabelNextSibling("Project Name")),
        Strategy::query("label-parent-sibling", Query::LabelParentNextSibling("Project Name")),
        Strategy::query("label-following-text", Query::LabelFollowingText("Project Name")),
        Strategy::query("h1", Query::Css("h1")),
        Strategy::query("h2", Query::Css("h2")),
        Strategy::query("h3", Query::Css("h3")),
        Strategy::query("card-title", Query::Css("[class*='card-title']")),
        Strategy::query("project-title", Query::Css("[class*='project-title']")),
        Strategy::query("project-name-class", Query::Css("[class*='project-name']")),
        Strategy::query("strong", Query::Css("strong")),
        Strategy::query("bold", Query::Css("b")),
        Strategy { name: "near-rera", source: Source::NearField(Field::ReraRegdNo) },
        Strategy::query(
            "page-title",
            Query::TitleSegments { delimiter: '-', requires: "RERA", exclude: TITLE_EXCLUDE },
        ),
    ]
}

fn promoter_name_strategies() -> Vec<Strategy> {
    vec![
        Strategy::query("label-sibling", Query::LabelNextSibling("Company Name")),
        Strategy::query("label-following-text", Query::LabelFollowingText("Company Name")),
        Strategy::query("label-parent-sibling", Query::LabelParentNextSibling("Company Name")),
        Strategy::query(
            "ms-with-suffix",
            Query::OwnText { tags: ANY_TAG, all_of: MS_WITH_SUFFIX },
        ),
        Strategy::query(
            "trade-with-suffix",
            Query::OwnText { tags: ANY_TAG, all_of: TRADE_WITH_SUFFIX },
        ),
        Strategy::query(
            "ms-emphasis",
            Query::OwnText { tags: EMPHASIS_TAGS, all_of: MS_ONLY },
        ),
    ]
}

fn address_strategies() -> Vec<Strategy> {
    vec![
        Strategy::query("registered-label", Query::LabelNextSibling("Registered Office Address")),
        Strategy::query(
            "registered-following-text",
            Query::LabelFollowingText("Registered Office Address"),
        ),
        Strategy::query(
            "registered-parent-sibling",
            Query::LabelParentNextSibling("Registered Office Address"),
        ),
        Strategy::query("office-label", Query::LabelNextSibling("Office Address")),
        Strategy::query("address-label", Query::LabelFollowingSiblings("Address")),
        Strategy::query(
            "po-with-pin",
            Query::OwnText { tags: ANY_TAG, all_of: PO_WITH_PIN },
        ),
        Strategy::query(
            "dist-with-pin",
            Query::OwnText { tags: ANY_TAG, all_of: DIST_WITH_PIN },
        ),
        Strategy::query("odisha-line", Query::OwnText { tags: ANY_TAG, all_of: ODISHA_LINE }),
    ]
}

fn gst_strategies() -> Vec<Strategy> {
    vec![
        Strategy::query("gst-no-label", Query::LabelNextSibling("GST No")),
        Strategy::query("gst-no-following-text", Query::LabelFollowingText("GST No")),
        Strategy::query("gst-no-parent-sibling", Query::LabelParentNextSibling("GST No")),
        Strategy::query("gst-label", Query::LabelNextSibling("GST")),
        Strategy::query("text-tags", Query::OwnTextLength { tags: TEXT_TAGS, len: 15 }),
    ]
}

static PROFILES: Lazy<Vec<FieldProfile>> = Lazy::new(|| {
    vec![
        FieldProfile {
            field: Field::ReraRegdNo,
            strategies: rera_strategies(),
            normalize: normalize_rera,
            validate: is_valid_rera,
        },
        FieldProfile {
            field: Field::ProjectName,
            strategies: project_name_strategies(),
            normalize: normalize_text,
            validate: is_valid_project_name,
        },
        FieldProfile {
            field: Field::PromoterName,
            strategies: promoter_name_strategies(),
            normalize: normalize_text,
            validate: is_valid_promoter_name,
        },
        FieldProfile {
            field: Field::PromoterAddress,
            strategies: address_strategies(),
            normalize: normalize_text,
            validate: is_valid_address,
        },
        FieldProfile {
            field: Field::GstNo,
            strategies: gst_strategies(),
            normalize: normalize_gst,
            validate: is_valid_gst,
        },
    ]
});

/// All profiles, in the order fields are resolved.
pub fn all() -> &'static [FieldProfile] {
    &PROFILES
}

pub fn for_region(region: Region) -> impl Iterator<Item = &'static FieldProfile> {
    all().iter().filter(move |p| p.region() == region)
}

pub fn get(field: Field) -> Option<&'static FieldProfile> {
    all().iter().find(|p| p.field == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rera_accepts_both_prefixes() {
        for text in ["RP/5/2021/1234", "PS/12/2020/123456"] {
            assert!(is_valid_rera(&normalize_rera(text)), "{text}");
        }
    }

    #[test]
    fn test_rera_rejects_malformed() {
        for text in ["RP/2021/1234", "XX/5/2021/1234"] {
            assert!(!is_valid_rera(&normalize_rera(text)), "{text}");
        }
    }

    #[test]
    fn test_rera_extracts_substring() {
        assert_eq!(normalize_rera("Regd. No.: PS/3/2019/00456 (valid)"), "PS/3/2019/00456");
    }

    #[test]
    fn test_gst_canonical_round_trip() {
        assert_eq!(normalize_gst("21ABCDE1234F1Z5"), "21ABCDE1234F1Z5");
        assert!(is_valid_gst("21ABCDE1234F1Z5"));
    }

    #[test]
    fn test_gst_normalization_is_idempotent() {
        let messy = normalize_gst(" 21-abcde 1234.f1z5 ");
        assert_eq!(messy, "21ABCDE1234F1Z5");
        assert_eq!(normalize_gst(&messy), messy);
    }

    #[test]
    fn test_gst_loose_fallback_kept_verbatim() {
        let text = "GSTIN pending 2024";
        assert_eq!(normalize_gst(text), text);
        assert!(is_valid_gst(text));
        assert!(!is_valid_gst("ABC123"));
        assert!(!is_valid_gst("not a tax id at all"));
    }

    #[test]
    fn test_gst_loose_fallback_keeps_inner_spacing() {
        assert_eq!(normalize_gst("  GSTIN  pending\t2024 "), "GSTIN  pending\t2024");
    }

    #[test]
    fn test_address_label_scans_every_following_sibling() {
        let strategy = get(Field::PromoterAddress)
            .unwrap()
            .strategies
            .iter()
            .find(|s| s.name == "address-label")
            .unwrap();
        assert_eq!(strategy.source, Source::Query(Query::LabelFollowingSiblings("Address")));
    }

    #[test]
    fn test_project_name_stoplist() {
        assert!(!is_valid_project_name("Project Overview Details"));
        assert!(is_valid_project_name("Sunrise Heights"));
        assert!(!is_valid_project_name("Abc"));
    }

    #[test]
    fn test_promoter_name_keywords_case_insensitive() {
        assert!(is_valid_promoter_name("m/s Kalinga Homes"));
        assert!(is_valid_promoter_name("Utkal Infra Projects"));
        assert!(!is_valid_promoter_name("LTD"));
        assert!(!is_valid_promoter_name("Sri Jagannath Homes"));
    }

    #[test]
    fn test_address_keywords() {
        assert!(is_valid_address("Plot No 12, Saheed Nagar, Bhubaneswar"));
        assert!(!is_valid_address("Road 5"));
        assert!(!is_valid_address("Somewhere far away in the city"));
    }

    #[test]
    fn test_every_field_has_one_profile() {
        for field in Field::ALL {
            assert_eq!(all().iter().filter(|p| p.field == field).count(), 1);
            assert_eq!(get(field).map(|p| p.field), Some(field));
        }
        assert_eq!(for_region(Region::Overview).count(), 2);
        assert_eq!(for_region(Region::PromoterTab).count(), 3);
    }

    #[test]
    fn test_project_name_title_strategy_is_last() {
        let strategies = &get(Field::ProjectName).unwrap().strategies;
        assert_eq!(strategies.last().map(|s| s.name), Some("page-title"));
        assert!(strategies
            .iter()
            .any(|s| s.source == Source::NearField(Field::ReraRegdNo)));
    }
}
