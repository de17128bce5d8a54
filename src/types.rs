use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five tracked fields, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "RERA_Regd_No")]
    ReraRegdNo,
    #[serde(rename = "Project_Name")]
    ProjectName,
    #[serde(rename = "Promoter_Name")]
    PromoterName,
    #[serde(rename = "Promoter_Address")]
    PromoterAddress,
    #[serde(rename = "GST_No")]
    GstNo,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::ReraRegdNo,
        Field::ProjectName,
        Field::PromoterName,
        Field::PromoterAddress,
        Field::GstNo,
    ];

    /// Column / key name used in records and the CSV header
    pub fn key(self) -> &'static str {
        match self {
            Field::ReraRegdNo => "RERA_Regd_No",
            Field::ProjectName => "Project_Name",
            Field::PromoterName => "Promoter_Name",
            Field::PromoterAddress => "Promoter_Address",
            Field::GstNo => "GST_No",
        }
    }

    /// Human label used in the console listing
    pub fn label(self) -> &'static str {
        match self {
            Field::ReraRegdNo => "RERA Regd. No",
            Field::ProjectName => "Project Name",
            Field::PromoterName => "Promoter Name",
            Field::PromoterAddress => "Promoter Address",
            Field::GstNo => "GST No",
        }
    }

    pub fn region(self) -> Region {
        match self {
            Field::ReraRegdNo | Field::ProjectName => Region::Overview,
            Field::PromoterName | Field::PromoterAddress | Field::GstNo => Region::PromoterTab,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Navigation state a field is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Overview,
    PromoterTab,
}

/// Partial extraction result for one region: only resolved fields are present.
pub type FieldValues = HashMap<Field, String>;

/// One output row. Always carries all five fields; unresolved ones are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    #[serde(rename = "RERA_Regd_No")]
    pub rera_regd_no: String,
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Promoter_Name")]
    pub promoter_name: String,
    #[serde(rename = "Promoter_Address")]
    pub promoter_address: String,
    #[serde(rename = "GST_No")]
    pub gst_no: String,
}

impl Record {
    /// All-empty record used for failed indices
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ReraRegdNo => &self.rera_regd_no,
            Field::ProjectName => &self.project_name,
            Field::PromoterName => &self.promoter_name,
            Field::PromoterAddress => &self.promoter_address,
            Field::GstNo => &self.gst_no,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::ReraRegdNo => &mut self.rera_regd_no,
            Field::ProjectName => &mut self.project_name,
            Field::PromoterName => &mut self.promoter_name,
            Field::PromoterAddress => &mut self.promoter_address,
            Field::GstNo => &mut self.gst_no,
        };
        *slot = value;
    }

    /// (field, value) pairs in column order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn is_complete(&self) -> bool {
        self.fields().all(|(_, v)| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields().all(|(_, v)| v.is_empty())
    }
}

/// Ordered records, one per attempted index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub records: Vec<Record>,
}

impl BatchResult {
    pub fn with_capacity(n: usize) -> Self {
        Self { records: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records with every field resolved
    pub fn fully_populated(&self) -> usize {
        self.records.iter().filter(|r| r.is_complete()).count()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
