use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which side of the comparison a dataset sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// A raw row: values indexed by header position.
///
/// Rows shorter than the header list read as empty for the missing trailing
/// fields. Rows wider than the header list are kept as decoded and rejected
/// during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Build a row from `(field, value)` pairs, placing each value at its
    /// header position. Fields not in `headers` are ignored.
    pub fn from_pairs(headers: &[String], pairs: &[(&str, &str)]) -> Self {
        let mut values = vec![String::new(); headers.len()];
        for (field, value) in pairs {
            if let Some(i) = headers.iter().position(|h| h == field) {
                values[i] = (*value).to_string();
            }
        }
        Self { values }
    }

    /// Value at `idx`, empty when the row is short.
    pub fn get(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// A loaded source. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Convenience constructor from `(field, value)` pair lists.
    pub fn from_pairs(name: &str, headers: &[&str], rows: &[Vec<(&str, &str)>]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        let rows = rows.iter().map(|r| Row::from_pairs(&headers, r)).collect();
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == field)
    }
}

/// A row after every field went through the normalizer for its side.
/// Always exactly as wide as the dataset's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub values: Vec<String>,
}

impl NormalizedRow {
    pub fn get(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Pairs one column of A with one column of B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    #[serde(rename = "a")]
    pub field_a: String,
    #[serde(rename = "b")]
    pub field_b: String,
}

impl KeyMapping {
    pub fn new(field_a: impl Into<String>, field_b: impl Into<String>) -> Self {
        Self {
            field_a: field_a.into(),
            field_b: field_b.into(),
        }
    }

    pub fn field(&self, side: Side) -> &str {
        match side {
            Side::A => &self.field_a,
            Side::B => &self.field_b,
        }
    }
}

/// Normalized key parts in mapping order. Compared part by part, so a value
/// containing the display delimiter never collides with another split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(pub Vec<String>);

impl CompositeKey {
    pub const DISPLAY_DELIMITER: char = '|';
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::DISPLAY_DELIMITER)?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A reported row: `(field, value)` pairs in header order. Serializes as a
/// plain JSON object and encodes directly as a CSV record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn from_normalized(headers: &[String], row: &NormalizedRow) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).to_string()))
            .collect();
        Self { fields }
    }

    /// The raw row as decoded, padded with empty values to header width.
    pub fn from_raw(headers: &[String], row: &Row) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A duplicated row and how many times its signature occurred (including
/// the retained first occurrence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub record: Record,
    pub count: usize,
}

impl DuplicateRecord {
    pub const COUNT_FIELD: &'static str = "Count";

    /// The record with a trailing `Count` field, ready for CSV export.
    pub fn to_export_record(&self) -> Record {
        let mut fields = self.record.fields.clone();
        fields.push((Self::COUNT_FIELD.to_string(), self.count.to_string()));
        Record { fields }
    }
}

impl Serialize for DuplicateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.fields.len() + 1))?;
        for (name, value) in &self.record.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(Self::COUNT_FIELD, &self.count)?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonStats {
    pub total_a: usize,
    pub total_b: usize,
    pub valid_unique_a: usize,
    pub valid_unique_b: usize,
    pub duplicates_a: usize,
    pub duplicates_b: usize,
    pub skipped_a: usize,
    pub skipped_b: usize,
    /// Rows of B whose key is absent from A.
    pub missing_in_a: usize,
    /// Rows of A whose key is absent from B.
    pub missing_in_b: usize,
    pub keys_only_in_a: usize,
    pub keys_only_in_b: usize,
    pub matched: usize,
}

impl ComparisonStats {
    /// True when neither side has a row the other lacks.
    pub fn is_reconciled(&self) -> bool {
        self.missing_in_a == 0 && self.missing_in_b == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub source_a_name: String,
    pub source_b_name: String,
    pub stats: ComparisonStats,
    pub keys_only_in_a: Vec<String>,
    pub keys_only_in_b: Vec<String>,
    pub rows_missing_in_b: Vec<Record>,
    pub rows_missing_in_a: Vec<Record>,
    pub duplicated_rows_a: Vec<DuplicateRecord>,
    pub duplicated_rows_b: Vec<DuplicateRecord>,
    pub timestamp: String,
}
