use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{KeyMapping, Side};

// ---------------------------------------------------------------------------
// Normalization rules
// ---------------------------------------------------------------------------

/// Rules that apply to one side only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideRules {
    pub remove_leading_zeros: bool,
    pub leading_zero_fields: BTreeSet<String>,
    pub normalize_dates: bool,
    pub date_fields: BTreeSet<String>,
}

impl SideRules {
    pub fn strips_leading_zeros(&self, field: &str) -> bool {
        self.remove_leading_zeros && self.leading_zero_fields.contains(field)
    }

    pub fn parses_dates(&self, field: &str) -> bool {
        self.normalize_dates && self.date_fields.contains(field)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationRules {
    /// Global: strip all whitespace, not just the edges.
    pub trim_whitespace: bool,
    pub a: SideRules,
    pub b: SideRules,
}

impl NormalizationRules {
    pub fn side(&self, side: Side) -> &SideRules {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison config
// ---------------------------------------------------------------------------

/// Immutable snapshot handed to `compare`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default, rename = "keys")]
    pub key_mappings: Vec<KeyMapping>,
    #[serde(default)]
    pub rules: NormalizationRules,
}

impl ComparisonConfig {
    pub fn new(key_mappings: Vec<KeyMapping>, rules: NormalizationRules) -> Self {
        Self {
            key_mappings,
            rules,
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.key_mappings.is_empty() {
            return Err(ReconError::EmptyKeyMappings);
        }

        for (i, mapping) in self.key_mappings.iter().enumerate() {
            if mapping.field_a.trim().is_empty() || mapping.field_b.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "key mapping #{} has a blank field name",
                    i + 1
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Display name; defaults to the file name.
    #[serde(default)]
    pub name: Option<String>,
    pub file: String,
}

impl SourceConfig {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.file,
        }
    }
}

/// A `.recon.toml` job: where the two sources live plus the comparison
/// config.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub name: String,
    pub source_a: SourceConfig,
    pub source_b: SourceConfig,
    #[serde(flatten)]
    pub comparison: ComparisonConfig,
}

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: JobConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (side, source) in [(Side::A, &self.source_a), (Side::B, &self.source_b)] {
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "source_{}: file must not be empty",
                    side.to_string().to_lowercase()
                )));
            }
        }

        self.comparison.validate()
    }

    pub fn source(&self, side: Side) -> &SourceConfig {
        match side {
            Side::A => &self.source_a,
            Side::B => &self.source_b,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
