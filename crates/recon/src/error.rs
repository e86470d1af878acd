use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (blank field name, missing source file, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// No key mappings configured; nothing to match on.
    #[error("config validation error: at least one key mapping is required")]
    EmptyKeyMappings,
    /// A dataset without a header row.
    #[error("source {side} ('{name}') has no header row; load a dataset before comparing")]
    MissingDataset { side: Side, name: String },
    /// Unexpected failure while indexing or reconciling.
    #[error("comparison failed: {0}")]
    Fatal(String),
    /// The cancel token fired before the run completed.
    #[error("comparison cancelled")]
    Cancelled,
}

impl ReconError {
    /// True for errors raised before any row was processed.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_)
                | Self::ConfigValidation(_)
                | Self::EmptyKeyMappings
                | Self::MissingDataset { .. }
        )
    }
}

/// Per-row failure during normalization. Contained within the source's
/// pass: the row is skipped and counted, never surfaced as a run failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row has {fields} fields but the dataset declares {headers} headers")]
    TooManyFields { fields: usize, headers: usize },
}
