//! `rowmatch-recon`: two-source row reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded datasets, returns the comparison
//! result. No CLI or IO dependencies.
//!
//! Per source: normalize -> dedupe -> index (A and B on separate workers),
//! then reconcile the two key indexes and assemble the result.

pub mod aggregate;
pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod observer;
pub mod reconcile;

pub use config::{ComparisonConfig, JobConfig, NormalizationRules, SideRules};
pub use engine::{compare, compare_cancellable, CancelToken};
pub use error::{ReconError, RowError};
pub use model::{ComparisonResult, ComparisonStats, Dataset, KeyMapping, Record, Row, Side};
pub use normalize::normalize;
pub use observer::{Level, NoopObserver, Observer, TracingObserver};
