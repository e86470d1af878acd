use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::aggregate::{build_result, SourceOutcome};
use crate::config::ComparisonConfig;
use crate::dedupe::dedupe;
use crate::error::ReconError;
use crate::index::{build_index, key_columns};
use crate::model::{ComparisonResult, Dataset, Side};
use crate::observer::{emit, Level, Observer};
use crate::reconcile::reconcile;

/// Shared flag; set it to `true` to abort a running comparison.
pub type CancelToken = Arc<AtomicBool>;

/// Compare two datasets under `config`. All or nothing: either a complete
/// result or an error, never a partial result.
pub fn compare(
    a: &Dataset,
    b: &Dataset,
    config: &ComparisonConfig,
    observer: &dyn Observer,
) -> Result<ComparisonResult, ReconError> {
    compare_cancellable(a, b, config, observer, None)
}

/// Like [`compare`], but checks `cancel` before the per-source phase and
/// again before the merge.
pub fn compare_cancellable(
    a: &Dataset,
    b: &Dataset,
    config: &ComparisonConfig,
    observer: &dyn Observer,
    cancel: Option<&CancelToken>,
) -> Result<ComparisonResult, ReconError> {
    if let Err(e) = validate_inputs(a, b, config) {
        emit(observer, Level::Error, &e.to_string());
        return Err(e);
    }

    let outcome = run(a, b, config, observer, cancel);
    if let Err(ref e) = outcome {
        emit(observer, Level::Error, &e.to_string());
    }
    outcome
}

fn validate_inputs(a: &Dataset, b: &Dataset, config: &ComparisonConfig) -> Result<(), ReconError> {
    for (side, ds) in [(Side::A, a), (Side::B, b)] {
        if ds.headers.is_empty() {
            return Err(ReconError::MissingDataset {
                side,
                name: ds.name.clone(),
            });
        }
        // Records are keyed by header name
        let mut seen = HashSet::new();
        if let Some(dup) = ds.headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(ReconError::ConfigValidation(format!(
                "source {side} ('{}') repeats header '{dup}'",
                ds.name
            )));
        }
    }
    config.validate()
}

fn run(
    a: &Dataset,
    b: &Dataset,
    config: &ComparisonConfig,
    observer: &dyn Observer,
    cancel: Option<&CancelToken>,
) -> Result<ComparisonResult, ReconError> {
    let started = Instant::now();
    emit(
        observer,
        Level::Info,
        &format!(
            "Starting comparison of '{}' ({} rows) and '{}' ({} rows) on {} key field(s)",
            a.name,
            a.rows.len(),
            b.name,
            b.rows.len(),
            config.key_mappings.len()
        ),
    );

    for (side, ds) in [(Side::A, a), (Side::B, b)] {
        for (mapping, col) in config
            .key_mappings
            .iter()
            .zip(key_columns(&ds.headers, &config.key_mappings, side))
        {
            if col.is_none() {
                emit(
                    observer,
                    Level::Warning,
                    &format!(
                        "Source {side} ('{}') has no column '{}'; its key part reads as empty",
                        ds.name,
                        mapping.field(side)
                    ),
                );
            }
        }
    }

    check_cancelled(cancel)?;

    emit(observer, Level::Info, &format!("Processing source A ('{}')", a.name));
    emit(observer, Level::Info, &format!("Processing source B ('{}')", b.name));

    let (outcome_a, outcome_b) = thread::scope(|s| {
        let worker_a = s.spawn(|| process_source(a, config, Side::A));
        let worker_b = s.spawn(|| process_source(b, config, Side::B));
        (worker_a.join(), worker_b.join())
    });
    let outcome_a =
        outcome_a.map_err(|_| ReconError::Fatal("source A worker panicked".into()))?;
    let outcome_b =
        outcome_b.map_err(|_| ReconError::Fatal("source B worker panicked".into()))?;

    for (side, outcome) in [(Side::A, &outcome_a), (Side::B, &outcome_b)] {
        report_source(observer, side, outcome);
    }

    check_cancelled(cancel)?;

    emit(observer, Level::Info, "Comparing keys");
    let recon = reconcile(&outcome_a.index, &outcome_b.index);
    let result = build_result(&outcome_a, &outcome_b, &recon, chrono::Utc::now().to_rfc3339())?;

    let elapsed = started.elapsed();
    tracing::debug!(
        elapsed_ms = elapsed.as_millis() as u64,
        matched = result.stats.matched,
        "comparison finished"
    );
    emit(
        observer,
        Level::Success,
        &format!(
            "Comparison complete in {} ms: {} matched key(s), {} row(s) missing in B, {} row(s) missing in A",
            elapsed.as_millis(),
            result.stats.matched,
            result.stats.missing_in_b,
            result.stats.missing_in_a
        ),
    );

    Ok(result)
}

/// Normalize, dedupe and index one dataset. Owns nothing shared.
fn process_source<'a>(ds: &'a Dataset, config: &ComparisonConfig, side: Side) -> SourceOutcome<'a> {
    let _span = tracing::debug_span!("source", side = %side, name = %ds.name).entered();

    let dedup = dedupe(ds, &config.rules, side);
    let index = build_index(&dedup.unique, &ds.headers, &config.key_mappings, side);
    tracing::debug!(
        unique = dedup.unique.len(),
        duplicates = dedup.duplicate_count,
        skipped = dedup.skipped.len(),
        keys = index.len(),
        "source processed"
    );

    SourceOutcome {
        dataset: ds,
        dedup,
        index,
    }
}

fn report_source(observer: &dyn Observer, side: Side, outcome: &SourceOutcome<'_>) {
    emit(
        observer,
        Level::Info,
        &format!(
            "Source {side} ('{}'): {} unique row(s), {} duplicate(s) removed",
            outcome.name(),
            outcome.dedup.unique.len(),
            outcome.dedup.duplicate_count
        ),
    );

    if let Some(first) = outcome.dedup.skipped.first() {
        emit(
            observer,
            Level::Warning,
            &format!(
                "Source {side} ('{}'): skipped {} malformed row(s); first at row {}: {}",
                outcome.name(),
                outcome.dedup.skipped.len(),
                first.source_index + 1,
                first.reason
            ),
        );
    }
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<(), ReconError> {
    match cancel {
        Some(token) if token.load(Ordering::SeqCst) => Err(ReconError::Cancelled),
        _ => Ok(()),
    }
}
