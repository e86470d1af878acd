use crate::dedupe::DedupOutput;
use crate::error::ReconError;
use crate::index::KeyIndex;
use crate::model::{ComparisonResult, ComparisonStats, Dataset, DuplicateRecord, Record};
use crate::reconcile::{resolve_rows, Reconciliation};

/// Everything the per-source pass produced for one side, next to the
/// dataset it came from.
#[derive(Debug, Clone)]
pub struct SourceOutcome<'a> {
    pub dataset: &'a Dataset,
    pub dedup: DedupOutput,
    pub index: KeyIndex,
}

impl SourceOutcome<'_> {
    pub fn name(&self) -> &str {
        &self.dataset.name
    }

    pub fn headers(&self) -> &[String] {
        &self.dataset.headers
    }

    /// Duplicate groups report the first occurrence as it was decoded.
    fn duplicate_records(&self) -> Result<Vec<DuplicateRecord>, ReconError> {
        self.dedup
            .duplicates
            .iter()
            .map(|entry| {
                let raw = self
                    .dedup
                    .unique
                    .get(entry.unique_index)
                    .and_then(|u| self.dataset.rows.get(u.source_index))
                    .ok_or_else(|| {
                        ReconError::Fatal(format!(
                            "source '{}': duplicate entry points at missing row {}",
                            self.name(),
                            entry.unique_index
                        ))
                    })?;
                Ok(DuplicateRecord {
                    record: Record::from_raw(self.headers(), raw),
                    count: entry.count,
                })
            })
            .collect()
    }
}

/// Package both sides and the reconciliation into the reported result.
pub fn build_result(
    a: &SourceOutcome<'_>,
    b: &SourceOutcome<'_>,
    recon: &Reconciliation,
    timestamp: String,
) -> Result<ComparisonResult, ReconError> {
    let rows_missing_in_b: Vec<Record> = resolve_rows(&recon.keys_only_in_a, &a.index, &a.dedup.unique)?
        .into_iter()
        .map(|row| Record::from_normalized(a.headers(), &row.normalized))
        .collect();
    let rows_missing_in_a: Vec<Record> = resolve_rows(&recon.keys_only_in_b, &b.index, &b.dedup.unique)?
        .into_iter()
        .map(|row| Record::from_normalized(b.headers(), &row.normalized))
        .collect();

    let stats = ComparisonStats {
        total_a: a.dataset.rows.len(),
        total_b: b.dataset.rows.len(),
        valid_unique_a: a.dedup.unique.len(),
        valid_unique_b: b.dedup.unique.len(),
        duplicates_a: a.dedup.duplicate_count,
        duplicates_b: b.dedup.duplicate_count,
        skipped_a: a.dedup.skipped.len(),
        skipped_b: b.dedup.skipped.len(),
        missing_in_a: rows_missing_in_a.len(),
        missing_in_b: rows_missing_in_b.len(),
        keys_only_in_a: recon.keys_only_in_a.len(),
        keys_only_in_b: recon.keys_only_in_b.len(),
        matched: recon.matched_key_count,
    };

    Ok(ComparisonResult {
        source_a_name: a.name().to_string(),
        source_b_name: b.name().to_string(),
        stats,
        keys_only_in_a: recon.keys_only_in_a.iter().map(ToString::to_string).collect(),
        keys_only_in_b: recon.keys_only_in_b.iter().map(ToString::to_string).collect(),
        rows_missing_in_b,
        rows_missing_in_a,
        duplicated_rows_a: a.duplicate_records()?,
        duplicated_rows_b: b.duplicate_records()?,
        timestamp,
    })
}
