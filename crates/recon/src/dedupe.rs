use std::collections::HashMap;

use crate::config::NormalizationRules;
use crate::error::RowError;
use crate::model::{Dataset, NormalizedRow, Row, Side};
use crate::normalize::normalize;

/// A retained first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueRow {
    /// Position in the source dataset.
    pub source_index: usize,
    pub normalized: NormalizedRow,
}

/// A signature seen more than once. `count` includes the retained row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry {
    /// Index into `DedupOutput::unique` of the retained occurrence.
    pub unique_index: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub source_index: usize,
    pub reason: RowError,
}

#[derive(Debug, Clone, Default)]
pub struct DedupOutput {
    pub unique: Vec<UniqueRow>,
    pub duplicate_count: usize,
    /// Duplicated signatures in first-seen order.
    pub duplicates: Vec<DuplicateEntry>,
    pub skipped: Vec<SkippedRow>,
}

impl DedupOutput {
    /// Rows accounted for: `unique + duplicates + skipped`.
    pub fn accounted(&self) -> usize {
        self.unique.len() + self.duplicate_count + self.skipped.len()
    }
}

/// Normalize every field of `row` in header order.
pub fn normalize_row(
    row: &Row,
    headers: &[String],
    side: Side,
    rules: &NormalizationRules,
) -> Result<NormalizedRow, RowError> {
    if row.values.len() > headers.len() {
        return Err(RowError::TooManyFields {
            fields: row.values.len(),
            headers: headers.len(),
        });
    }

    let values = headers
        .iter()
        .enumerate()
        .map(|(i, field)| normalize(row.get(i), field, side, rules))
        .collect();

    Ok(NormalizedRow { values })
}

/// Canonical signature: every value length-prefixed, in header order.
/// Two rows share a signature iff their normalized values are equal.
pub fn signature(row: &NormalizedRow) -> String {
    let capacity = row.values.iter().map(|v| v.len() + 4).sum();
    let mut out = String::with_capacity(capacity);
    for value in &row.values {
        out.push_str(&value.len().to_string());
        out.push(':');
        out.push_str(value);
        out.push(';');
    }
    out
}

/// Collapse exact duplicates (after normalization), keeping the first
/// occurrence of each signature.
pub fn dedupe(dataset: &Dataset, rules: &NormalizationRules, side: Side) -> DedupOutput {
    let mut out = DedupOutput::default();
    // signature -> index into out.unique
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(dataset.rows.len());
    // index into out.unique -> index into out.duplicates
    let mut dup_slot: HashMap<usize, usize> = HashMap::new();

    for (source_index, row) in dataset.rows.iter().enumerate() {
        let normalized = match normalize_row(row, &dataset.headers, side, rules) {
            Ok(n) => n,
            Err(reason) => {
                tracing::debug!(side = %side, row = source_index, %reason, "skipping row");
                out.skipped.push(SkippedRow {
                    source_index,
                    reason,
                });
                continue;
            }
        };

        let sig = signature(&normalized);
        match seen.get(&sig) {
            Some(&unique_index) => {
                out.duplicate_count += 1;
                let slot = *dup_slot.entry(unique_index).or_insert_with(|| {
                    out.duplicates.push(DuplicateEntry {
                        unique_index,
                        count: 1,
                    });
                    out.duplicates.len() - 1
                });
                out.duplicates[slot].count += 1;
            }
            None => {
                seen.insert(sig, out.unique.len());
                out.unique.push(UniqueRow {
                    source_index,
                    normalized,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim_rules() -> NormalizationRules {
        NormalizationRules {
            trim_whitespace: true,
            ..NormalizationRules::default()
        }
    }

    #[test]
    fn whitespace_variants_collapse() {
        let ds = Dataset::from_pairs(
            "a",
            &["V"],
            &[vec![("V", "  X  ")], vec![("V", "X")]],
        );
        let out = dedupe(&ds, &trim_rules(), Side::A);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.duplicate_count, 1);
        assert_eq!(out.duplicates, vec![DuplicateEntry { unique_index: 0, count: 2 }]);
    }

    #[test]
    fn first_occurrence_retained() {
        let ds = Dataset::from_pairs(
            "a",
            &["ID", "NAME"],
            &[
                vec![("ID", "1"), ("NAME", "a")],
                vec![("ID", "2"), ("NAME", "b")],
                vec![("ID", "1"), ("NAME", "a")],
                vec![("ID", "1"), ("NAME", "a")],
            ],
        );
        let out = dedupe(&ds, &NormalizationRules::default(), Side::A);
        assert_eq!(out.unique.len(), 2);
        assert_eq!(out.unique[0].source_index, 0);
        assert_eq!(out.unique[1].source_index, 1);
        assert_eq!(out.duplicate_count, 2);
        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].count, 3);
    }

    #[test]
    fn duplicates_reported_in_first_seen_order() {
        let ds = Dataset::from_pairs(
            "a",
            &["ID"],
            &[
                vec![("ID", "b")],
                vec![("ID", "a")],
                vec![("ID", "a")],
                vec![("ID", "b")],
            ],
        );
        let out = dedupe(&ds, &NormalizationRules::default(), Side::A);
        let order: Vec<usize> = out.duplicates.iter().map(|d| d.unique_index).collect();
        // "a" duplicated first, even though "b" was seen first
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn short_rows_pad_and_match_explicit_empty() {
        let ds = Dataset::new(
            "a",
            vec!["ID".into(), "NOTE".into()],
            vec![
                Row::new(vec!["1".into()]),
                Row::new(vec!["1".into(), "".into()]),
            ],
        );
        let out = dedupe(&ds, &NormalizationRules::default(), Side::A);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.duplicate_count, 1);
    }

    #[test]
    fn wide_rows_skipped_not_counted() {
        let ds = Dataset::new(
            "a",
            vec!["ID".into()],
            vec![
                Row::new(vec!["1".into()]),
                Row::new(vec!["1".into(), "extra".into()]),
            ],
        );
        let out = dedupe(&ds, &NormalizationRules::default(), Side::A);
        assert_eq!(out.unique.len(), 1);
        assert_eq!(out.duplicate_count, 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].source_index, 1);
        assert_eq!(out.skipped[0].reason, RowError::TooManyFields { fields: 2, headers: 1 });
        assert_eq!(out.accounted(), ds.rows.len());
    }

    #[test]
    fn signature_is_unambiguous() {
        let a = NormalizedRow { values: vec!["a;".into(), "b".into()] };
        let b = NormalizedRow { values: vec!["a".into(), ";b".into()] };
        assert_ne!(signature(&a), signature(&b));

        let c = NormalizedRow { values: vec!["1:x".into()] };
        let d = NormalizedRow { values: vec!["1".into(), "x".into()] };
        assert_ne!(signature(&c), signature(&d));
    }
}
