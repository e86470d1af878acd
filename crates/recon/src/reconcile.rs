use crate::dedupe::UniqueRow;
use crate::error::ReconError;
use crate::index::KeyIndex;
use crate::model::CompositeKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Keys of A absent from B, in A's first-seen order.
    pub keys_only_in_a: Vec<CompositeKey>,
    /// Keys of B absent from A, in B's first-seen order.
    pub keys_only_in_b: Vec<CompositeKey>,
    pub matched_key_count: usize,
}

/// Partition keys into matched, only-in-A and only-in-B.
pub fn reconcile(a: &KeyIndex, b: &KeyIndex) -> Reconciliation {
    let keys_only_in_a = only_in(a, b);
    let keys_only_in_b = only_in(b, a);
    let matched_key_count = a.len() - keys_only_in_a.len();

    Reconciliation {
        keys_only_in_a,
        keys_only_in_b,
        matched_key_count,
    }
}

fn only_in(this: &KeyIndex, other: &KeyIndex) -> Vec<CompositeKey> {
    this.keys()
        .iter()
        .filter(|k| !other.contains(k))
        .cloned()
        .collect()
}

/// Every row filed under `keys`, key by key. A key with several rows
/// contributes all of them.
pub fn resolve_rows<'a>(
    keys: &[CompositeKey],
    index: &KeyIndex,
    unique: &'a [UniqueRow],
) -> Result<Vec<&'a UniqueRow>, ReconError> {
    let mut rows = Vec::new();
    for key in keys {
        let positions = index.rows_for(key);
        if positions.is_empty() {
            return Err(ReconError::Fatal(format!("key '{key}' is not in the index")));
        }
        for &pos in positions {
            let row = unique.get(pos).ok_or_else(|| {
                ReconError::Fatal(format!(
                    "key '{key}' points at row {pos}, but only {} rows were indexed",
                    unique.len()
                ))
            })?;
            rows.push(row);
        }
    }
    Ok(rows)
}
