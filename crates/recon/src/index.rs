use std::collections::HashMap;

use crate::dedupe::UniqueRow;
use crate::model::{CompositeKey, KeyMapping, Side};

/// Composite key -> rows sharing it, with keys in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    order: Vec<CompositeKey>,
    /// Values are indices into the deduplicated rows the index was built from.
    rows: HashMap<CompositeKey, Vec<usize>>,
}

impl KeyIndex {
    /// Keys in first-seen order.
    pub fn keys(&self) -> &[CompositeKey] {
        &self.order
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.rows.contains_key(key)
    }

    pub fn rows_for(&self, key: &CompositeKey) -> &[usize] {
        self.rows.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, key: CompositeKey, row: usize) {
        match self.rows.get_mut(&key) {
            Some(rows) => rows.push(row),
            None => {
                self.order.push(key.clone());
                self.rows.insert(key, vec![row]);
            }
        }
    }
}

/// Header positions of each mapped field for `side`, in mapping order.
/// `None` marks a field the dataset does not have.
pub fn key_columns(headers: &[String], mappings: &[KeyMapping], side: Side) -> Vec<Option<usize>> {
    mappings
        .iter()
        .map(|m| headers.iter().position(|h| h == m.field(side)))
        .collect()
}

/// Index deduplicated rows by composite key. Rows sharing a key are all
/// kept under it, in row order.
pub fn build_index(
    unique: &[UniqueRow],
    headers: &[String],
    mappings: &[KeyMapping],
    side: Side,
) -> KeyIndex {
    let columns = key_columns(headers, mappings, side);
    let mut index = KeyIndex::default();

    for (i, row) in unique.iter().enumerate() {
        let parts = columns
            .iter()
            .map(|col| match col {
                Some(c) => row.normalized.get(*c).to_string(),
                None => String::new(),
            })
            .collect();
        index.insert(CompositeKey(parts), i);
    }

    index
}
