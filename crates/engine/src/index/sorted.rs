//! Static sorted snapshot of a numeric relation
//!
//! Built once from the relation's contents. Later inserts and deletes are
//! not applied; the store flags the index as stale instead.

use super::{Index, IndexFactory};
use relstore_core::{Error, Result, RowId, TypeDescriptor};
use relstore_storage::Relation;
use std::any::Any;
use std::cmp::Ordering;

/// Static index of (value, id) pairs sorted by value
#[derive(Debug, Clone, Default)]
pub struct SortedValueIndex {
    entries: Vec<(f64, RowId)>,
}

impl SortedValueIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries captured at build time
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids whose value lies in `[lo, hi]`, in value order
    pub fn range(&self, lo: f64, hi: f64) -> Vec<RowId> {
        let start = self.entries.partition_point(|(v, _)| *v < lo);
        self.entries[start..]
            .iter()
            .take_while(|(v, _)| *v <= hi)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Smallest and largest captured values
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.entries.first()?.0, self.entries.last()?.0))
    }
}

impl Index for SortedValueIndex {
    fn name(&self) -> &'static str {
        "sorted-value"
    }

    fn initialize(&mut self, relation: &dyn Relation) -> Result<()> {
        let mut entries = Vec::with_capacity(relation.len());
        for id in relation.ids() {
            let value = relation.get(id)?;
            let number = value.as_number().ok_or(Error::TypeMismatch {
                expected: TypeDescriptor::Number,
                actual: value.type_name(),
            })?;
            // NaN cells are left out of the ordering
            if !number.is_nan() {
                entries.push((number, id));
            }
        }
        entries.sort_by(|(a, id_a), (b, id_b)| {
            a.partial_cmp(b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        self.entries = entries;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Attaches a [`SortedValueIndex`] to every new numeric relation
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedValueIndexFactory;

impl IndexFactory for SortedValueIndexFactory {
    fn name(&self) -> &'static str {
        "sorted-value"
    }

    fn input_type_restriction(&self) -> TypeDescriptor {
        TypeDescriptor::Number
    }

    fn instantiate(&self, _relation: &dyn Relation) -> Box<dyn Index> {
        Box::new(SortedValueIndex::new())
    }
}
