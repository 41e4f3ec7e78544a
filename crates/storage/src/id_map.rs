//! Row id to array offset maps
//!
//! Dense array-backed storage needs a stable offset per row id. The set of
//! ids is fixed when the map is built.

use relstore_core::RowId;
use rustc_hash::FxHashMap;

/// Maps a fixed set of row ids onto `0..len()`
pub trait IdMap: Send + Sync {
    /// Offset of `id`, if it belongs to the map
    fn offset(&self, id: RowId) -> Option<usize>;

    /// Number of mapped ids
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mapped ids, ascending
    fn ids(&self) -> Vec<RowId>;
}

/// Contiguous id range `start..start + len`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeIdMap {
    start: u64,
    len: usize,
}

impl RangeIdMap {
    /// Map the ids `start..start + len`
    pub fn new(start: RowId, len: usize) -> Self {
        Self {
            start: start.as_u64(),
            len,
        }
    }
}

impl IdMap for RangeIdMap {
    fn offset(&self, id: RowId) -> Option<usize> {
        let raw = id.as_u64();
        if raw < self.start {
            return None;
        }
        let off = usize::try_from(raw - self.start).ok()?;
        (off < self.len).then_some(off)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn ids(&self) -> Vec<RowId> {
        (0..self.len as u64)
            .map(|i| RowId::new(self.start + i))
            .collect()
    }
}

/// Arbitrary id set, offsets assigned in the given order
#[derive(Debug, Clone, Default)]
pub struct ArrayIdMap {
    ids: Vec<RowId>,
    offsets: FxHashMap<RowId, usize>,
}

impl ArrayIdMap {
    /// Map `ids` in order; later duplicates are ignored
    pub fn new(ids: impl IntoIterator<Item = RowId>) -> Self {
        let mut map = ArrayIdMap::default();
        for id in ids {
            if let std::collections::hash_map::Entry::Vacant(e) = map.offsets.entry(id) {
                e.insert(map.ids.len());
                map.ids.push(id);
            }
        }
        map
    }
}

impl IdMap for ArrayIdMap {
    fn offset(&self, id: RowId) -> Option<usize> {
        self.offsets.get(&id).copied()
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn ids(&self) -> Vec<RowId> {
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_offsets() {
        let map = RangeIdMap::new(RowId::new(10), 3);
        assert_eq!(map.offset(RowId::new(10)), Some(0));
        assert_eq!(map.offset(RowId::new(12)), Some(2));
        assert_eq!(map.offset(RowId::new(13)), None);
        assert_eq!(map.offset(RowId::new(9)), None);
        assert_eq!(map.ids().len(), 3);
    }

    #[test]
    fn test_array_offsets_follow_input_order() {
        let map = ArrayIdMap::new([RowId::new(7), RowId::new(2), RowId::new(7)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.offset(RowId::new(7)), Some(0));
        assert_eq!(map.offset(RowId::new(2)), Some(1));
        assert_eq!(map.ids(), vec![RowId::new(2), RowId::new(7)]);
    }
}
