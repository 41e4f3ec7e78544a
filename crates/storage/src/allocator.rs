//! Row id allocator
//!
//! Issues RowIds from a monotonically increasing counter and recycles
//! released ids through a free set. Explicit ids supplied by callers (an
//! identity column in a batch) are registered with [`IdAllocator::reserve`]
//! so the counter never hands them out while they are live.
//!
//! # Invariants
//!
//! - An id is in at most one of: issued, `free`, `reserved`
//! - `reserved` only holds ids at or above `next`
//! - `allocate` never returns an id that is issued or reserved

use relstore_core::RowId;
use std::collections::BTreeSet;

/// Allocator for row identities
///
/// Not reentrant; the owning store serializes all calls.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    /// Next never-issued counter value
    next: u64,
    /// Released ids below `next`, reused lowest first
    free: BTreeSet<u64>,
    /// Explicitly claimed ids the counter has not reached yet
    reserved: BTreeSet<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create an allocator whose first id is 0
    pub fn new() -> Self {
        IdAllocator {
            next: 0,
            free: BTreeSet::new(),
            reserved: BTreeSet::new(),
        }
    }

    /// Allocate an id that is not currently issued
    pub fn allocate(&mut self) -> RowId {
        if let Some(id) = self.free.pop_first() {
            return RowId::new(id);
        }
        loop {
            let candidate = self.next;
            self.next += 1;
            if !self.reserved.remove(&candidate) {
                return RowId::new(candidate);
            }
        }
    }

    /// Claim an explicit id
    ///
    /// Returns false if the id is already issued (by `allocate` or an
    /// earlier `reserve`) and was not released since.
    pub fn reserve(&mut self, id: RowId) -> bool {
        let raw = id.as_u64();
        if raw >= self.next {
            return self.reserved.insert(raw);
        }
        self.free.remove(&raw)
    }

    /// Return an id to the pool
    pub fn release(&mut self, id: RowId) {
        let raw = id.as_u64();
        if raw >= self.next {
            // Never reached by the counter: dropping the claim is enough.
            self.reserved.remove(&raw);
        } else {
            self.free.insert(raw);
        }
    }

    /// Number of ids waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}
