//! Membership index: the relation's domain as an ordered id set

use super::{DynamicIndex, Index, IndexFactory};
use relstore_core::{Result, RowId, TypeDescriptor};
use relstore_storage::Relation;
use std::any::Any;
use std::collections::BTreeSet;

/// Dynamic index holding exactly the ids present in its relation
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    members: BTreeSet<RowId>,
}

impl MembershipIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Is `id` indexed?
    pub fn contains(&self, id: RowId) -> bool {
        self.members.contains(&id)
    }

    /// Indexed ids, ascending
    pub fn members(&self) -> Vec<RowId> {
        self.members.iter().copied().collect()
    }

    /// Number of indexed ids
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Index for MembershipIndex {
    fn name(&self) -> &'static str {
        "membership"
    }

    fn initialize(&mut self, relation: &dyn Relation) -> Result<()> {
        self.members = relation.ids().into_iter().collect();
        Ok(())
    }

    fn as_dynamic(&mut self) -> Option<&mut dyn DynamicIndex> {
        Some(self)
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DynamicIndex for MembershipIndex {
    fn insert(&mut self, id: RowId, relation: &dyn Relation) -> Result<()> {
        // Null cells leave the id out of the relation
        if relation.contains(id) {
            self.members.insert(id);
        }
        Ok(())
    }

    fn delete(&mut self, id: RowId) -> Result<()> {
        self.members.remove(&id);
        Ok(())
    }
}

/// Attaches a [`MembershipIndex`] to every new relation
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipIndexFactory;

impl IndexFactory for MembershipIndexFactory {
    fn name(&self) -> &'static str {
        "membership"
    }

    fn input_type_restriction(&self) -> TypeDescriptor {
        TypeDescriptor::Any
    }

    fn instantiate(&self, _relation: &dyn Relation) -> Box<dyn Index> {
        Box::new(MembershipIndex::new())
    }
}
