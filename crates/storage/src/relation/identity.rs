//! The identity relation: live row ids exposed as a column
//!
//! Its domain is the store's live id set; `get(id)` returns `Value::Id(id)`.
//! The generic mutators are rejected, only the owning store may change the
//! set through [`IdentityRelation::insert_id`] and
//! [`IdentityRelation::remove_id`].

use super::Relation;
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Live id set viewed as a relation of type `Identity`
#[derive(Debug, Clone, Default)]
pub struct IdentityRelation {
    live: BTreeSet<RowId>,
}

impl IdentityRelation {
    /// Create an empty id set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live id; returns false if it was already live
    pub fn insert_id(&mut self, id: RowId) -> bool {
        self.live.insert(id)
    }

    /// Remove a live id; returns false if it was not live
    pub fn remove_id(&mut self, id: RowId) -> bool {
        self.live.remove(&id)
    }

    /// Iterate live ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.live.iter().copied()
    }
}

impl Relation for IdentityRelation {
    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Identity
    }

    fn get(&self, id: RowId) -> Result<Cow<'_, Value>> {
        if self.live.contains(&id) {
            Ok(Cow::Owned(Value::Id(id)))
        } else {
            Err(Error::UnknownIdentity(id))
        }
    }

    fn set(&mut self, _id: RowId, _value: Value) -> Result<()> {
        Err(Error::unsupported(
            "the identity relation is maintained by the store",
        ))
    }

    fn delete(&mut self, _id: RowId) -> Result<()> {
        Err(Error::unsupported(
            "the identity relation is maintained by the store",
        ))
    }

    fn contains(&self, id: RowId) -> bool {
        self.live.contains(&id)
    }

    fn len(&self) -> usize {
        self.live.len()
    }

    fn ids(&self) -> Vec<RowId> {
        self.live.iter().copied().collect()
    }

    fn backend_name(&self) -> &'static str {
        "identity"
    }
}
