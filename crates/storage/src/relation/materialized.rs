//! Hash-backed relation

use super::{check_value, Relation};
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use rustc_hash::FxHashMap;
use std::borrow::Cow;

/// Relation storing every value in a hash map
#[derive(Debug, Clone)]
pub struct MaterializedRelation {
    descriptor: TypeDescriptor,
    data: FxHashMap<RowId, Value>,
}

impl MaterializedRelation {
    /// Create an empty relation of the given type
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            data: FxHashMap::default(),
        }
    }

    /// Create an empty relation with room for `capacity` rows
    pub fn with_capacity(descriptor: TypeDescriptor, capacity: usize) -> Self {
        Self {
            descriptor,
            data: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Borrow the value for `id`
    pub fn get_ref(&self, id: RowId) -> Option<&Value> {
        self.data.get(&id)
    }
}

impl Relation for MaterializedRelation {
    fn type_descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    fn get(&self, id: RowId) -> Result<Cow<'_, Value>> {
        self.data
            .get(&id)
            .map(Cow::Borrowed)
            .ok_or(Error::UnknownIdentity(id))
    }

    fn set(&mut self, id: RowId, value: Value) -> Result<()> {
        check_value(self.descriptor, &value)?;
        if value.is_null() {
            self.data.remove(&id);
        } else {
            self.data.insert(id, value);
        }
        Ok(())
    }

    fn delete(&mut self, id: RowId) -> Result<()> {
        self.data.remove(&id);
        Ok(())
    }

    fn contains(&self, id: RowId) -> bool {
        self.data.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self.data.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn backend_name(&self) -> &'static str {
        "materialized"
    }
}
