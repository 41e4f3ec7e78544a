//! Fixed-capacity float relation
//!
//! Stores one `f64` per mapped id in a pre-sized array. Trades mutability
//! for density: the domain is exactly the ids of the [`IdMap`], unset cells
//! hold the default value, and `delete` is always rejected with
//! `UnsupportedMutation`.

use super::Relation;
use crate::id_map::IdMap;
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use std::borrow::Cow;

/// Dense float column over a fixed id set
#[derive(Debug, Clone)]
pub struct FixedFloatRelation<M> {
    data: Vec<f64>,
    idmap: M,
}

impl<M: IdMap> FixedFloatRelation<M> {
    /// Create a relation with every cell set to NaN
    pub fn new(idmap: M) -> Self {
        Self::with_default(idmap, f64::NAN)
    }

    /// Create a relation with every cell set to `default`
    pub fn with_default(idmap: M, default: f64) -> Self {
        Self {
            data: vec![default; idmap.len()],
            idmap,
        }
    }

    fn offset(&self, id: RowId) -> Result<usize> {
        self.idmap.offset(id).ok_or(Error::UnknownIdentity(id))
    }

    /// Raw value for `id`
    pub fn value(&self, id: RowId) -> Result<f64> {
        Ok(self.data[self.offset(id)?])
    }

    /// Store `value` for `id`, returning the previous value
    pub fn put(&mut self, id: RowId, value: f64) -> Result<f64> {
        let off = self.offset(id)?;
        Ok(std::mem::replace(&mut self.data[off], value))
    }
}

impl<M: IdMap> Relation for FixedFloatRelation<M> {
    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn get(&self, id: RowId) -> Result<Cow<'_, Value>> {
        Ok(Cow::Owned(Value::Float(self.value(id)?)))
    }

    fn set(&mut self, id: RowId, value: Value) -> Result<()> {
        match value {
            Value::Float(v) => self.put(id, v).map(|_| ()),
            Value::Null => Err(Error::unsupported(
                "can't clear a cell of a static array storage",
            )),
            other => Err(Error::TypeMismatch {
                expected: TypeDescriptor::Float,
                actual: other.type_name(),
            }),
        }
    }

    fn delete(&mut self, _id: RowId) -> Result<()> {
        Err(Error::unsupported("can't delete from a static array storage"))
    }

    fn contains(&self, id: RowId) -> bool {
        self.idmap.offset(id).is_some()
    }

    fn len(&self) -> usize {
        self.idmap.len()
    }

    fn ids(&self) -> Vec<RowId> {
        self.idmap.ids()
    }

    fn backend_name(&self) -> &'static str {
        "raw"
    }
}
