//! String view over label-like relations

use super::Relation;
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use std::borrow::Cow;

/// Read-only view rendering class labels, label lists and strings as text
///
/// Label lists are joined with a single space.
#[derive(Clone, Copy)]
pub struct LabelView<'a> {
    inner: &'a dyn Relation,
}

impl<'a> LabelView<'a> {
    /// Wrap `inner`
    pub fn new(inner: &'a dyn Relation) -> Self {
        Self { inner }
    }

    /// Descriptor of the wrapped relation
    pub fn source_type(&self) -> TypeDescriptor {
        self.inner.type_descriptor()
    }

    /// Label text for `id`
    pub fn label(&self, id: RowId) -> Result<String> {
        let value = self.inner.get(id)?;
        value.to_label_string().ok_or(Error::TypeMismatch {
            expected: TypeDescriptor::String,
            actual: value.type_name(),
        })
    }
}

impl std::fmt::Debug for LabelView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelView")
            .field("source", &self.inner.type_descriptor())
            .finish()
    }
}

impl Relation for LabelView<'_> {
    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn get(&self, id: RowId) -> Result<Cow<'_, Value>> {
        Ok(Cow::Owned(Value::String(self.label(id)?)))
    }

    fn set(&mut self, _id: RowId, _value: Value) -> Result<()> {
        Err(Error::unsupported("label views are read-only"))
    }

    fn delete(&mut self, _id: RowId) -> Result<()> {
        Err(Error::unsupported("label views are read-only"))
    }

    fn contains(&self, id: RowId) -> bool {
        self.inner.contains(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn ids(&self) -> Vec<RowId> {
        self.inner.ids()
    }

    fn backend_name(&self) -> &'static str {
        "label-view"
    }
}
