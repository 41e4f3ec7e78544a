//! Relations: typed, RowId-keyed columns
//!
//! A [`Relation`] maps row ids to values of a single declared
//! [`TypeDescriptor`]. Backends:
//! - [`MaterializedRelation`]: hash-backed, fully mutable
//! - [`IdentityRelation`]: the store's live id set exposed as a column
//! - [`FixedFloatRelation`]: pre-sized float array over an [`IdMap`](crate::IdMap);
//!   rejects `delete`
//! - [`LabelView`]: read-only string rendering of a label-like relation
//!
//! The trait is designed to work for every backend. Do not add methods that
//! assume a hash map underneath.

mod fixed;
mod identity;
mod materialized;
mod string_view;

pub use fixed::FixedFloatRelation;
pub use identity::IdentityRelation;
pub use materialized::MaterializedRelation;
pub use string_view::LabelView;

use relstore_core::{Result, RowId, TypeDescriptor, Value};
use std::borrow::Cow;

/// A single typed column keyed by row id
pub trait Relation: Send + Sync {
    /// Declared type of the column, fixed at creation
    fn type_descriptor(&self) -> TypeDescriptor;

    /// Value stored for `id`
    ///
    /// # Errors
    ///
    /// `UnknownIdentity` if `id` is not in the domain.
    fn get(&self, id: RowId) -> Result<Cow<'_, Value>>;

    /// Insert or overwrite the value for `id`
    ///
    /// The caller guarantees `id` is live in the owning store. Setting
    /// `Null` removes `id` from the domain.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if the descriptor does not accept `value`
    /// - `UnsupportedMutation` for read-only backends
    fn set(&mut self, id: RowId, value: Value) -> Result<()>;

    /// Remove `id` from the domain
    ///
    /// Removing an absent id is a no-op, except on fixed-capacity backends
    /// which reject every delete with `UnsupportedMutation`.
    fn delete(&mut self, id: RowId) -> Result<()>;

    /// Is `id` in the domain?
    fn contains(&self, id: RowId) -> bool;

    /// Number of ids in the domain
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All ids in the domain, ascending
    fn ids(&self) -> Vec<RowId>;

    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Reject values the descriptor does not accept
pub(crate) fn check_value(descriptor: TypeDescriptor, value: &Value) -> Result<()> {
    if descriptor.accepts_value(value) {
        Ok(())
    } else {
        Err(relstore_core::Error::TypeMismatch {
            expected: descriptor,
            actual: value.type_name(),
        })
    }
}
