//! Secondary indexes over a single relation
//!
//! An [`Index`] is built from one relation's contents. Static indexes are
//! built once by [`Index::initialize`] and never updated afterwards; the
//! store marks them stale when the id set changes. Dynamic indexes expose
//! [`DynamicIndex`] through [`Index::as_dynamic`] and receive every insert
//! and delete after it is committed.
//!
//! IMPORTANT: Indexes observe the store only through the ids and the
//! relation handed to them. They must not assume any notification order
//! across distinct indexes.
//!
//! Bundled plug-ins:
//! - [`MembershipIndex`]: dynamic id set of the relation's domain
//! - [`LabelIndex`]: dynamic inverted label -> ids map
//! - [`KnnIndex`]: dynamic brute-force k-nearest neighbours over vectors
//! - [`SortedValueIndex`]: static sorted snapshot of a numeric column

mod knn;
mod label;
mod membership;
mod sorted;

pub use knn::{DistanceMetric, KnnIndex, KnnIndexFactory};
pub use label::{LabelIndex, LabelIndexFactory};
pub use membership::{MembershipIndex, MembershipIndexFactory};
pub use sorted::{SortedValueIndex, SortedValueIndexFactory};

use relstore_core::{Result, RowId, TypeDescriptor};
use relstore_storage::Relation;
use std::any::Any;

/// Handle of an attached index, stable for the store's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(pub(crate) usize);

impl IndexId {
    /// Position in attachment order
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// A queryable structure derived from one relation
pub trait Index: Send + Sync + 'static {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Build the structure from the relation's current contents
    fn initialize(&mut self, relation: &dyn Relation) -> Result<()>;

    /// Dynamic capability, if supported
    fn as_dynamic(&mut self) -> Option<&mut dyn DynamicIndex> {
        None
    }

    /// Whether [`Index::as_dynamic`] returns `Some`
    fn is_dynamic(&self) -> bool {
        false
    }

    /// For downcasting to the concrete index type
    fn as_any(&self) -> &dyn Any;
}

/// An index that follows inserts and deletes
///
/// The batched forms default to looping over the single-id forms; override
/// them to amortize structural updates.
pub trait DynamicIndex: Index {
    /// `id` was inserted; its values are readable from `relation`
    fn insert(&mut self, id: RowId, relation: &dyn Relation) -> Result<()>;

    /// `id` was removed from the relation's domain
    fn delete(&mut self, id: RowId) -> Result<()>;

    /// Batched insert notification
    fn insert_all(&mut self, ids: &[RowId], relation: &dyn Relation) -> Result<()> {
        for &id in ids {
            self.insert(id, relation)?;
        }
        Ok(())
    }

    /// Batched delete notification
    fn delete_all(&mut self, ids: &[RowId]) -> Result<()> {
        for &id in ids {
            self.delete(id)?;
        }
        Ok(())
    }
}

/// Decides whether to attach an index to a newly created relation
///
/// Factories are consulted once per relation, when the relation is created.
/// They are never applied to relations that existed before registration.
pub trait IndexFactory: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Relations whose descriptor this restriction accepts get an index
    fn input_type_restriction(&self) -> TypeDescriptor;

    /// Build a fresh, uninitialized index for `relation`
    fn instantiate(&self, relation: &dyn Relation) -> Box<dyn Index>;
}
