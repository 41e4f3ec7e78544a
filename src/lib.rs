//! relstore - Embeddable in-memory columnar object store
//!
//! Rows are identified by recyclable [`RowId`]s; their values live in typed
//! relations (one column each). Incoming batches are routed onto relations
//! by greedy first-fit on type descriptors, and secondary indexes attached
//! through factories follow every insert and delete.
//!
//! # Quick Start
//!
//! ```ignore
//! use relstore::{Batch, RelationId, Store, TypeDescriptor, Value};
//! use relstore::index::MembershipIndexFactory;
//!
//! let mut store = Store::builder()
//!     .index_factory(MembershipIndexFactory)
//!     .build()?;
//!
//! let batch = Batch::new().with_column(
//!     TypeDescriptor::Float,
//!     vec![Value::Float(1.0), Value::Float(2.0)],
//! )?;
//! let ids = store.insert(batch)?;
//! let value = store.get(RelationId::from_position(0), ids[0])?;
//! ```

// Re-export the public API from relstore-engine
pub use relstore_engine::*;

pub use relstore_core::{
    Batch, BundleStream, Column, Error, Result, RowId, RowSnapshot, StreamEvent, StreamFromBatch,
    TypeDescriptor, Value, LABEL_CONCATENATION,
};
pub use relstore_storage::{
    ArrayIdMap, FixedFloatRelation, IdAllocator, IdMap, LabelView, MaterializedRelation,
    RangeIdMap, Relation,
};
