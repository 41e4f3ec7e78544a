//! Storage layer for relstore
//!
//! This crate implements:
//! - Relation: the typed column trait and its backends
//! - IdAllocator: row id issuing and recycling
//! - IdMap: id-to-offset maps for dense array storage

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod id_map;
pub mod relation;

pub use allocator::IdAllocator;
pub use id_map::{ArrayIdMap, IdMap, RangeIdMap};
pub use relation::{
    FixedFloatRelation, IdentityRelation, LabelView, MaterializedRelation, Relation,
};
