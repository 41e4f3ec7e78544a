//! Store engine for relstore
//!
//! This crate orchestrates the lower layers:
//! - Store: live ids, relations, column alignment, insert/delete
//! - Indexes: the static/dynamic index contract and bundled plug-ins
//! - Listeners: synchronous change events
//! - Label resolution and numeric relation helpers
//!
//! The engine is the only component that knows about:
//! - Routing batch columns onto relations
//! - Index notification order relative to mutations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod index;
pub mod label;
pub mod source;
pub mod util;

pub use database::{
    ListenerId, RelationId, SharedStore, Store, StoreBuilder, StoreConfig, StoreEvent,
    StoreListener, CONFIG_FILE_NAME,
};
pub use index::{DynamicIndex, Index, IndexFactory, IndexId};
pub use label::{LabelColumn, LabelPreference};
pub use source::{BatchSource, DataSource};
