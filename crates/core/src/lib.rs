//! Core types for relstore
//!
//! This crate defines the foundational types used throughout the system:
//! - RowId: stable, recyclable identifier of a stored record
//! - Value: dynamically typed cell value
//! - TypeDescriptor: column type with assignability ("accepts") checks
//! - Batch / RowSnapshot: multi-row and single-row transfer bundles
//! - BundleStream: pull-based ingestion contract
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bundle;
pub mod error;
pub mod stream;
pub mod type_desc;
pub mod types;
pub mod value;

pub use bundle::{Batch, Column, RowSnapshot};
pub use error::{Error, Result};
pub use stream::{BundleStream, StreamEvent, StreamFromBatch};
pub use type_desc::TypeDescriptor;
pub use types::RowId;
pub use value::{Value, LABEL_CONCATENATION};
