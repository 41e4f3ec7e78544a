//! Pull-based bundle streams
//!
//! The ingestion side may hand over rows one at a time instead of a
//! materialized [`Batch`]. A stream announces its column layout with
//! `MetaChanged`, then yields `NextObject` once per row, and finishes with
//! `EndOfStream`. The layout may change mid-stream; consumers treat each
//! run of rows under one layout as a separate chunk.

use crate::bundle::Batch;
use crate::error::Result;
use crate::type_desc::TypeDescriptor;
use crate::value::Value;

/// Events produced by a [`BundleStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    /// The column layout changed; read it with [`BundleStream::meta`]
    MetaChanged,
    /// A row is available; read it with [`BundleStream::data`]
    NextObject,
    /// No more rows
    EndOfStream,
}

/// A pull-based source of rows
pub trait BundleStream {
    /// Advance the stream
    fn next_event(&mut self) -> Result<StreamEvent>;

    /// Current column layout
    fn meta(&self) -> &[TypeDescriptor];

    /// Value of column `column` in the current row
    fn data(&self, column: usize) -> Option<&Value>;
}

/// Adapts a materialized [`Batch`] to the stream interface
#[derive(Debug)]
pub struct StreamFromBatch {
    batch: Batch,
    meta: Vec<TypeDescriptor>,
    // None before the first row
    cursor: Option<usize>,
    announced: bool,
}

impl StreamFromBatch {
    /// Create a stream over `batch`
    pub fn new(batch: Batch) -> Self {
        let meta = batch.metas();
        Self {
            batch,
            meta,
            cursor: None,
            announced: false,
        }
    }
}

impl BundleStream for StreamFromBatch {
    fn next_event(&mut self) -> Result<StreamEvent> {
        if !self.announced {
            self.announced = true;
            return Ok(StreamEvent::MetaChanged);
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.batch.row_count() {
            self.cursor = Some(self.batch.row_count());
            return Ok(StreamEvent::EndOfStream);
        }
        self.cursor = Some(next);
        Ok(StreamEvent::NextObject)
    }

    fn meta(&self) -> &[TypeDescriptor] {
        &self.meta
    }

    fn data(&self, column: usize) -> Option<&Value> {
        self.cursor.and_then(|row| self.batch.data(row, column))
    }
}
