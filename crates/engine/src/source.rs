//! Initial data sources
//!
//! A [`DataSource`] supplies the batch a store is populated with when
//! [`Store::initialize`](crate::Store::initialize) runs. Parsing and
//! filtering happen upstream; the store only sees the resulting batch.

use relstore_core::{Batch, BundleStream, Result};

/// Supplies the initial contents of a store
pub trait DataSource: Send + Sync {
    /// Produce the batch to insert
    fn load_data(&mut self) -> Result<Batch>;
}

/// A source handing over one prepared batch
#[derive(Debug, Clone, Default)]
pub struct BatchSource {
    batch: Option<Batch>,
}

impl BatchSource {
    /// Source yielding `batch` once
    pub fn new(batch: Batch) -> Self {
        Self { batch: Some(batch) }
    }

    /// Source materializing a bundle stream up front
    pub fn from_stream(stream: &mut dyn BundleStream) -> Result<Self> {
        Ok(Self::new(Batch::from_stream(stream)?))
    }
}

impl DataSource for BatchSource {
    fn load_data(&mut self) -> Result<Batch> {
        Ok(self.batch.take().unwrap_or_default())
    }
}
