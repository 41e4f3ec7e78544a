//! Store builder for fluent configuration
//!
//! ```ignore
//! use relstore_engine::{Store, index::KnnIndexFactory};
//!
//! // 1. Defaults
//! let store = Store::new();
//!
//! // 2. Builder with factories, an initial source and a config file
//! let mut store = Store::builder()
//!     .config_file("relstore.toml")?
//!     .index_factory(KnnIndexFactory::default())
//!     .source(BatchSource::new(batch))
//!     .build()?;
//! store.initialize()?;
//! ```

use super::{Store, StoreConfig, StoreListener};
use crate::index::IndexFactory;
use crate::source::DataSource;
use relstore_core::Result;
use std::path::Path;

// ============================================================================
// Store Builder Pattern
// ============================================================================

/// Builder for [`Store`] configuration
///
/// Factories must be registered before data arrives: they are applied to
/// relations as those are created and never retroactively.
#[derive(Default)]
pub struct StoreBuilder {
    config: StoreConfig,
    factories: Vec<Box<dyn IndexFactory>>,
    listeners: Vec<Box<dyn StoreListener>>,
    source: Option<Box<dyn DataSource>>,
}

impl StoreBuilder {
    /// Create new builder with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a `relstore.toml` file
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = StoreConfig::from_file(path.as_ref())?;
        Ok(self)
    }

    /// Pre-scan batches for duplicate ids before mutating
    pub fn atomic_insert(mut self, enabled: bool) -> Self {
        self.config.atomic_insert = enabled;
        self
    }

    /// Register an index factory
    pub fn index_factory<F: IndexFactory + 'static>(mut self, factory: F) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Register a listener
    pub fn listener<L: StoreListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Data loaded by [`Store::initialize`]
    pub fn source<S: DataSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Build the store
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is out of range.
    pub fn build(self) -> Result<Store> {
        self.config.validate()?;
        let mut store = Store::with_config(self.config);
        for factory in self.factories {
            store.add_index_factory(factory);
        }
        for listener in self.listeners {
            store.add_listener(listener);
        }
        if let Some(source) = self.source {
            store.set_source(source);
        }
        Ok(store)
    }
}

impl std::fmt::Debug for StoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("config", &self.config)
            .field("factories", &self.factories.len())
            .field("listeners", &self.listeners.len())
            .field("source", &self.source.is_some())
            .finish()
    }
}
