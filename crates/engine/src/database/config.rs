//! Store configuration via `relstore.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working store. Call [`StoreConfig::write_default_if_missing`] to drop a
//! commented template next to an application's data.

use relstore_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name used by applications embedding the store.
pub const CONFIG_FILE_NAME: &str = "relstore.toml";

/// Store configuration loaded from `relstore.toml`.
///
/// # Example
///
/// ```toml
/// atomic_insert = false
/// warn_on_static_index = true
/// stream_chunk_size = 1024
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Pre-scan batches for duplicate identities before mutating anything.
    #[serde(default)]
    pub atomic_insert: bool,
    /// Log a warning when a mutation leaves a static index stale.
    #[serde(default = "default_warn_on_static_index")]
    pub warn_on_static_index: bool,
    /// Maximum rows per chunk when inserting from a bundle stream.
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
}

fn default_warn_on_static_index() -> bool {
    true
}

fn default_stream_chunk_size() -> usize {
    1024
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            atomic_insert: false,
            warn_on_static_index: default_warn_on_static_index(),
            stream_chunk_size: default_stream_chunk_size(),
        }
    }
}

impl StoreConfig {
    /// Check field ranges
    ///
    /// # Errors
    ///
    /// Returns `Config` if `stream_chunk_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.stream_chunk_size == 0 {
            return Err(Error::Config(
                "stream_chunk_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# relstore configuration
#
# Reject a whole insert batch up front when any of its explicit row ids is
# already live or repeated (default: false). When false, rows before the
# conflicting one stay inserted and the call returns DuplicateIdentity.
atomic_insert = false

# Warn when an insert or delete leaves a static index stale (default: true)
warn_on_static_index = true

# Rows per chunk when inserting from a bundle stream (default: 1024)
stream_chunk_size = 1024
"#
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
