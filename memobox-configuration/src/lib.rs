//! # memobox-configuration
//!
//! Loads memobox settings from a YAML document and assembles a ready
//! [`Memoizer`].
//!
//! ```yaml
//! memoize:
//!   enabled: true
//!   segments: 2
//!   size: 64 MiB
//!   max_entries: 8192
//!   default_ttl: 10m
//!   adaptive_ttl: true
//! backend:
//!   type: Moka
//!   label: memoize
//!   idle_ttl: 30m
//!   value:
//!     format: Bincode
//! ```
//!
//! Both sections are optional; missing settings take their defaults.

pub mod backend;
pub mod error;

use std::path::Path;
use std::sync::Arc;

use memobox::{FunctionTable, MemoizeConfig, Memoizer};
use memobox_backend::Backend as BackendTrait;
use serde::{Deserialize, Serialize};

pub use backend::{Backend, Moka, ValueFormat, ValueSerialization};
pub use error::ConfigError;

/// Store type produced by [`MemoboxConfig::into_memoizer`].
pub type DynBackend = Arc<dyn BackendTrait + Send + 'static>;

/// A complete configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MemoboxConfig {
    /// Interception settings.
    #[serde(default)]
    pub memoize: MemoizeConfig,
    /// Store settings.
    #[serde(default)]
    pub backend: Backend,
}

impl MemoboxConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&yaml)?;
        tracing::debug!(path = %path.display(), "memobox configuration loaded");
        Ok(config)
    }

    /// Builds the store and the interceptor for the program in `table`.
    pub fn into_memoizer(self, table: Arc<FunctionTable>) -> Result<Memoizer<DynBackend>, ConfigError> {
        let backend = self.backend.into_backend(&self.memoize)?;
        Ok(Memoizer::new(self.memoize, backend, table))
    }
}
