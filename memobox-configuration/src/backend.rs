//! Store section of the configuration document.

use std::sync::Arc;
use std::time::Duration;

use memobox::MemoizeConfig;
use memobox_backend::format::{BincodeFormat, BitcodeFormat, Format, JsonFormat};
use memobox_backend::Backend as BackendTrait;
use memobox_moka::MokaBackend;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Value encoding used by the store.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum ValueSerialization {
    Json,
    #[default]
    Bincode,
    Bitcode,
}

impl ValueSerialization {
    /// Convert configuration value serialization format to a backend format
    pub fn to_serializer(self) -> Arc<dyn Format> {
        match self {
            ValueSerialization::Json => Arc::new(JsonFormat),
            ValueSerialization::Bincode => Arc::new(BincodeFormat),
            ValueSerialization::Bitcode => Arc::new(BitcodeFormat),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValueFormat {
    #[serde(default)]
    pub format: ValueSerialization,
}

fn default_idle_ttl() -> Option<Duration> {
    Some(Duration::from_secs(3600))
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    /// Optional label for this store (used in metrics, tracing and `info`).
    #[serde(default)]
    pub label: Option<String>,
    /// How long an entry without a TTL may go unread under `adaptive_ttl`.
    #[serde(default = "default_idle_ttl", with = "humantime_serde")]
    pub idle_ttl: Option<Duration>,
    #[serde(default)]
    pub value: ValueFormat,
}

impl Default for Moka {
    fn default() -> Self {
        Self {
            label: None,
            idle_ttl: default_idle_ttl(),
            value: ValueFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Backend {
    Moka(Moka),
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Moka(Moka::default())
    }
}

impl Backend {
    /// Builds the store sized and aged according to `memoize`.
    pub fn into_backend(
        self,
        memoize: &MemoizeConfig,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        match self {
            Backend::Moka(config) => {
                if memoize.size.as_u64() == 0 {
                    return Err(ConfigError::Invalid("memoize.size must not be zero".to_string()));
                }
                let idle_ttl = if memoize.adaptive_ttl {
                    config.idle_ttl
                } else {
                    None
                };

                let mut builder = MokaBackend::builder()
                    .max_bytes(memoize.size.as_u64())
                    .segments(u32::from(memoize.segments.get()))
                    .entries_hint(memoize.max_entries as usize)
                    .default_ttl(memoize.fallback_ttl())
                    .idle_ttl(idle_ttl)
                    .value_format(config.value.format.to_serializer());

                if let Some(label) = config.label {
                    builder = builder.label(label);
                }

                Ok(Arc::new(builder.build()))
            }
        }
    }
}
