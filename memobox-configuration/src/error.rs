use thiserror::Error;

/// Failure to load or apply a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid YAML or does not match the schema.
    #[error("cannot parse configuration: {0}")]
    Parse(String),

    /// The document parsed but describes an unusable setup.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
