use thiserror::Error;

/// Errors raised while loading an [`EngineConfig`](super::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON or has the wrong shape
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but cannot be used
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
