//! Engine configuration loaded from JSON.

mod engine;
mod error;

pub use engine::EngineConfig;
pub use error::ConfigError;
