//! Configuration module for terrasprite
//!
//! Provides types and parsing for `terrasprite.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError, CONFIG_FILE_NAME};
pub use schema::*;
