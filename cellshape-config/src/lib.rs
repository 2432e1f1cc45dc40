//! Configuration for cellshape.
//!
//! A single YAML file (`~/.config/cellshape/config.yaml`) holds the cell
//! geometry, font preferences, cache sizes and log level shared by the
//! library and the `cellshape` binary.

pub mod config;
pub mod defaults;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::LogLevel;
