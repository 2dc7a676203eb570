//! Infrastructure layer: storage, configuration, bulk import and the
//! services built on top of them.

pub mod config;
pub mod import;
pub mod services;
pub mod store;

pub use config::{AdminConfig, AppConfig, ConfigError, ImportConfig, LogConfig};
