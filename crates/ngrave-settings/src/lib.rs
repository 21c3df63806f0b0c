//! ngrave Settings Crate
//!
//! Loads, validates and saves engraving configuration.

pub mod config;
pub mod error;

pub use config::{Config, LoggingSettings, CONFIG_FILE_NAME};
pub use error::{SettingsError, SettingsResult};
