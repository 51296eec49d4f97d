//! Configuration module for the stager.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, AnonymizeSettings, DatabaseSettings, Settings, SettingsError,
    StagingSettings, TableSettings,
};
