//! TOML-based configuration for the stager.
//!
//! Supports a config file (ldp.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! dialect = "redshift"
//! ldp_user = "${LDP_USER}"
//! ldpconfig_user = "ldpconfig"
//! tenant_id = 1
//!
//! [staging]
//! load_dir = "/var/lib/ldp/load"
//! batch_threshold = 16500000
//! include_test_file = false
//!
//! [anonymize]
//! tables = ["user_users"]
//! personal_paths = ["/customFields/nickname"]
//!
//! [[tables]]
//! name = "local_widgets"
//! source_path = "/widgets"
//! module = "mod-widgets"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{Catalog, TableSchema};
use crate::sql::dialect::Dialect;
use crate::stage::anonymize::{Anonymizer, PathClassifier};
use crate::stage::batch::DEFAULT_BATCH_THRESHOLD;
use crate::stage::orchestrator::StageOptions;
use crate::stage::provision::{
    ProvisionOptions, DEFAULT_API_REFERENCE_URL, DEFAULT_COMMENT_EXEMPT_MODULE,
};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Target database.
    pub database: DatabaseSettings,

    /// Staging behavior.
    pub staging: StagingSettings,

    /// Personal data redaction.
    pub anonymize: AnonymizeSettings,

    /// Tables added to the built-in catalog.
    pub tables: Vec<TableSettings>,
}

/// Target database settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database dialect (postgres, redshift).
    pub dialect: String,

    /// Role granted read access to staged tables (supports ${ENV_VAR}).
    pub ldp_user: String,

    /// Administrative role granted read access (supports ${ENV_VAR}).
    pub ldpconfig_user: String,

    /// Tenant marker stored with every row.
    pub tenant_id: i16,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            ldp_user: "ldp".to_string(),
            ldpconfig_user: "ldpconfig".to_string(),
            tenant_id: 1,
        }
    }
}

/// Staging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StagingSettings {
    /// Directory holding extracted pages (supports ${ENV_VAR}).
    pub load_dir: Option<String>,

    /// INSERT statement size, in bytes, past which a batch is flushed.
    pub batch_threshold: usize,

    /// Also stage `<table>_test.json` when present.
    pub include_test_file: bool,

    /// Module whose tables get no comment. Empty string disables.
    pub comment_exempt_module: String,

    /// Base URL of the API reference used in table comments.
    pub api_reference_url: String,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            load_dir: None,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            include_test_file: true,
            comment_exempt_module: DEFAULT_COMMENT_EXEMPT_MODULE.to_string(),
            api_reference_url: DEFAULT_API_REFERENCE_URL.to_string(),
        }
    }
}

/// Anonymization settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnonymizeSettings {
    /// Tables whose records are redacted.
    pub tables: Vec<String>,

    /// JSON pointer paths treated as personal in addition to the defaults.
    pub personal_paths: Vec<String>,
}

/// An extra catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableSettings {
    pub name: String,
    pub source_path: String,
    pub module: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LDP_CONFIG`
    /// 2. `./ldp.toml`
    /// 3. `~/.config/ldp/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("LDP_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("ldp.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ldp").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.dialect()?;
        if self.staging.batch_threshold == 0 {
            return Err(SettingsError::InvalidConfig(
                "staging.batch_threshold must be greater than zero".to_string(),
            ));
        }
        if let Some(table) = self.tables.iter().find(|t| t.name.trim().is_empty()) {
            return Err(SettingsError::InvalidConfig(format!(
                "table with source path '{}' has no name",
                table.source_path
            )));
        }
        Ok(())
    }

    /// The configured dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        self.database
            .dialect
            .parse()
            .map_err(|_| SettingsError::UnknownDialect(self.database.dialect.clone()))
    }

    /// The load directory with environment variables expanded.
    pub fn load_dir(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.staging
            .load_dir
            .as_deref()
            .map(|dir| expand_env_vars(dir).map(PathBuf::from))
            .transpose()
    }

    /// Options for staging, with role names expanded.
    pub fn stage_options(&self) -> Result<StageOptions, SettingsError> {
        let exempt = self.staging.comment_exempt_module.trim();
        Ok(StageOptions {
            dialect: self.dialect()?,
            tenant_id: self.database.tenant_id,
            batch_threshold: self.staging.batch_threshold,
            include_test_file: self.staging.include_test_file,
            provision: ProvisionOptions {
                ldp_user: expand_env_vars(&self.database.ldp_user)?,
                ldpconfig_user: expand_env_vars(&self.database.ldpconfig_user)?,
                comment_exempt_module: (!exempt.is_empty()).then(|| exempt.to_string()),
                api_reference_url: self.staging.api_reference_url.clone(),
            },
        })
    }

    /// The built-in catalog plus configured tables.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::builtin();
        for table in &self.tables {
            catalog.add(TableSchema::new(
                &table.name,
                &table.source_path,
                &table.module,
            ));
        }
        catalog
    }

    /// Anonymizer for the configured tables.
    pub fn anonymizer(&self) -> Anonymizer {
        if self.anonymize.tables.is_empty() {
            return Anonymizer::inactive();
        }
        Anonymizer::new(
            self.anonymize.tables.iter().cloned(),
            PathClassifier::with_defaults(&self.anonymize.personal_paths),
        )
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            // $VAR ends at the first non-alphanumeric, non-underscore char
            let name: String =
                std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_'))
                    .collect();
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("LDP_TEST_VAR", "hello");
        assert_eq!(expand_env_vars("${LDP_TEST_VAR}").unwrap(), "hello");
        assert_eq!(
            expand_env_vars("prefix_${LDP_TEST_VAR}_suffix").unwrap(),
            "prefix_hello_suffix"
        );
        env::remove_var("LDP_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("LDP_TEST_VAR2", "world");
        assert_eq!(expand_env_vars("$LDP_TEST_VAR2").unwrap(), "world");
        assert_eq!(expand_env_vars("$LDP_TEST_VAR2!").unwrap(), "world!");
        assert_eq!(expand_env_vars("cost: $").unwrap(), "cost: $");
        env::remove_var("LDP_TEST_VAR2");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${NONEXISTENT_VAR_12345}");
        assert!(matches!(result, Err(SettingsError::MissingEnvVar(name)) if name == "NONEXISTENT_VAR_12345"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[database]
dialect = "redshift"
ldp_user = "reader"
tenant_id = 3

[staging]
load_dir = "/tmp/load"
batch_threshold = 1000
include_test_file = false
comment_exempt_module = ""

[anonymize]
tables = ["user_users"]
personal_paths = ["/customFields/nickname"]

[[tables]]
name = "local_widgets"
source_path = "/widgets"
module = "mod-widgets"
"#;

        let settings: Settings = toml::from_str(toml).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.dialect().unwrap(), Dialect::Redshift);
        assert_eq!(settings.load_dir().unwrap(), Some(PathBuf::from("/tmp/load")));

        let options = settings.stage_options().unwrap();
        assert_eq!(options.tenant_id, 3);
        assert_eq!(options.batch_threshold, 1000);
        assert!(!options.include_test_file);
        assert_eq!(options.provision.ldp_user, "reader");
        assert_eq!(options.provision.ldpconfig_user, "ldpconfig");
        assert_eq!(options.provision.comment_exempt_module, None);

        let catalog = settings.catalog();
        assert_eq!(catalog.get("local_widgets").unwrap().module, "mod-widgets");
        assert!(catalog.get("user_users").is_some());

        let anonymizer = settings.anonymizer();
        assert!(anonymizer.is_active_for("user_users"));
        assert!(!anonymizer.is_active_for("circulation_loans"));
    }

    #[test]
    fn test_default_settings() {
        let settings: Settings = toml::from_str("").unwrap();
        settings.validate().unwrap();

        let options = settings.stage_options().unwrap();
        assert_eq!(options.dialect, Dialect::Postgres);
        assert_eq!(options.tenant_id, 1);
        assert_eq!(options.batch_threshold, 16_500_000);
        assert!(options.include_test_file);
        assert_eq!(
            options.provision.comment_exempt_module.as_deref(),
            Some("mod-agreements")
        );
        assert_eq!(settings.load_dir().unwrap(), None);
        assert!(!settings.anonymizer().is_active_for("user_users"));
    }

    #[test]
    fn test_invalid_settings() {
        let settings: Settings = toml::from_str("[database]\ndialect = \"mysql\"").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::UnknownDialect(d)) if d == "mysql"
        ));

        let settings: Settings = toml::from_str("[staging]\nbatch_threshold = 0").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Settings::from_file("/nonexistent/ldp.toml");
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }
}
