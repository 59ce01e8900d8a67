//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `NSW_CONFIG` environment variable
//! 3. User config file (`~/.config/nsw/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! An explicitly named file (1 or 2) must exist and parse. A missing user
//! config file is not an error: a warning is logged and defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::params::ParameterSet;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "NSW_CONFIG";
/// Environment variable overriding the generative-model key
pub const GEMINI_KEY_ENV_VAR: &str = "NSW_GEMINI_KEY";
/// Environment variable overriding the solver token
pub const AMPLIFY_TOKEN_ENV_VAR: &str = "NSW_AMPLIFY_TOKEN";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub form: FormConfig,
    pub export: ExportConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the `/api/...` paths are appended to
    pub base_url: String,

    /// Connection establishment limit; requests themselves have no timeout
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// Initial values of the reviewer form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub gemini_key: String,
    pub amplify_token: String,
    pub topic_main: String,
    pub topic_sub1: String,
    pub topic_sub2: String,
    pub params: ParameterSet,
}

/// Final text export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub final_text_path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { final_text_path: PathBuf::from("novel_scene.txt") }
    }
}

/// Where the configuration was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    CompiledDefaults,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))
    }

    /// Apply credential overrides from the environment
    ///
    /// **Priority:** ENV → TOML
    pub fn apply_env_overrides(&mut self) {
        apply_credential_override(&mut self.form.gemini_key, GEMINI_KEY_ENV_VAR);
        apply_credential_override(&mut self.form.amplify_token, AMPLIFY_TOKEN_ENV_VAR);
    }
}

fn apply_credential_override(field: &mut String, env_var: &str) {
    let Ok(value) = std::env::var(env_var) else {
        return;
    };
    if value.trim().is_empty() {
        return;
    }
    if !field.trim().is_empty() {
        warn!("{} overrides the credential set in the TOML config", env_var);
    } else {
        info!("Credential loaded from environment variable {}", env_var);
    }
    *field = value;
}

/// Default user configuration file path for the platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nsw").join("config.toml"))
}

/// Decide which configuration source applies
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: User config file
    if let Some(path) = user_config_path() {
        if path.exists() {
            return ConfigSource::UserFile(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::CompiledDefaults
}

/// Resolve and load the configuration, then apply environment overrides
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let source = resolve_config_source(cli_arg);
    let mut config = match &source {
        ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => TomlConfig::from_file(path)?,
        ConfigSource::UserFile(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring unreadable user config {}: {}", path.display(), e);
                TomlConfig::default()
            }
        },
        ConfigSource::CompiledDefaults => {
            warn!("No config file found, using compiled defaults");
            TomlConfig::default()
        }
    };
    config.apply_env_overrides();
    Ok((config, source))
}
