//! Engine configuration
//!
//! Controls arity enforcement and the identity deny-lists applied when static
//! and prototype surfaces are merged. Loadable from TOML and overridable from
//! `COMPOSED_MODEL_*` environment variables.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use crate::errors::ComposeError;

/// Static names that must never be copied onto a template
pub const STATIC_IDENTITY_NAMES: [&str; 3] = ["length", "name", "prototype"];

/// Prototype names that must never be copied onto a template's prototype
pub const PROTOTYPE_IDENTITY_NAMES: [&str; 1] = ["constructor"];

const ENV_STRICT_ARITY: &str = "COMPOSED_MODEL_STRICT_ARITY";

static GLOBAL: Lazy<EngineConfig> = Lazy::new(EngineConfig::from_env_or_default);

/// Composition engine settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject construction with fewer arguments than the class arity
    pub strict_arity: bool,
    /// Names skipped when merging static surfaces
    pub static_deny_list: Vec<String>,
    /// Names skipped when merging prototype surfaces
    pub prototype_deny_list: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_arity: true,
            static_deny_list: STATIC_IDENTITY_NAMES.iter().map(|s| (*s).to_string()).collect(),
            prototype_deny_list: PROTOTYPE_IDENTITY_NAMES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Process-wide configuration: defaults merged with the environment
    pub fn global() -> &'static EngineConfig {
        &GLOBAL
    }

    /// Defaults merged with the environment; invalid overrides are ignored
    pub fn from_env_or_default() -> Self {
        let mut config = EngineConfig::default();
        if let Err(err) = config.merge_with_env() {
            warn!(error = %err, "ignoring invalid environment configuration");
            config = EngineConfig::default();
        }
        config
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ComposeError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|source| ComposeError::ConfigParse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self, ComposeError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ComposeError::ConfigRead {
                path: path.to_path_buf(),
                source: Arc::new(source),
            })?;
        Self::from_toml_str(&content)
    }

    /// Merge with environment variables
    pub fn merge_with_env(&mut self) -> Result<(), ComposeError> {
        if let Ok(raw) = std::env::var(ENV_STRICT_ARITY) {
            self.strict_arity = parse_bool(&raw).ok_or_else(|| {
                ComposeError::config(format!("{ENV_STRICT_ARITY} must be a boolean, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Deny-lists may be extended but never drop an identity name.
    pub fn validate(&self) -> Result<(), ComposeError> {
        for required in STATIC_IDENTITY_NAMES {
            if !self.static_deny_list.iter().any(|n| n == required) {
                return Err(ComposeError::config(format!(
                    "static_deny_list must contain '{required}'"
                )));
            }
        }
        for required in PROTOTYPE_IDENTITY_NAMES {
            if !self.prototype_deny_list.iter().any(|n| n == required) {
                return Err(ComposeError::config(format!(
                    "prototype_deny_list must contain '{required}'"
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
