//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/depenv/depenv.toml`
//! 3. Project config: `<project_dir>/.depenv.toml`
//! 4. Environment variables: `DEPENV_*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::EnvironmentConfig;

/// Raw settings for intermediate parsing (fields are Option to detect
/// "not specified" during layered merging).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub stack_prefix: Option<String>,
    pub domain: Option<String>,
    pub default_environment: Option<String>,
    pub backend_suffix: Option<String>,
    pub frontend_suffix: Option<String>,
    pub environments: Option<BTreeMap<String, EnvironmentConfig>>,
}

/// Unified configuration for depenv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Prefix for cloud stack names (stack = `<prefix>-<deployment>`)
    pub stack_prefix: String,
    /// Apex domain under which subdomains hang
    pub domain: String,
    /// Environment assumed when nothing else can be determined
    pub default_environment: String,
    /// Suffix for synthesized backend subdomains
    pub backend_suffix: String,
    /// Suffix for synthesized frontend subdomains
    pub frontend_suffix: String,
    /// Curated per-environment subdomains (dev/stage/prod and named
    /// temporary environments); anything absent here is synthesized
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stack_prefix: "FinalStack".to_string(),
            domain: "example.com".to_string(),
            default_environment: "dev".to_string(),
            backend_suffix: "backend-cdk-book".to_string(),
            frontend_suffix: "frontend-cdk-book".to_string(),
            environments: BTreeMap::new(),
        }
    }
}

/// Get the XDG config directory for depenv.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "depenv").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("depenv.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".depenv.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Environments table: merged per key, overlay entries win
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut environments = self.environments.clone();
        if let Some(table) = &overlay.environments {
            for (name, entry) in table {
                environments.insert(name.clone(), entry.clone());
            }
        }

        Self {
            stack_prefix: overlay
                .stack_prefix
                .clone()
                .unwrap_or_else(|| self.stack_prefix.clone()),
            domain: overlay.domain.clone().unwrap_or_else(|| self.domain.clone()),
            default_environment: overlay
                .default_environment
                .clone()
                .unwrap_or_else(|| self.default_environment.clone()),
            backend_suffix: overlay
                .backend_suffix
                .clone()
                .unwrap_or_else(|| self.backend_suffix.clone()),
            frontend_suffix: overlay
                .frontend_suffix
                .clone()
                .unwrap_or_else(|| self.frontend_suffix.clone()),
            environments,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/depenv/depenv.toml`
    /// 3. Project config: `<project_dir>/.depenv.toml`
    /// 4. Environment variables: `DEPENV_*` prefix (explicit override)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = project_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Load settings from a single TOML file on top of defaults,
    /// bypassing the layered lookup.
    pub fn load_from(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply DEPENV_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge), scalars only; the curated
    /// environments table comes from config files.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(Environment::with_prefix("DEPENV"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("stack_prefix") {
            settings.stack_prefix = val;
        }
        if let Ok(val) = config.get_string("domain") {
            settings.domain = val;
        }
        if let Ok(val) = config.get_string("default_environment") {
            settings.default_environment = val;
        }
        if let Ok(val) = config.get_string("backend_suffix") {
            settings.backend_suffix = val;
        }
        if let Ok(val) = config.get_string("frontend_suffix") {
            settings.frontend_suffix = val;
        }

        Ok(settings)
    }

    /// Enforce invariants on curated entries and the default environment.
    ///
    /// Every curated subdomain must be a valid DNS label; table keys must
    /// be non-empty; the default environment must itself be a valid label
    /// since it can reach config synthesis verbatim.
    fn validate(&self) -> Result<(), ApplicationError> {
        if !crate::domain::is_dns_label(&self.default_environment) {
            return Err(ApplicationError::Config {
                message: format!(
                    "default_environment is not a valid DNS label: {}",
                    self.default_environment
                ),
            });
        }
        for (name, entry) in &self.environments {
            if name.is_empty() {
                return Err(ApplicationError::Config {
                    message: "environments table contains an empty key".to_string(),
                });
            }
            entry.validate(name)?;
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# depenv configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/depenv/depenv.toml
#   Project: <project_dir>/.depenv.toml
#   Env:     DEPENV_* environment variables (explicit overrides, scalars only)

# Prefix for cloud stack names (stack = "<prefix>-<deployment>")
# stack_prefix = "FinalStack"

# Apex domain for backend/frontend subdomains
# domain = "example.com"

# Environment assumed when no branch can be determined
# default_environment = "dev"

# Suffixes for synthesized subdomains of branch environments:
#   <branch>-backend-cdk-book / <branch>-frontend-cdk-book
# backend_suffix = "backend-cdk-book"
# frontend_suffix = "frontend-cdk-book"

# Curated environments with hand-assigned subdomains. Anything not
# listed here gets a synthesized subdomain pair.
# [environments.prod]
# backend_subdomain = "backend"
# frontend_subdomain = "www"
#
# [environments.dev]
# backend_subdomain = "dev-backend-cdk-book"
# frontend_subdomain = "dev-frontend-cdk-book"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_compiled_defaults_when_created_then_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.stack_prefix, "FinalStack");
        assert_eq!(settings.default_environment, "dev");
        assert!(settings.environments.is_empty());
    }

    #[test]
    fn given_overlay_scalar_when_merging_then_overlay_wins() {
        let base = Settings::default();
        let overlay = RawSettings {
            domain: Some("cdk.example.org".to_string()),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.domain, "cdk.example.org");
        // Unspecified scalars keep base values
        assert_eq!(merged.stack_prefix, "FinalStack");
    }

    #[test]
    fn given_overlay_environments_when_merging_then_entries_replace_per_key() {
        let mut base = Settings::default();
        base.environments.insert(
            "prod".to_string(),
            EnvironmentConfig {
                backend_subdomain: "old-backend".to_string(),
                frontend_subdomain: "old-frontend".to_string(),
            },
        );
        base.environments.insert(
            "dev".to_string(),
            EnvironmentConfig {
                backend_subdomain: "dev-backend".to_string(),
                frontend_subdomain: "dev-frontend".to_string(),
            },
        );

        let mut table = BTreeMap::new();
        table.insert(
            "prod".to_string(),
            EnvironmentConfig {
                backend_subdomain: "backend".to_string(),
                frontend_subdomain: "www".to_string(),
            },
        );
        let overlay = RawSettings {
            environments: Some(table),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.environments["prod"].frontend_subdomain, "www");
        // Untouched keys survive the merge
        assert_eq!(merged.environments["dev"].backend_subdomain, "dev-backend");
    }

    #[test]
    fn given_invalid_curated_subdomain_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.environments.insert(
            "prod".to_string(),
            EnvironmentConfig {
                backend_subdomain: "not a label".to_string(),
                frontend_subdomain: "www".to_string(),
            },
        );

        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let template = Settings::template();
        let parsed: Result<RawSettings, _> = toml::from_str(&template);
        assert!(parsed.is_ok());
    }
}
