//! Layered configuration
//!
//! Resolution order, highest precedence first:
//! 1. Explicit overrides (CLI flags)
//! 2. `CODEMINT_BASE_URL` / `CODEMINT_TOKEN`
//! 3. Project file `.codemint/config.yaml`
//! 4. User file `<config dir>/codemint/config.yaml`
//! 5. Built-in default base URL
//!
//! Missing files are treated as empty; malformed files are errors.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Default catalog service
pub const DEFAULT_BASE_URL: &str = "https://codemint.app";

/// Project-local directory holding the manifest and project config
pub const CODEMINT_DIR: &str = ".codemint";

/// Project config file, relative to the project root
pub const PROJECT_CONFIG_FILE: &str = ".codemint/config.yaml";

pub const BASE_URL_ENV: &str = "CODEMINT_BASE_URL";
pub const TOKEN_ENV: &str = "CODEMINT_TOKEN";

/// Per-project settings (`.codemint/config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Catalog service for this project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Tool ids that take precedence over marker detection; first valid one wins
    #[serde(default)]
    pub tool_overrides: Vec<String>,
}

impl ProjectConfig {
    pub fn load(root: &Path) -> Result<Self> {
        load_yaml(&root.join(PROJECT_CONFIG_FILE))
    }
}

/// Machine-wide settings (`<config dir>/codemint/config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token left behind by the login flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserConfig {
    /// Load from the platform config directory (empty if it cannot be located)
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_yaml(path)
    }

    /// `<config dir>/codemint/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "codemint", "codemint")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("codemint")))
            .map(|dir| dir.join("config.yaml"))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

/// Effective settings for one invocation against one project
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub project: ProjectConfig,
}

impl Settings {
    /// Resolve settings from flags, the process environment and config files
    pub fn resolve(root: &Path, overrides: SettingsOverrides) -> Result<Self> {
        let user = UserConfig::load()?;
        Self::resolve_with(root, overrides, user, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit user config and environment lookup
    pub fn resolve_with(
        root: &Path,
        overrides: SettingsOverrides,
        user: UserConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let project = ProjectConfig::load(root)?;

        let base_url = overrides
            .base_url
            .or_else(|| non_empty(env(BASE_URL_ENV)))
            .or_else(|| project.base_url.clone())
            .or(user.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = non_empty(overrides.token)
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .or_else(|| non_empty(user.token));

        let settings = Self {
            base_url: normalize_base_url(&base_url),
            token,
            project,
        };
        debug!(
            base_url = %settings.base_url,
            authenticated = settings.token.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

/// Trim whitespace and trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        CatalogError::ConfigurationError(format!("Failed to read {}: {e}", path.display()))
    })?;

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml_ng::from_str(&content).map_err(|e| {
        CatalogError::ConfigurationError(format!("Failed to parse {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_project_config(root: &Path, yaml: &str) {
        fs::create_dir_all(root.join(CODEMINT_DIR)).unwrap();
        fs::write(root.join(PROJECT_CONFIG_FILE), yaml).unwrap();
    }

    #[test]
    fn test_defaults_without_any_config() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::resolve_with(
            temp.path(),
            SettingsOverrides::default(),
            UserConfig::default(),
            no_env,
        )
        .unwrap();

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.token.is_none());
        assert!(settings.project.tool_overrides.is_empty());
    }

    #[test]
    fn test_precedence_chain() {
        let temp = TempDir::new().unwrap();
        write_project_config(temp.path(), "baseUrl: https://project.example/\n");
        let user = UserConfig {
            base_url: Some("https://user.example".to_string()),
            token: Some("user-token".to_string()),
        };

        let settings = Settings::resolve_with(
            temp.path(),
            SettingsOverrides::default(),
            user.clone(),
            no_env,
        )
        .unwrap();
        assert_eq!(settings.base_url, "https://project.example");
        assert_eq!(settings.token.as_deref(), Some("user-token"));

        let settings = Settings::resolve_with(
            temp.path(),
            SettingsOverrides::default(),
            user.clone(),
            |key| match key {
                BASE_URL_ENV => Some("https://env.example".to_string()),
                TOKEN_ENV => Some("env-token".to_string()),
                _ => None,
            },
        )
        .unwrap();
        assert_eq!(settings.base_url, "https://env.example");
        assert_eq!(settings.token.as_deref(), Some("env-token"));

        let settings = Settings::resolve_with(
            temp.path(),
            SettingsOverrides {
                base_url: Some("http://localhost:3000//".to_string()),
                token: Some("flag-token".to_string()),
            },
            user,
            |_| Some("ignored".to_string()),
        )
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:3000");
        assert_eq!(settings.token.as_deref(), Some("flag-token"));
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::resolve_with(
            temp.path(),
            SettingsOverrides {
                base_url: None,
                token: Some("  ".to_string()),
            },
            UserConfig::default(),
            no_env,
        )
        .unwrap();
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_project_tool_overrides() {
        let temp = TempDir::new().unwrap();
        write_project_config(temp.path(), "toolOverrides: [claude, cursor]\n");
        let config = ProjectConfig::load(temp.path()).unwrap();
        assert_eq!(config.tool_overrides, vec!["claude", "cursor"]);
    }

    #[test]
    fn test_malformed_project_config_errors() {
        let temp = TempDir::new().unwrap();
        write_project_config(temp.path(), "toolOverrides: {not: [a list\n");
        let err = ProjectConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn test_empty_user_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "").unwrap();
        assert_eq!(UserConfig::load_from_path(&path).unwrap(), UserConfig::default());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" https://a.dev/// "), "https://a.dev");
        assert_eq!(normalize_base_url("https://a.dev"), "https://a.dev");
    }
}
