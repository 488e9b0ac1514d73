use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};
use tracing::{debug, warn};

/// Environment variable holding the rate provider API key.
pub const API_KEY_ENV: &str = "FXCONV_API_KEY";
/// Fallback variable name, checked when `API_KEY_ENV` is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_FIXER_URL: &str = "https://data.fixer.io/api";
pub const DEFAULT_PRECISION: usize = 2;

/// Where the API key travels on each request.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyPlacement {
    /// `access_key` query parameter, as used by data.fixer.io
    #[default]
    Query,
    /// `apikey` request header, as used by the apilayer gateway
    Header,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixerProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub key_placement: KeyPlacement,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fixer: Option<FixerProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fixer: Some(FixerProviderConfig {
                base_url: DEFAULT_FIXER_URL.to_string(),
                key_placement: KeyPlacement::Query,
            }),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub precision: Option<usize>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("providers", &self.providers)
            .field("precision", &self.precision)
            .finish()
    }
}

/// Loads a `.env` file from the working directory or its parents. Variables
/// already present in the process environment are left untouched.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }
}

/// Loads a specific `.env` file without overriding existing variables.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) -> Result<()> {
    dotenvy::from_path(path.as_ref())
        .with_context(|| format!("Failed to load env file: {}", path.as_ref().display()))
}

impl AppConfig {
    /// Loads the config from the default location. A missing file is not an
    /// error since the API key may come from the environment.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn fixer(&self) -> FixerProviderConfig {
        self.providers
            .fixer
            .clone()
            .unwrap_or_else(|| FixerProviderConfig {
                base_url: DEFAULT_FIXER_URL.to_string(),
                key_placement: KeyPlacement::default(),
            })
    }

    /// Resolves the API key, preferring the process environment over the file.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        [API_KEY_ENV, FALLBACK_API_KEY_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .chain(self.api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_key: "file-key"
providers:
  fixer:
    base_url: "https://api.apilayer.com/fixer"
    key_placement: header
precision: 4
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.precision, Some(4));
        let fixer = config.fixer();
        assert_eq!(fixer.base_url, "https://api.apilayer.com/fixer");
        assert_eq!(fixer.key_placement, KeyPlacement::Header);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("api_key: abc").unwrap();
        assert!(config.precision.is_none());
        let fixer = config.fixer();
        assert_eq!(fixer.base_url, DEFAULT_FIXER_URL);
        assert_eq!(fixer.key_placement, KeyPlacement::Query);

        let config: AppConfig = serde_yaml::from_str(
            r#"
providers:
  fixer:
    base_url: "http://localhost:1234"
"#,
        )
        .unwrap();
        assert_eq!(config.fixer().key_placement, KeyPlacement::Query);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_rejects_unknown_key_placement() {
        let yaml_str = r#"
providers:
  fixer:
    base_url: "http://localhost"
    key_placement: cookie
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }

    #[test]
    fn test_api_key_precedence() {
        let config = AppConfig {
            api_key: Some("from-file".to_string()),
            ..AppConfig::default()
        };

        let env = HashMap::from([
            (API_KEY_ENV, "primary"),
            (FALLBACK_API_KEY_ENV, "fallback"),
        ]);
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());
        assert_eq!(config.api_key_from(lookup).as_deref(), Some("primary"));

        let env = HashMap::from([(FALLBACK_API_KEY_ENV, "fallback")]);
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());
        assert_eq!(config.api_key_from(lookup).as_deref(), Some("fallback"));

        assert_eq!(config.api_key_from(|_| None).as_deref(), Some("from-file"));
    }

    #[test]
    fn test_blank_api_keys_are_ignored() {
        let config = AppConfig {
            api_key: Some("   ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.api_key_from(|_| Some(String::new())).is_none());
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("super-secret".to_string()),
            ..AppConfig::default()
        };
        let output = format!("{config:?}");
        assert!(!output.contains("super-secret"));
        assert!(output.contains("<redacted>"));
    }

    #[test]
    fn test_dotenv_file_supplies_missing_variables_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let env_path = dir.path().join(".env");
        fs::write(
            &env_path,
            "FXCONV_DOTENV_TEST_KEY=from-dotenv\nPATH=overridden-by-dotenv\n",
        )
        .unwrap();

        load_dotenv_from(&env_path).unwrap();

        assert_eq!(
            std::env::var("FXCONV_DOTENV_TEST_KEY").as_deref(),
            Ok("from-dotenv")
        );
        // Variables already set in the process win over the file
        assert_ne!(
            std::env::var("PATH").as_deref(),
            Ok("overridden-by-dotenv")
        );
    }

    #[test]
    fn test_load_dotenv_from_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_dotenv_from(dir.path().join(".env")).unwrap_err();
        assert!(err.to_string().contains("Failed to load env file"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
