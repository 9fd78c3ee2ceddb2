// Settings for the smoke harness.
//
// Values are resolved in order of precedence:
// 1. Command-line flags (base URL only)
// 2. `IMAGE_API_URL` environment variable (base URL only)
// 3. Config file (`<config dir>/image-api-smoke/config.json`)
// 4. The literal fixtures below

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_USER_ID: &str = "1sd";
pub const DEFAULT_IMAGE_ID: &str =
    "a9a6c006cf18943fa06d68f6f8ff35dffbc49d4e3ee8c50d74ce50c5c01f678d";
pub const DEFAULT_HEIGHT: u32 = 100;
pub const DEFAULT_WIDTH: u32 = 500;

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "IMAGE_API_URL";

/// Harness settings. Every field has a default, so a partial config file
/// is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub user_id: String,
    pub image_id: String,
    pub height: u32,
    pub width: u32,
    /// Base URL from the file or defaults; what `save` writes back.
    #[serde(skip)]
    stored_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            image_id: DEFAULT_IMAGE_ID.to_string(),
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            stored_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("image-api-smoke").join("config.json"))
    }

    /// Load from the default file (if any), then apply `IMAGE_API_URL` and
    /// the `--base-url` flag.
    pub fn load(cli_base_url: Option<String>) -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.resolve(std::env::var(BASE_URL_ENV).ok(), cli_base_url)
    }

    /// Apply base URL overrides, flag over env, and validate only the
    /// winning value.
    pub fn resolve(
        mut self,
        env_base_url: Option<String>,
        cli_base_url: Option<String>,
    ) -> Result<Self> {
        if let Some(url) = cli_base_url.or(env_base_url) {
            self.base_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    /// Whether the active base URL came from the environment or a flag.
    pub fn base_url_overridden(&self) -> bool {
        self.base_url != self.stored_base_url
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.stored_base_url = config.base_url.clone();
        Ok(config)
    }

    /// Write the settings as pretty JSON, creating parent directories.
    /// A base URL override is not persisted; the stored one is kept.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let persisted = Config {
            base_url: self.stored_base_url.clone(),
            ..self.clone()
        };
        let data = serde_json::to_string_pretty(&persisted)?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Persist to the default location and return where it went.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path().unwrap_or_else(|| PathBuf::from("image-api-smoke.json"));
        self.save_to(&path)?;
        Ok(path)
    }

    /// Base URL must be absolute http(s); a trailing slash is dropped.
    pub fn validate(&mut self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Base URL must use http or https, got '{}'", url.scheme());
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.stored_base_url = self.stored_base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixtures() {
        let c = Config::default();
        assert_eq!(c.base_url, "http://localhost:3000");
        assert_eq!(c.user_id, "1sd");
        assert_eq!(c.height, 100);
        assert_eq!(c.width, 500);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"user_id": "42"}"#).unwrap();
        let c = Config::from_file(&path).unwrap();
        assert_eq!(c.user_id, "42");
        assert_eq!(c.image_id, DEFAULT_IMAGE_ID);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let c = Config {
            width: 64,
            ..Config::default()
        };
        c.save_to(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), c);
    }

    #[test]
    fn flag_wins_over_invalid_env_value() {
        let c = Config::default()
            .resolve(Some("not a url".into()), Some("http://example.com:8080/".into()))
            .unwrap();
        assert_eq!(c.base_url, "http://example.com:8080");
    }

    #[test]
    fn flag_wins_over_invalid_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "nope"}"#).unwrap();
        let c = Config::from_file(&path)
            .unwrap()
            .resolve(None, Some("http://localhost:4000".into()))
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:4000");
    }

    #[test]
    fn env_applies_without_flag_and_is_validated() {
        let c = Config::default()
            .resolve(Some("http://10.0.0.2:3000".into()), None)
            .unwrap();
        assert_eq!(c.base_url, "http://10.0.0.2:3000");
        assert!(Config::default()
            .resolve(Some("not a url".into()), None)
            .is_err());
    }

    #[test]
    fn override_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://stored:3000", "user_id": "7"}"#).unwrap();

        let mut c = Config::from_file(&path)
            .unwrap()
            .resolve(Some("http://from-env:3000".into()), None)
            .unwrap();
        assert!(c.base_url_overridden());
        c.width = 64;
        c.save_to(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.base_url, "http://stored:3000");
        assert_eq!(reloaded.user_id, "7");
        assert_eq!(reloaded.width, 64);
        assert!(!reloaded.base_url_overridden());
    }

    #[test]
    fn validate_trims_and_rejects() {
        let mut c = Config {
            base_url: "http://localhost:3000/".into(),
            ..Config::default()
        };
        c.validate().unwrap();
        assert_eq!(c.base_url, "http://localhost:3000");

        c.base_url = "ftp://example.com".into();
        assert!(c.validate().is_err());
        c.base_url = "not a url".into();
        assert!(c.validate().is_err());
    }
}
