use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_WEATHER_IMAGE_URL: &str = "https://openweathermap.org/img/wn";
pub const DEFAULT_DIRECTORY_URL: &str = "https://countries.trevorblades.com/graphql";

pub const ENV_WEATHER_API_KEY: &str = "COUNTRIES_WEATHER_API_KEY";
pub const ENV_WEATHER_API_URL: &str = "COUNTRIES_WEATHER_API_URL";
pub const ENV_WEATHER_IMAGE_URL: &str = "COUNTRIES_WEATHER_IMAGE_URL";
pub const ENV_DIRECTORY_URL: &str = "COUNTRIES_DIRECTORY_URL";

/// Everything the weather adapter needs, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSettings {
    pub api_key: String,
    pub api_url: String,
    pub image_url: String,
}

/// Example TOML:
/// [weather]
/// api_key = "..."
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeatherSection {
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_image_url")]
    pub image_url: String,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self { api_key: None, api_url: default_api_url(), image_url: default_image_url() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectorySection {
    #[serde(default = "default_directory_url")]
    pub url: String,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self { url: default_directory_url() }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherSection,
    #[serde(default)]
    pub directory: DirectorySection,
}

fn default_api_url() -> String {
    DEFAULT_WEATHER_API_URL.to_string()
}

fn default_image_url() -> String {
    DEFAULT_WEATHER_IMAGE_URL.to_string()
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

impl Config {
    /// Load config from disk (or defaults if there is no file yet), then apply
    /// `COUNTRIES_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "country-explorer", "countries")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overwrite fields from a variable lookup; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_WEATHER_API_KEY) {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = get(ENV_WEATHER_API_URL) {
            self.weather.api_url = url;
        }
        if let Some(url) = get(ENV_WEATHER_IMAGE_URL) {
            self.weather.image_url = url;
        }
        if let Some(url) = get(ENV_DIRECTORY_URL) {
            self.directory.url = url;
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    pub fn api_key(&self) -> Option<&str> {
        self.weather.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_weather_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Resolved weather adapter settings. A missing key is a setup problem.
    pub fn weather_settings(&self) -> Result<WeatherSettings> {
        let api_key = self.api_key().ok_or_else(|| {
            anyhow!(
                "No weather API key configured.\n\
                 Hint: run `countries configure` or set {ENV_WEATHER_API_KEY}."
            )
        })?;

        Ok(WeatherSettings {
            api_key: api_key.to_owned(),
            api_url: self.weather.api_url.clone(),
            image_url: self.weather.image_url.clone(),
        })
    }

    pub fn directory_url(&self) -> &str {
        &self.directory.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn weather_settings_error_when_key_missing() {
        let cfg = Config::default();
        let err = cfg.weather_settings().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No weather API key configured"));
        assert!(msg.contains("Hint: run `countries configure`"));
        assert!(!cfg.is_weather_configured());
    }

    #[test]
    fn weather_settings_use_defaults_for_urls() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        let settings = cfg.weather_settings().expect("key is set");
        assert_eq!(settings.api_key, "KEY");
        assert_eq!(settings.api_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(settings.image_url, DEFAULT_WEATHER_IMAGE_URL);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg = Config::from_toml("[weather]\napi_key = \"abc\"\n").expect("valid toml");

        assert_eq!(cfg.api_key(), Some("abc"));
        assert_eq!(cfg.weather.api_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(cfg.directory_url(), DEFAULT_DIRECTORY_URL);
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let cfg = Config::from_toml("[weather]\napi_key = \"\"\n").unwrap();
        assert!(cfg.weather_settings().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.directory.url = "http://localhost:4000/graphql".into();

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn overrides_replace_non_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_WEATHER_API_KEY, "ENV_KEY"),
            (ENV_WEATHER_IMAGE_URL, "https://img.example"),
            (ENV_DIRECTORY_URL, "  "),
        ]);

        let mut cfg = Config::default();
        cfg.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.weather.image_url, "https://img.example");
        assert_eq!(cfg.weather.api_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(cfg.directory_url(), DEFAULT_DIRECTORY_URL);
    }
}
