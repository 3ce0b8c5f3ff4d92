use anyhow::{Context, Result, anyhow, bail};
use chrono::Duration;
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::Coordinates;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Overrides the stored API key when set and non-empty.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
/// Explicit config file path.
pub const CONFIG_PATH_ENV: &str = "SKYWATCH_CONFIG";

/// Credentials for the weather provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// The single fixed point the dashboard reports for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: "Starbase, TX".to_string(),
            latitude: 25.993217,
            longitude: -97.172555,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// refresh_interval_secs = 60
/// timezone = "America/Chicago"
///
/// [location]
/// name = "Starbase, TX"
/// latitude = 25.993217
/// longitude = -97.172555
///
/// [provider]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub refresh_interval_secs: u64,
    /// IANA zone name used for the station clock and sunrise/sunset.
    pub timezone: String,
    pub location: LocationConfig,
    pub provider: Option<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            location: LocationConfig::default(),
            provider: None,
        }
    }
}

/// Validated, ready-to-use view of [`Config`] for an evaluation session.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSettings {
    pub location_name: String,
    pub coordinates: Coordinates,
    pub timezone: Tz,
    pub refresh_interval: Duration,
}

impl Config {
    /// Load config from disk, or defaults if it doesn't exist yet, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;

        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(key) = env::var(API_KEY_ENV) {
            cfg.apply_api_key_override(&key);
        }

        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
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
        if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(explicit));
        }

        let dirs = ProjectDirs::from("dev", "skywatch", "skywatch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.provider = Some(ProviderConfig { api_key });
    }

    pub fn api_key(&self) -> Option<&str> {
        self.provider
            .as_ref()
            .map(|p| p.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    fn apply_api_key_override(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            log::debug!("Using API key from {API_KEY_ENV}");
            self.set_api_key(key.to_string());
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| anyhow!("Unknown timezone '{}': {err}", self.timezone))
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        let secs = self.refresh_interval_secs;
        if !(1..=MAX_REFRESH_INTERVAL_SECS).contains(&secs) {
            bail!("refresh_interval_secs must be 1..={MAX_REFRESH_INTERVAL_SECS}, got {secs}");
        }

        Ok(Duration::seconds(secs as i64))
    }

    /// Validate coordinates, zone and interval into [`StationSettings`].
    pub fn station_settings(&self) -> Result<StationSettings> {
        let LocationConfig {
            name,
            latitude,
            longitude,
        } = &self.location;

        if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
            bail!("Location {name} has out-of-range coordinates ({latitude}, {longitude})");
        }

        Ok(StationSettings {
            location_name: name.clone(),
            coordinates: self.coordinates(),
            timezone: self.timezone()?,
            refresh_interval: self.refresh_interval()?,
        })
    }
}
