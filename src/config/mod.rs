use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_GEOCODER_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOCALITY: &str = "somerville";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_YEAR: &str = "2025";
pub const DEFAULT_DATA_DIR: &str = "data";

fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}
fn default_locality() -> String {
    DEFAULT_LOCALITY.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub geocoder: Option<GeocoderConfig>,
    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
}

/// Where and how addresses are looked up.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service, without `/search.php`.
    #[serde(default = "default_geocoder_url")]
    pub url: String,
    /// Appended to every query that doesn't already mention it.
    #[serde(default = "default_locality")]
    pub locality: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            locality: default_locality(),
        }
    }
}

/// Date and zone that clock times like `2:00pm` are bound to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScheduleConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// `YYYY-MM-DD`; today's date in `timezone` when unset.
    #[serde(default)]
    pub event_date: Option<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            event_date: None,
        }
    }
}

impl ScheduleConfig {
    pub fn zone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown time zone {:?}: {}", self.timezone, e))
    }

    pub fn date(&self) -> Result<Option<NaiveDate>> {
        self.event_date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                    .with_context(|| format!("Invalid event_date {:?}, expected YYYY-MM-DD", d))
            })
            .transpose()
    }
}

impl FileConfig {
    /// Load the first parseable config file from the usual locations.
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file; a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("porchmap.toml"));
    paths.push(PathBuf::from(".porchmap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("porchmap").join("config.toml"));
        paths.push(config_dir.join("porchmap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".porchmap.toml"));
    }

    paths
}
