//! Configuration management for Gridfeed
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{GridFeedError, Result};
use crate::format::{format_date, format_time_range};
use crate::types::TimeAggregate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod defaults;

/// Default polling cadence for live feeds (5 minutes)
pub const DATA_FETCH_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetch scheduling configuration
    pub fetch: FetchConfig,

    /// Initial dashboard inputs (zone, capabilities, time override)
    pub dashboard: DashboardConfig,

    /// Display timezone for formatted dates (IANA name, e.g. `Europe/Copenhagen`)
    pub timezone: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetch scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Interval between live polls in milliseconds
    pub data_fetch_interval_ms: u64,
}

impl FetchConfig {
    pub fn data_fetch_interval(&self) -> Duration {
        Duration::from_millis(self.data_fetch_interval_ms)
    }
}

/// Initial values of the read-only providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Zone shown on start, if any
    pub zone_id: Option<String>,

    /// Enabled feature flags
    pub features: Vec<String>,

    /// Wind overlay capability
    pub wind_enabled: bool,

    /// Solar overlay capability
    pub solar_enabled: bool,

    /// Selected time aggregate
    pub time_aggregate: TimeAggregate,

    /// Fixed point in time; disables live polling when set
    pub custom_datetime: Option<DateTime<Utc>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl DashboardConfig {
    /// One-line description of the initial view, dates shown in `tz`
    pub fn describe(&self, tz: chrono_tz::Tz) -> String {
        let zone = self.zone_id.as_deref().unwrap_or("all zones");
        let aggregate = self.time_aggregate.as_str();
        match self.custom_datetime {
            Some(datetime) => format!(
                "{}, pinned to {}",
                zone,
                format_date(Some(datetime), Some(aggregate), tz)
            ),
            None => format!("{}, live over the last {}", zone, format_time_range(aggregate)),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if given, else from the default locations, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::load_default()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn load_default() -> Result<Self> {
        let default_paths = ["gridfeed.yaml", "/etc/gridfeed/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed display timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|e| {
            GridFeedError::validation("timezone", format!("{}: {}", self.timezone, e))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.data_fetch_interval_ms == 0 {
            return Err(GridFeedError::validation(
                "fetch.data_fetch_interval_ms",
                "Must be greater than 0",
            ));
        }

        if let Some(zone) = &self.dashboard.zone_id
            && zone.trim().is_empty()
        {
            return Err(GridFeedError::validation(
                "dashboard.zone_id",
                "Zone id cannot be empty",
            ));
        }

        if self.dashboard.features.iter().any(|f| f.trim().is_empty()) {
            return Err(GridFeedError::validation(
                "dashboard.features",
                "Feature names cannot be empty",
            ));
        }

        self.tz()?;
        crate::logging::parse_log_level(&self.logging.level)?;

        Ok(())
    }
}
