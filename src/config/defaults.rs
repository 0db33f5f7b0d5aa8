use super::*;

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            data_fetch_interval_ms: DATA_FETCH_INTERVAL_MS,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            zone_id: None,
            features: Vec::new(),
            wind_enabled: false,
            solar_enabled: false,
            time_aggregate: TimeAggregate::Hourly,
            custom_datetime: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/gridfeed.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            dashboard: DashboardConfig::default(),
            timezone: "UTC".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}
