use super::*;

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/energidataservice.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            time_zone: "Europe/Copenhagen".to_string(),
            currency: "DKK".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::api::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            host: HostConfig::default(),
            api: ApiConfig::default(),
            sensors: vec![SensorConfig::for_area("DK1")],
            currency_rates: StaticRateTable::default_rates(),
        }
    }
}
