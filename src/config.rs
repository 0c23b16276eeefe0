//! Configuration management
//!
//! This module handles loading, validation, and management of the sensor
//! configuration from YAML files.

mod defaults;

use crate::error::{EdsError, Result};
use crate::pricing::{
    CostTemplate, PricingSettings, StaticRateTable, TemplateSpec,
};
use crate::regions::{self, PriceUnit};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Highest supported number of decimals on a published price
pub const MAX_DECIMALS: u32 = 10;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Host environment (timezone, display currency)
    pub host: HostConfig,

    /// Spot price API configuration
    pub api: ApiConfig,

    /// One sensor per price area
    pub sensors: Vec<SensorConfig>,

    /// EUR-based conversion rates (units of currency per 1 EUR)
    pub currency_rates: HashMap<String, f64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console level override
    pub console_level: Option<String>,

    /// File level override
    pub file_level: Option<String>,

    /// Path to log file; empty disables file logging
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Host environment the sensors run in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// IANA timezone name used for local hours
    pub time_zone: String,

    /// Currency prices are published in (ISO code)
    pub currency: String,
}

/// Spot price API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Per-area sensor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Price area code (e.g. DK1, SE3)
    pub area: String,

    /// Unit prices are expressed per (MWh, kWh, Wh)
    #[serde(default = "default_price_type", rename = "pricetype")]
    pub price_type: String,

    /// Decimals on the published price
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Add VAT
    #[serde(default)]
    pub vat: bool,

    /// Use the region's statutory VAT rate instead of the Danish 25%
    #[serde(default)]
    pub regional_vat: bool,

    /// Surcharge added before VAT
    #[serde(default)]
    pub cost_template: TemplateSpec,
}

fn default_price_type() -> String {
    "kWh".to_string()
}

fn default_decimals() -> u32 {
    3
}

impl SensorConfig {
    /// Create a sensor configuration with defaults for everything but the area
    pub fn for_area(area: &str) -> Self {
        Self {
            area: resolve_area(area).to_string(),
            price_type: default_price_type(),
            decimals: default_decimals(),
            vat: false,
            regional_vat: false,
            cost_template: TemplateSpec::default(),
        }
    }

    /// Parsed price unit
    pub fn unit(&self) -> Result<PriceUnit> {
        PriceUnit::parse(&self.price_type).ok_or_else(|| {
            EdsError::validation(
                "pricetype",
                format!("unknown price type '{}'", self.price_type),
            )
        })
    }

    /// Pricing settings for this sensor in the given currency
    pub fn pricing_settings(&self, currency: &str) -> Result<PricingSettings> {
        let regional_vat = if self.regional_vat {
            let region = regions::region(&self.area).ok_or_else(|| {
                EdsError::validation("area", format!("unknown region '{}'", self.area))
            })?;
            Some(region.vat_rate)
        } else {
            None
        };
        Ok(PricingSettings {
            currency: currency.to_string(),
            unit: self.unit()?,
            vat: self.vat,
            decimals: self.decimals,
            regional_vat,
        })
    }

    /// Compile the cost template; errors here are fatal to sensor setup
    pub fn template(&self) -> Result<CostTemplate> {
        CostTemplate::compile(&self.cost_template)
    }
}

/// Accept the legacy readable labels ("West of the great belt") for an area
pub fn resolve_area(area: &str) -> &str {
    regions::area_code_for_label(area).unwrap_or(area)
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        for sensor in &mut config.sensors {
            sensor.area = resolve_area(&sensor.area).to_string();
        }
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "energidataservice.yaml",
            "/data/energidataservice.yaml",
            "/etc/energidataservice/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed host timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.host.time_zone.parse::<Tz>().map_err(|_| {
            EdsError::validation(
                "host.time_zone",
                format!("unknown timezone '{}'", self.host.time_zone),
            )
        })
    }

    /// Currency converter built from the configured rates
    pub fn rate_table(&self) -> Result<StaticRateTable> {
        StaticRateTable::new(self.currency_rates.clone())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        if self.host.currency.trim().is_empty() {
            return Err(EdsError::validation("host.currency", "Cannot be empty"));
        }

        if self.api.endpoint.trim().is_empty() {
            return Err(EdsError::validation("api.endpoint", "Cannot be empty"));
        }

        if self.api.timeout_secs == 0 {
            return Err(EdsError::validation(
                "api.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.sensors.is_empty() {
            return Err(EdsError::validation(
                "sensors",
                "At least one sensor must be configured",
            ));
        }

        for (i, sensor) in self.sensors.iter().enumerate() {
            if regions::region(&sensor.area).is_none() {
                return Err(EdsError::validation(
                    format!("sensors[{}].area", i),
                    format!("unknown region '{}'", sensor.area),
                ));
            }
            if PriceUnit::parse(&sensor.price_type).is_none() {
                return Err(EdsError::validation(
                    format!("sensors[{}].pricetype", i),
                    format!("unknown price type '{}'", sensor.price_type),
                ));
            }
            if sensor.decimals > MAX_DECIMALS {
                return Err(EdsError::validation(
                    format!("sensors[{}].decimals", i),
                    format!("Must be at most {}", MAX_DECIMALS),
                ));
            }
        }

        if !self.rate_table()?.supports(&self.host.currency) {
            return Err(EdsError::validation(
                "host.currency",
                format!("no conversion rate for '{}'", self.host.currency),
            ));
        }
        Ok(())
    }
}
