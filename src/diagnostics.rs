//! Diagnostics dump for support requests
//!
//! Collects the sensor's configuration entry (with identifying keys
//! redacted), the cached raw and calculated price lists, and the host's
//! timezone and currency into one serializable document.

use crate::api::SpotPriceSource;
use crate::config::{HostConfig, SensorConfig};
use crate::error::Result;
use crate::logging::get_logger;
use crate::pricing::{FormattedPriceRecord, RawPriceRecord};
use crate::sensor::{DOMAIN, PriceSensor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Replacement for redacted values
pub const REDACTED: &str = "**REDACTED**";

/// Keys removed from the dumped config entry
pub const TO_REDACT: &[&str] = &["unique_id"];

/// A stored configuration entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub domain: String,
    pub title: String,
    pub unique_id: String,
    pub data: SensorConfig,
}

impl ConfigEntry {
    pub fn for_sensor(config: &SensorConfig) -> Self {
        Self {
            entry_id: format!("{}_{}", DOMAIN, config.area.to_lowercase()),
            domain: DOMAIN.to_string(),
            title: format!("Energi Data Service {}", config.area),
            unique_id: format!("{}_{}", DOMAIN, config.area),
            data: config.clone(),
        }
    }
}

/// Diagnostics document
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub entry: Value,
    pub today: Vec<RawPriceRecord>,
    pub today_calculated: Vec<FormattedPriceRecord>,
    pub tomorrow: Vec<RawPriceRecord>,
    pub tomorrow_calculated: Vec<FormattedPriceRecord>,
    pub forecasts: Option<Value>,
    pub next_update: Option<DateTime<Utc>>,
    pub data_source: String,
    pub home_assistant_tz: String,
    pub home_assistant_currency: String,
}

/// Replace the value of every key in `keys`, at any depth
pub fn redact(value: &Value, keys: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if keys.contains(&k.as_str()) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(v, keys)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact(v, keys)).collect()),
        other => other.clone(),
    }
}

/// Build the diagnostics document for one configured sensor
pub fn config_entry_diagnostics(
    entry: &ConfigEntry,
    source: &dyn SpotPriceSource,
    sensor: &PriceSensor,
    host: &HostConfig,
) -> Result<Diagnostics> {
    get_logger("diagnostics").debug(&format!("Collecting diagnostics for {}", entry.title));
    let entry = redact(&serde_json::to_value(entry)?, TO_REDACT);
    Ok(Diagnostics {
        entry,
        today: source.today(),
        today_calculated: sensor.today_calculated().to_vec(),
        tomorrow: source.tomorrow(),
        tomorrow_calculated: sensor.tomorrow_calculated().to_vec(),
        forecasts: source.predictions(),
        next_update: source.next_data_refresh(),
        data_source: source.source().to_string(),
        home_assistant_tz: host.time_zone.clone(),
        home_assistant_currency: host.currency.clone(),
    })
}
