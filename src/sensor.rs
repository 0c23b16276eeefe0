//! Spot price sensor entity
//!
//! One sensor per price area. The sensor reads raw records from the shared
//! price source, formats them with its own pricing settings and publishes
//! the price of the current local hour as its state, with the full day
//! lists and their extremes as attributes.
//!
//! A sensor starts out unvalidated with no state. Validation runs when the
//! sensor is added to the system and again on every `eds_update` signal.
//! When no record matches the current hour the previous state is kept.

mod attributes;

pub use attributes::{DEVICE_CLASS_MONETARY, DeviceInfo, ICON, MANUFACTURER, SensorAttributes};

use crate::api::SpotPriceSource;
use crate::config::{HostConfig, SensorConfig};
use crate::dispatcher::{UPDATE_EDS, UpdateDispatcher, spawn_update_listener};
use crate::error::Result;
use crate::logging::{StructuredLogger, get_area_logger};
use crate::pricing::{
    CostTemplate, CurrencyConverter, Extremum, FormattedPriceRecord, PriceFormatter,
    PricingSettings, RawPriceRecord, find_extremum, truncate_to_hour,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Integration domain, used in identifiers
pub const DOMAIN: &str = "energidataservice";

/// Lifecycle of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorPhase {
    /// Constructed, no price published yet
    Unvalidated,
    /// A current-hour price has been published
    Validated,
}

/// Spot price sensor for one area
pub struct PriceSensor {
    area: String,
    friendly_name: String,
    entity_id: String,
    unique_id: String,
    formatter: PriceFormatter,
    source: Arc<dyn SpotPriceSource>,
    phase: SensorPhase,
    state: Option<f64>,
    today: Vec<FormattedPriceRecord>,
    tomorrow: Vec<FormattedPriceRecord>,
    logger: StructuredLogger,
}

impl PriceSensor {
    /// Build a sensor from configuration.
    ///
    /// Fails when the cost template or price type is invalid.
    pub fn new(
        config: &SensorConfig,
        host: &HostConfig,
        tz: Tz,
        source: Arc<dyn SpotPriceSource>,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Result<Self> {
        let template = config.template()?;
        let settings = config.pricing_settings(&host.currency)?;
        Ok(Self::from_parts(
            &config.area,
            settings,
            template,
            tz,
            source,
            converter,
        ))
    }

    /// Build a sensor from already-validated parts
    pub fn from_parts(
        area: &str,
        settings: PricingSettings,
        template: CostTemplate,
        tz: Tz,
        source: Arc<dyn SpotPriceSource>,
        converter: Arc<dyn CurrencyConverter>,
    ) -> Self {
        let logger = get_area_logger("sensor", area);
        let friendly_name = format!("Energi Data Service {}", area);
        let entity_id = format!("sensor.{}", slugify(&friendly_name));
        let formatter = PriceFormatter::new(settings, template, converter, tz, logger.clone());
        Self {
            area: area.to_string(),
            friendly_name,
            entity_id,
            unique_id: format!("{}_{}", DOMAIN, area),
            formatter,
            source,
            phase: SensorPhase::Unvalidated,
            state: None,
            today: Vec::new(),
            tomorrow: Vec::new(),
            logger,
        }
    }

    /// Lifecycle hook: the host has added the sensor
    pub async fn added_to_system(&mut self) -> Result<()> {
        self.logger
            .debug(&format!("Added sensor '{}'", self.entity_id));
        self.validate_data().await
    }

    /// Validate against the wall clock
    pub async fn validate_data(&mut self) -> Result<()> {
        let now = Utc::now().with_timezone(&self.formatter.timezone());
        self.validate_data_at(now).await
    }

    /// Refresh formatted lists and the current-hour price as of `now`.
    ///
    /// Only currency conversion and template evaluation errors are returned;
    /// missing data leaves the state untouched.
    pub async fn validate_data_at(&mut self, now: DateTime<Tz>) -> Result<()> {
        self.logger
            .debug(&format!("Validating sensor {}", self.friendly_name));
        if self.source.today().is_empty() {
            self.logger.debug("No sensor data found - calling update");
            if let Err(e) = self.source.update().await {
                self.logger.debug(&format!("Update failed: {}", e));
            }
        }

        self.today = self.formatter.format_list(&self.source.today())?;
        self.tomorrow = self.formatter.format_list(&self.source.tomorrow())?;

        self.update_current_price(now);
        Ok(())
    }

    fn update_current_price(&mut self, now: DateTime<Tz>) {
        if self.today.is_empty() {
            self.logger.debug("No data found, can't update state");
            return;
        }

        let current_hour = truncate_to_hour(now);
        match self.today.iter().find(|r| r.hour == current_hour) {
            Some(record) => {
                self.state = Some(record.price);
                self.phase = SensorPhase::Validated;
                self.logger
                    .debug(&format!("Current price updated to {}", record.price));
            }
            None => self
                .logger
                .debug(&format!("No price found for {}", current_hour)),
        }
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn phase(&self) -> SensorPhase {
        self.phase
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &str {
        &self.friendly_name
    }

    pub fn icon(&self) -> &'static str {
        ICON
    }

    pub fn device_class(&self) -> &'static str {
        DEVICE_CLASS_MONETARY
    }

    /// Price of the current hour, unset until validated
    pub fn state(&self) -> Option<f64> {
        self.state
    }

    pub fn currency(&self) -> &str {
        &self.formatter.settings().currency
    }

    /// Price type the sensor publishes in (MWh, kWh, Wh)
    pub fn unit(&self) -> &'static str {
        self.formatter.settings().unit.as_str()
    }

    /// `<currency>/<price type>`
    pub fn unit_of_measurement(&self) -> String {
        format!("{}/{}", self.currency(), self.unit())
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: [(DOMAIN.to_string(), self.unique_id.clone())]
                .into_iter()
                .collect(),
            name: self.friendly_name.clone(),
            manufacturer: MANUFACTURER.to_string(),
        }
    }

    pub fn pricing_settings(&self) -> &PricingSettings {
        self.formatter.settings()
    }

    /// Formatted records of today
    pub fn today_calculated(&self) -> &[FormattedPriceRecord] {
        &self.today
    }

    /// Formatted records of tomorrow
    pub fn tomorrow_calculated(&self) -> &[FormattedPriceRecord] {
        &self.tomorrow
    }

    /// Today's prices; index 0 is the 00:00-01:00 hour
    pub fn today(&self) -> Vec<f64> {
        self.today.iter().map(|r| r.price).collect()
    }

    /// Tomorrow's prices, only once they are published
    pub fn tomorrow(&self) -> Option<Vec<f64>> {
        if self.tomorrow_valid() {
            Some(self.tomorrow.iter().map(|r| r.price).collect())
        } else {
            None
        }
    }

    pub fn raw_today(&self) -> Vec<RawPriceRecord> {
        self.source.today()
    }

    pub fn raw_tomorrow(&self) -> Vec<RawPriceRecord> {
        self.source.tomorrow()
    }

    pub fn tomorrow_valid(&self) -> bool {
        self.source.tomorrow_valid()
    }

    pub fn today_lowpoint(&self) -> Option<&FormattedPriceRecord> {
        find_extremum(Extremum::Min, Some(self.today.as_slice()))
    }

    pub fn today_highpoint(&self) -> Option<&FormattedPriceRecord> {
        find_extremum(Extremum::Max, Some(self.today.as_slice()))
    }

    pub fn tomorrow_lowpoint(&self) -> Option<&FormattedPriceRecord> {
        find_extremum(Extremum::Min, Some(self.tomorrow.as_slice()))
    }

    pub fn tomorrow_highpoint(&self) -> Option<&FormattedPriceRecord> {
        find_extremum(Extremum::Max, Some(self.tomorrow.as_slice()))
    }

    pub fn extra_state_attributes(&self) -> SensorAttributes {
        SensorAttributes {
            current_price: self.state(),
            unit: self.unit().to_string(),
            currency: self.currency().to_string(),
            area: self.area.clone(),
            tomorrow_valid: self.tomorrow_valid(),
            today: self.today(),
            tomorrow: self.tomorrow(),
            raw_today: self.raw_today(),
            raw_tomorrow: self.raw_tomorrow(),
            today_lowpoint: self.today_lowpoint().cloned(),
            today_highpoint: self.today_highpoint().cloned(),
            tomorrow_lowpoint: self.tomorrow_lowpoint().cloned(),
            tomorrow_highpoint: self.tomorrow_highpoint().cloned(),
        }
    }
}

/// Add a shared sensor to the system: validate once, then follow
/// `eds_update` signals from the dispatcher.
pub async fn register(
    sensor: Arc<tokio::sync::Mutex<PriceSensor>>,
    dispatcher: &UpdateDispatcher,
) -> Result<JoinHandle<()>> {
    // Subscribe first so a refresh racing the initial validation is not lost
    let rx = dispatcher.connect(UPDATE_EDS);
    sensor.lock().await.added_to_system().await?;
    Ok(spawn_update_listener(sensor, rx))
}

/// Lowercase ASCII slug with `_` separators; Nordic letters are transliterated
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c.to_string()),
            'å' | 'ä' | 'á' | 'à' => Some("a".to_string()),
            'æ' => Some("ae".to_string()),
            'ø' | 'ö' | 'ó' => Some("o".to_string()),
            'é' | 'è' => Some("e".to_string()),
            'ü' => Some("u".to_string()),
            _ => None,
        };
        match mapped {
            Some(s) => out.push_str(&s),
            None if !out.is_empty() && !out.ends_with('_') => out.push('_'),
            None => {}
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
