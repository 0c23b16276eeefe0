use crate::pricing::{FormattedPriceRecord, RawPriceRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Device classification of the sensor
pub const DEVICE_CLASS_MONETARY: &str = "monetary";

/// Icon shown by the host
pub const ICON: &str = "mdi:flash";

/// Manufacturer shown in the device registry
pub const MANUFACTURER: &str = "Energi Data Service";

/// Device registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: BTreeSet<(String, String)>,
    pub name: String,
    pub manufacturer: String,
}

/// Attribute bag published alongside the state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub current_price: Option<f64>,
    pub unit: String,
    pub currency: String,
    pub area: String,
    pub tomorrow_valid: bool,
    pub today: Vec<f64>,
    pub tomorrow: Option<Vec<f64>>,
    pub raw_today: Vec<RawPriceRecord>,
    pub raw_tomorrow: Vec<RawPriceRecord>,
    pub today_lowpoint: Option<FormattedPriceRecord>,
    pub today_highpoint: Option<FormattedPriceRecord>,
    pub tomorrow_lowpoint: Option<FormattedPriceRecord>,
    pub tomorrow_highpoint: Option<FormattedPriceRecord>,
}
