//! Price calculation for hourly spot prices
//!
//! Raw upstream records are quoted in EUR/MWh. The formatter converts them
//! to the configured currency and unit, adds the cost template surcharge and
//! VAT, and rounds. The extremum finder picks the cheapest or most expensive
//! hour out of a formatted list.

pub mod currency;
pub mod extremum;
pub mod formatter;
pub mod template;
pub mod types;

pub use currency::{CurrencyConverter, StaticRateTable};
pub use extremum::{Extremum, find_extremum};
pub use formatter::{PriceFormatter, PricingSettings, round_to};
pub use template::{CostTemplate, HourlySchedule, TemplatePeriod, TemplateSpec};
pub use types::{FormattedPriceRecord, RawPriceRecord, truncate_to_hour};

/// VAT rate applied when the VAT flag is set.
///
/// Only the Danish rate is applied, whatever the region; the per-region rate
/// in the catalog is used only when `PricingSettings::regional_vat` is set.
pub const DANISH_VAT_RATE: f64 = 0.25;
