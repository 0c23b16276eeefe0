use crate::error::Result;
use crate::logging::StructuredLogger;
use crate::pricing::currency::CurrencyConverter;
use crate::pricing::template::CostTemplate;
use crate::pricing::types::{FormattedPriceRecord, RawPriceRecord, truncate_to_hour};
use crate::pricing::DANISH_VAT_RATE;
use crate::regions::{PriceUnit, SOURCE_CURRENCY};
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;

/// Per-sensor calculation settings
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSettings {
    /// Target currency (ISO code)
    pub currency: String,
    /// Unit prices are expressed per
    pub unit: PriceUnit,
    /// Whether VAT is added
    pub vat: bool,
    /// Decimal places of the published price
    pub decimals: u32,
    /// Use the region's statutory VAT rate instead of the Danish rate
    pub regional_vat: Option<f64>,
}

impl PricingSettings {
    /// Effective VAT rate
    pub fn vat_rate(&self) -> f64 {
        match (self.vat, self.regional_vat) {
            (false, _) => 0.0,
            (true, Some(rate)) => rate,
            (true, None) => DANISH_VAT_RATE,
        }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Turns raw EUR/MWh records into localized, calculated prices
#[derive(Clone)]
pub struct PriceFormatter {
    settings: PricingSettings,
    template: CostTemplate,
    converter: Arc<dyn CurrencyConverter>,
    tz: Tz,
    logger: StructuredLogger,
}

impl PriceFormatter {
    pub fn new(
        settings: PricingSettings,
        template: CostTemplate,
        converter: Arc<dyn CurrencyConverter>,
        tz: Tz,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            settings,
            template,
            converter,
            tz,
            logger,
        }
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Calculate the price of one raw value with the template pinned to `at`
    pub fn calculate(&self, value: f64, at: DateTime<Tz>) -> Result<f64> {
        let value = if self.settings.currency == SOURCE_CURRENCY {
            value
        } else {
            self.converter.convert(
                value,
                SOURCE_CURRENCY,
                &self.settings.currency,
                at.date_naive(),
            )?
        };

        let template_value = self.template.evaluate(at)?;
        let vat_factor = 1.0 + self.settings.vat_rate();

        // Upstream prices are per MWh
        let price = match self.settings.unit {
            PriceUnit::MWh => template_value / 1000.0 + value * vat_factor,
            unit => template_value + value / f64::from(unit.multiplier()) * vat_factor,
        };

        Ok(round_to(price, self.settings.decimals))
    }

    /// Format a list of raw records, keeping length and order
    pub fn format_list(&self, data: &[RawPriceRecord]) -> Result<Vec<FormattedPriceRecord>> {
        let formatted = data
            .iter()
            .map(|record| {
                let hour = truncate_to_hour(record.start.with_timezone(&self.tz));
                Ok(FormattedPriceRecord {
                    price: self.calculate(record.value, hour)?,
                    hour,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.logger
            .trace(&format!("Formatted {} price records", formatted.len()));
        Ok(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::get_logger;
    use crate::pricing::currency::StaticRateTable;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::Europe::Copenhagen;

    fn formatter(currency: &str, unit: PriceUnit, vat: bool, template: CostTemplate) -> PriceFormatter {
        PriceFormatter::new(
            PricingSettings {
                currency: currency.to_string(),
                unit,
                vat,
                decimals: 3,
                regional_vat: None,
            },
            template,
            Arc::new(StaticRateTable::default()),
            Copenhagen,
            get_logger("formatter"),
        )
    }

    fn hour(h: u32) -> DateTime<Tz> {
        Copenhagen
            .with_ymd_and_hms(2024, 1, 15, h, 0, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn mwh_without_vat_is_passthrough() {
        let f = formatter("EUR", PriceUnit::MWh, false, CostTemplate::default());
        assert!((f.calculate(100.0, hour(0)).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn kwh_with_vat() {
        let f = formatter("EUR", PriceUnit::KWh, true, CostTemplate::default());
        assert!((f.calculate(100.0, hour(0)).unwrap() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn mwh_template_is_scaled_down() {
        let f = formatter("EUR", PriceUnit::MWh, false, CostTemplate::Fixed(500.0));
        assert!((f.calculate(100.0, hour(0)).unwrap() - 100.5).abs() < 1e-9);
    }

    #[test]
    fn template_sees_record_hour() {
        let t = CostTemplate::from_fn(|now| Ok(if now.hour() >= 17 { 1.0 } else { 0.0 }));
        let f = formatter("EUR", PriceUnit::KWh, false, t);
        let records = vec![
            RawPriceRecord::new(100.0, hour(16)),
            RawPriceRecord::new(100.0, hour(17)),
        ];
        let out = f.format_list(&records).unwrap();
        assert!((out[0].price - 0.1).abs() < 1e-9);
        assert!((out[1].price - 1.1).abs() < 1e-9);
    }

    #[test]
    fn converts_to_target_currency() {
        let f = formatter("DKK", PriceUnit::KWh, false, CostTemplate::default());
        let p = f.calculate(100.0, hour(0)).unwrap();
        assert!((p - 0.746).abs() < 1e-9);
    }

    #[test]
    fn regional_vat_overrides_danish_rate() {
        let mut settings = formatter("EUR", PriceUnit::MWh, true, CostTemplate::default())
            .settings()
            .clone();
        assert!((settings.vat_rate() - 0.25).abs() < f64::EPSILON);
        settings.regional_vat = Some(0.055);
        assert!((settings.vat_rate() - 0.055).abs() < f64::EPSILON);
        settings.vat = false;
        assert_eq!(settings.vat_rate(), 0.0);
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }
}
