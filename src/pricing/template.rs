//! Cost templates
//!
//! A cost template adds a surcharge (tariffs, fees) to every hourly price
//! before VAT. It is evaluated once per hour with "now" pinned to that hour,
//! so a template can vary with the time of day. Templates are built from
//! configuration (a constant, a Jinja-style constant string, or an hourly
//! schedule) or supplied by the caller as a closure.

use crate::error::{EdsError, Result};
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "{{0.0|float}}";

/// Caller-supplied template function
pub type TemplateFn = dyn Fn(DateTime<Tz>) -> Result<f64> + Send + Sync;

/// One surcharge window, `from_hour` inclusive, `to_hour` exclusive.
/// Windows with `from_hour > to_hour` wrap past midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePeriod {
    pub from_hour: u32,
    pub to_hour: u32,
    pub value: f64,
}

impl TemplatePeriod {
    fn contains(&self, hour: u32) -> bool {
        if self.from_hour < self.to_hour {
            (self.from_hour..self.to_hour).contains(&hour)
        } else {
            hour >= self.from_hour || hour < self.to_hour
        }
    }
}

/// Time-of-day surcharge table; the first matching period wins
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySchedule {
    #[serde(default)]
    pub default: f64,
    #[serde(default)]
    pub periods: Vec<TemplatePeriod>,
}

impl HourlySchedule {
    pub fn value_at(&self, hour: u32) -> f64 {
        self.periods
            .iter()
            .find(|p| p.contains(hour))
            .map_or(self.default, |p| p.value)
    }

    fn validate(&self) -> Result<()> {
        if !self.default.is_finite() {
            return Err(EdsError::template("schedule default must be finite"));
        }
        for (i, p) in self.periods.iter().enumerate() {
            if p.from_hour > 23 || p.to_hour > 24 {
                return Err(EdsError::template(format!(
                    "period {} hours out of range: {}..{}",
                    i, p.from_hour, p.to_hour
                )));
            }
            if p.from_hour == p.to_hour {
                return Err(EdsError::template(format!(
                    "period {} is empty: {}..{}",
                    i, p.from_hour, p.to_hour
                )));
            }
            if !p.value.is_finite() {
                return Err(EdsError::template(format!("period {} value must be finite", i)));
            }
        }
        Ok(())
    }
}

/// Template as written in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    Number(f64),
    Text(String),
    Schedule(HourlySchedule),
}

impl Default for TemplateSpec {
    fn default() -> Self {
        TemplateSpec::Text(DEFAULT_TEMPLATE.to_string())
    }
}

/// Compiled cost template
#[derive(Clone)]
pub enum CostTemplate {
    Fixed(f64),
    Schedule(HourlySchedule),
    Custom(Arc<TemplateFn>),
}

impl CostTemplate {
    /// Wrap a closure as a template
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(DateTime<Tz>) -> Result<f64> + Send + Sync + 'static,
    {
        CostTemplate::Custom(Arc::new(f))
    }

    /// Compile a configured template. Invalid templates are rejected here,
    /// which makes them fatal to sensor setup.
    pub fn compile(spec: &TemplateSpec) -> Result<Self> {
        match spec {
            TemplateSpec::Number(v) => {
                if v.is_finite() {
                    Ok(CostTemplate::Fixed(*v))
                } else {
                    Err(EdsError::template("constant must be finite"))
                }
            }
            TemplateSpec::Text(text) => Self::parse(text),
            TemplateSpec::Schedule(schedule) => {
                schedule.validate()?;
                Ok(CostTemplate::Schedule(schedule.clone()))
            }
        }
    }

    /// Parse a constant template such as `1.25`, `{{ 1.25 }}` or
    /// `{{0.0|float}}`. An empty string yields the default template.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::parse(DEFAULT_TEMPLATE);
        }

        let body = match (trimmed.strip_prefix("{{"), trimmed.ends_with("}}")) {
            (Some(rest), true) => &rest[..rest.len() - 2],
            (None, false) => trimmed,
            _ => {
                return Err(EdsError::template(format!(
                    "unbalanced braces in '{}'",
                    trimmed
                )));
            }
        };

        let mut parts = body.split('|').map(str::trim);
        let literal = parts.next().unwrap_or_default();
        let mut value: f64 = literal.parse().map_err(|_| {
            EdsError::template(format!("'{}' is not a number", literal))
        })?;
        for filter in parts {
            value = match filter {
                "float" => value,
                "int" => value.trunc(),
                "abs" => value.abs(),
                other => {
                    return Err(EdsError::template(format!("unknown filter '{}'", other)));
                }
            };
        }
        if !value.is_finite() {
            return Err(EdsError::template("constant must be finite"));
        }
        Ok(CostTemplate::Fixed(value))
    }

    /// Evaluate the template with "now" pinned to `now`
    pub fn evaluate(&self, now: DateTime<Tz>) -> Result<f64> {
        match self {
            CostTemplate::Fixed(v) => Ok(*v),
            CostTemplate::Schedule(s) => Ok(s.value_at(now.hour())),
            CostTemplate::Custom(f) => f(now),
        }
    }
}

impl Default for CostTemplate {
    fn default() -> Self {
        CostTemplate::Fixed(0.0)
    }
}

impl fmt::Debug for CostTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostTemplate::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            CostTemplate::Schedule(s) => f.debug_tuple("Schedule").field(s).finish(),
            CostTemplate::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Copenhagen;

    fn at_hour(h: u32) -> DateTime<Tz> {
        Copenhagen
            .with_ymd_and_hms(2024, 1, 15, h, 0, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn default_template_is_zero() {
        let t = CostTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(t.evaluate(at_hour(12)).unwrap(), 0.0);
        let t = CostTemplate::parse("   ").unwrap();
        assert_eq!(t.evaluate(at_hour(12)).unwrap(), 0.0);
    }

    #[test]
    fn parses_constants_and_filters() {
        let t = CostTemplate::parse("{{ 1.5 | float }}").unwrap();
        assert_eq!(t.evaluate(at_hour(0)).unwrap(), 1.5);
        let t = CostTemplate::parse("2.75").unwrap();
        assert_eq!(t.evaluate(at_hour(0)).unwrap(), 2.75);
        let t = CostTemplate::parse("{{-3.9|int|abs}}").unwrap();
        assert_eq!(t.evaluate(at_hour(0)).unwrap(), 3.0);
    }

    #[test]
    fn rejects_invalid_templates() {
        assert!(matches!(
            CostTemplate::parse("{{ now().hour"),
            Err(EdsError::Template { .. })
        ));
        assert!(CostTemplate::parse("{{ abc }}").is_err());
        assert!(CostTemplate::parse("{{ 1.0 | round }}").is_err());
        assert!(CostTemplate::compile(&TemplateSpec::Number(f64::NAN)).is_err());
    }

    #[test]
    fn schedule_follows_pinned_hour() {
        let spec = TemplateSpec::Schedule(HourlySchedule {
            default: 0.1,
            periods: vec![
                TemplatePeriod {
                    from_hour: 17,
                    to_hour: 21,
                    value: 0.9,
                },
                TemplatePeriod {
                    from_hour: 22,
                    to_hour: 6,
                    value: 0.05,
                },
            ],
        });
        let t = CostTemplate::compile(&spec).unwrap();
        assert_eq!(t.evaluate(at_hour(18)).unwrap(), 0.9);
        assert_eq!(t.evaluate(at_hour(21)).unwrap(), 0.1);
        assert_eq!(t.evaluate(at_hour(23)).unwrap(), 0.05);
        assert_eq!(t.evaluate(at_hour(3)).unwrap(), 0.05);
        assert_eq!(t.evaluate(at_hour(12)).unwrap(), 0.1);
    }

    #[test]
    fn schedule_validation() {
        let bad = HourlySchedule {
            default: 0.0,
            periods: vec![TemplatePeriod {
                from_hour: 5,
                to_hour: 5,
                value: 1.0,
            }],
        };
        assert!(CostTemplate::compile(&TemplateSpec::Schedule(bad)).is_err());
    }

    #[test]
    fn custom_closure_sees_pinned_time() {
        let t = CostTemplate::from_fn(|now| Ok(f64::from(now.hour())));
        assert_eq!(t.evaluate(at_hour(7)).unwrap(), 7.0);
    }

    #[test]
    fn spec_deserializes_from_yaml_forms() {
        let n: TemplateSpec = serde_yaml::from_str("1.5").unwrap();
        assert_eq!(n, TemplateSpec::Number(1.5));
        let s: TemplateSpec = serde_yaml::from_str("'{{0.0|float}}'").unwrap();
        assert_eq!(s, TemplateSpec::Text(DEFAULT_TEMPLATE.to_string()));
        let sched: TemplateSpec =
            serde_yaml::from_str("default: 0.2\nperiods:\n  - {from_hour: 17, to_hour: 20, value: 1.0}\n")
                .unwrap();
        assert!(matches!(sched, TemplateSpec::Schedule(_)));
    }
}
