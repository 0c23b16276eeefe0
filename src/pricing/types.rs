use chrono::{DateTime, TimeDelta, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

/// Hourly spot price as published upstream (EUR/MWh)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPriceRecord {
    pub value: f64,
    pub start: DateTime<Tz>,
}

impl RawPriceRecord {
    pub fn new(value: f64, start: DateTime<Tz>) -> Self {
        Self { value, start }
    }
}

/// Calculated price for one local hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedPriceRecord {
    pub price: f64,
    pub hour: DateTime<Tz>,
}

/// Drop minutes, seconds and sub-seconds, keeping the local hour.
///
/// Works on the instant so an ambiguous local hour (DST fall-back) keeps
/// its offset.
pub fn truncate_to_hour(dt: DateTime<Tz>) -> DateTime<Tz> {
    dt - TimeDelta::minutes(i64::from(dt.minute()))
        - TimeDelta::seconds(i64::from(dt.second()))
        - TimeDelta::nanoseconds(i64::from(dt.nanosecond()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Copenhagen;

    #[test]
    fn truncate_keeps_local_hour() {
        let dt = Copenhagen
            .with_ymd_and_hms(2024, 3, 5, 14, 37, 12)
            .single()
            .unwrap();
        let t = truncate_to_hour(dt);
        assert_eq!(t.hour(), 14);
        assert_eq!(t.minute(), 0);
        assert_eq!(t.second(), 0);
        assert_eq!(t.nanosecond(), 0);
    }

    #[test]
    fn truncate_keeps_offset_in_repeated_hour() {
        let summer = Copenhagen
            .with_ymd_and_hms(2024, 10, 27, 2, 30, 0)
            .earliest()
            .unwrap();
        let winter = Copenhagen
            .with_ymd_and_hms(2024, 10, 27, 2, 30, 0)
            .latest()
            .unwrap();
        assert_ne!(summer, winter);

        for dt in [summer, winter] {
            let t = truncate_to_hour(dt);
            assert_eq!(t.hour(), 2);
            assert_eq!(t.minute(), 0);
            assert_eq!(t.offset(), dt.offset());
            assert_eq!((dt - t).num_minutes(), 30);
        }
    }
}
