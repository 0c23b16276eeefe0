use crate::pricing::RawPriceRecord;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One row of the `elspotprices` dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElspotRow {
    #[serde(rename = "HourUTC")]
    pub hour_utc: String,
    #[serde(rename = "SpotPriceEUR")]
    pub spot_price_eur: Option<f64>,
}

impl ElspotRow {
    /// Parse `HourUTC`; the dataset omits the offset, a trailing `Z` or
    /// offset is accepted as well
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.hour_utc, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .or_else(|_| {
                DateTime::parse_from_rfc3339(&self.hour_utc).map(|dt| dt.with_timezone(&Utc))
            })
            .ok()
    }
}

/// Select the rows of one UTC date (`YYYY-MM-DD`) and localize them
pub fn prepare_data(rows: &[ElspotRow], date: &str, tz: Tz) -> Vec<RawPriceRecord> {
    rows.iter()
        .filter(|row| row.hour_utc.starts_with(date))
        .filter_map(|row| {
            let value = row.spot_price_eur?;
            let start = row.start_utc()?.with_timezone(&tz);
            Some(RawPriceRecord { value, start })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::Europe::Copenhagen;

    fn row(hour: &str, price: Option<f64>) -> ElspotRow {
        ElspotRow {
            hour_utc: hour.to_string(),
            spot_price_eur: price,
        }
    }

    #[test]
    fn filters_by_date_and_localizes() {
        let rows = vec![
            row("2024-01-14T23:00:00", Some(40.0)),
            row("2024-01-15T00:00:00", Some(50.0)),
            row("2024-01-15T01:00:00", Some(55.5)),
            row("2024-01-16T00:00:00", Some(60.0)),
        ];
        let out = prepare_data(&rows, "2024-01-15", Copenhagen);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 50.0);
        // UTC+1 in winter
        assert_eq!(out[0].start.hour(), 1);
        assert_eq!(out[1].start.hour(), 2);
    }

    #[test]
    fn skips_rows_without_price_or_timestamp() {
        let rows = vec![
            row("2024-01-15T00:00:00", None),
            row("2024-01-15Tgarbage", Some(1.0)),
            row("2024-01-15T02:00:00Z", Some(2.0)),
        ];
        let out = prepare_data(&rows, "2024-01-15", Copenhagen);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 2.0);
    }

    #[test]
    fn deserializes_dataset_row() {
        let r: ElspotRow =
            serde_json::from_str(r#"{"HourUTC":"2024-01-15T00:00:00","SpotPriceEUR":87.3}"#)
                .unwrap();
        assert_eq!(r.spot_price_eur, Some(87.3));
        assert!(r.start_utc().is_some());
    }
}
