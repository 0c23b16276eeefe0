use crate::api::types::{ElspotRow, prepare_data};
use crate::api::{DEFAULT_ENDPOINT, MIN_HOURS_PER_DAY, SpotPriceSource};
use crate::error::{EdsError, Result};
use crate::logging::{StructuredLogger, get_area_logger};
use crate::pricing::RawPriceRecord;
use crate::regions::SOURCE_ENERGIDATASERVICE;
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use std::sync::RwLock;
use std::time::Duration;

/// Energi Data Service GraphQL client with a cached result set
pub struct EnergiDataServiceClient {
    area: String,
    tz: Tz,
    endpoint: String,
    http: reqwest::Client,
    result: RwLock<Vec<ElspotRow>>,
    next_refresh: RwLock<Option<DateTime<Utc>>>,
    logger: StructuredLogger,
}

impl EnergiDataServiceClient {
    /// Create a client for one price area
    pub fn new(area: &str, tz: Tz) -> Result<Self> {
        Self::with_endpoint(area, tz, DEFAULT_ENDPOINT, Duration::from_secs(10))
    }

    /// Create a client against a specific endpoint
    pub fn with_endpoint(area: &str, tz: Tz, endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            area: area.to_string(),
            tz,
            endpoint: endpoint.to_string(),
            http,
            result: RwLock::new(Vec::new()),
            next_refresh: RwLock::new(None),
            logger: get_area_logger("api", area),
        })
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    /// Cached dataset rows
    pub fn raw_data(&self) -> Vec<ElspotRow> {
        self.result.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Record the refresh the host has scheduled
    pub fn set_next_data_refresh(&self, at: Option<DateTime<Utc>>) {
        if let Ok(mut guard) = self.next_refresh.write() {
            *guard = at;
        }
    }

    /// Records for the UTC date of `now`
    pub fn today_at(&self, now: DateTime<Utc>) -> Vec<RawPriceRecord> {
        let date = now.format("%Y-%m-%d").to_string();
        prepare_data(&self.raw_data(), &date, self.tz)
    }

    /// Records for the UTC date after `now`
    pub fn tomorrow_at(&self, now: DateTime<Utc>) -> Vec<RawPriceRecord> {
        let date = (now + TimeDelta::days(1)).format("%Y-%m-%d").to_string();
        prepare_data(&self.raw_data(), &date, self.tz)
    }

    /// GraphQL request body covering today and tomorrow (UTC)
    pub fn request_body(&self, now: DateTime<Utc>) -> serde_json::Value {
        let date_from = now.format("%Y-%m-%d");
        let date_to = (now + TimeDelta::days(2)).format("%Y-%m-%d");
        let query = format!(
            "query Dataset {{elspotprices(where: {{HourUTC: {{_gte: \"{}\", _lt: \"{}\"}} \
             PriceArea: {{_eq: \"{}\"}}}} order_by: {{HourUTC: asc}} limit: 100 offset: 0)\
             {{HourUTC SpotPriceEUR }}}}",
            date_from, date_to, self.area
        );
        json!({ "query": query })
    }

    /// Fetch the latest spot prices, excluding VAT and tariffs
    pub async fn get_spotprices(&self) -> Result<()> {
        let body = self.request_body(Utc::now());
        self.logger.debug(&format!("API URL: {}", self.endpoint));
        self.logger.debug(&format!("Request body: {}", body));

        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let payload: serde_json::Value = resp.json().await?;
                let rows = payload
                    .get("data")
                    .and_then(|d| d.get("elspotprices"))
                    .cloned()
                    .ok_or_else(|| EdsError::api("response is missing data.elspotprices"))?;
                let rows: Vec<ElspotRow> = serde_json::from_value(rows)?;
                self.logger
                    .debug(&format!("Response: {} rows", rows.len()));
                self.store(rows);
                Ok(())
            }
            StatusCode::BAD_REQUEST => {
                self.logger.error("API returned error 400, Bad Request!");
                self.store(Vec::new());
                Err(EdsError::api("400 Bad Request"))
            }
            StatusCode::LENGTH_REQUIRED => {
                self.logger.error("API returned error 411, Invalid Request!");
                self.store(Vec::new());
                Err(EdsError::api("411 Invalid Request"))
            }
            other => {
                self.logger
                    .error(&format!("API returned error {}", other.as_u16()));
                Err(EdsError::api(format!("unexpected status {}", other)))
            }
        }
    }

    fn store(&self, rows: Vec<ElspotRow>) {
        if let Ok(mut guard) = self.result.write() {
            *guard = rows;
        }
    }
}

#[async_trait::async_trait]
impl SpotPriceSource for EnergiDataServiceClient {
    fn today(&self) -> Vec<RawPriceRecord> {
        self.today_at(Utc::now())
    }

    fn tomorrow(&self) -> Vec<RawPriceRecord> {
        self.tomorrow_at(Utc::now())
    }

    fn tomorrow_valid(&self) -> bool {
        self.tomorrow().len() >= MIN_HOURS_PER_DAY
    }

    async fn update(&self) -> Result<()> {
        self.get_spotprices().await
    }

    fn source(&self) -> &str {
        SOURCE_ENERGIDATASERVICE
    }

    fn next_data_refresh(&self) -> Option<DateTime<Utc>> {
        self.next_refresh.read().ok().and_then(|g| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Copenhagen;

    #[test]
    fn request_body_spans_two_days() {
        let client = EnergiDataServiceClient::new("DK1", Copenhagen).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).single().unwrap();
        let body = client.request_body(now);
        let query = body["query"].as_str().unwrap();
        assert!(query.contains("_gte: \"2024-01-15\""));
        assert!(query.contains("_lt: \"2024-01-17\""));
        assert!(query.contains("PriceArea: {_eq: \"DK1\"}"));
        assert!(query.contains("HourUTC SpotPriceEUR"));
    }

    #[test]
    fn splits_cached_rows_into_days() {
        let client = EnergiDataServiceClient::new("DK2", Copenhagen).unwrap();
        client.store(vec![
            ElspotRow {
                hour_utc: "2024-01-15T00:00:00".into(),
                spot_price_eur: Some(10.0),
            },
            ElspotRow {
                hour_utc: "2024-01-16T00:00:00".into(),
                spot_price_eur: Some(20.0),
            },
        ]);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).single().unwrap();
        assert_eq!(client.today_at(now).len(), 1);
        assert_eq!(client.tomorrow_at(now)[0].value, 20.0);
    }
}
