//! Spot price source integration
//!
//! The sensor never talks to the network itself. It reads cached records
//! from a [`SpotPriceSource`] shared between all sensors of a process and
//! asks it to refresh when it has nothing for today. The Energi Data Service
//! GraphQL client lives behind the `http` feature; [`StaticSpotPriceSource`]
//! serves hosts that obtain prices elsewhere.

#[cfg(feature = "http")]
pub mod client;
pub mod memory;
pub mod types;

#[cfg(feature = "http")]
pub use client::EnergiDataServiceClient;
pub use memory::StaticSpotPriceSource;
pub use types::{ElspotRow, prepare_data};

use crate::error::Result;
use crate::pricing::RawPriceRecord;
use chrono::{DateTime, Utc};

/// Energi Data Service GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://data-api.energidataservice.dk/v1/graphql";

/// Hours a day needs before tomorrow's prices count as published (DST-short day)
pub const MIN_HOURS_PER_DAY: usize = 23;

/// Shared, read-mostly source of raw hourly prices
#[async_trait::async_trait]
pub trait SpotPriceSource: Send + Sync {
    /// Raw records for the current day
    fn today(&self) -> Vec<RawPriceRecord>;

    /// Raw records for the next day, empty until published
    fn tomorrow(&self) -> Vec<RawPriceRecord>;

    /// Whether the next day's prices have been published
    fn tomorrow_valid(&self) -> bool;

    /// Best-effort refresh; may leave `today` empty on failure
    async fn update(&self) -> Result<()>;

    /// Identifier of the upstream data source
    fn source(&self) -> &str;

    /// Price forecasts, when the source provides any
    fn predictions(&self) -> Option<serde_json::Value> {
        None
    }

    /// Next refresh the host has scheduled, if known
    fn next_data_refresh(&self) -> Option<DateTime<Utc>> {
        None
    }
}
