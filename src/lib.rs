//! # Energi Data Service - day-ahead spot price sensor
//!
//! Fetches hourly day-ahead electricity spot prices, converts them to the
//! configured currency and unit, applies VAT and a user cost template, and
//! publishes the result as a sensor entity with the price of the current
//! hour as state and today's and tomorrow's prices as attributes.
//!
//! ## Architecture
//!
//! - `regions`: price areas, currencies and VAT rates
//! - `pricing`: price formula, cost templates, currency conversion, min/max
//! - `api`: the shared spot price source and the Energi Data Service client
//! - `dispatcher`: `eds_update` notifications from source to sensors
//! - `sensor`: the sensor entity
//! - `diagnostics`: redacted dump for support requests
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod regions;
pub mod sensor;


// Re-export commonly used types
pub use api::SpotPriceSource;
pub use config::Config;
pub use error::{EdsError, Result};
pub use sensor::PriceSensor;
