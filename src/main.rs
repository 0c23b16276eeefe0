use anyhow::{Context, Result};
use clap::Parser;
use energidataservice::api::SpotPriceSource;
use energidataservice::config::{Config, SensorConfig};
use energidataservice::diagnostics::{ConfigEntry, config_entry_diagnostics};
use energidataservice::dispatcher::{UPDATE_EDS, UpdateDispatcher};
use energidataservice::logging::{StructuredLogger, get_logger, init_logging};
use energidataservice::sensor::{PriceSensor, register};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(version = env!("APP_VERSION"), about = "Day-ahead electricity spot price sensor")]
struct Args {
    /// Path to config file; the default locations are searched otherwise
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print the diagnostics dump of every sensor
    #[arg(long)]
    diagnostics: bool,

    /// Keep running and refresh prices every N minutes
    #[arg(long, value_name = "MINUTES")]
    watch: Option<u64>,
}

struct Entry {
    config: SensorConfig,
    source: Arc<dyn SpotPriceSource>,
    sensor: Arc<Mutex<PriceSensor>>,
}

#[cfg(feature = "http")]
fn build_source(config: &Config, area: &str) -> Result<Arc<dyn SpotPriceSource>> {
    use energidataservice::api::EnergiDataServiceClient;

    let client = EnergiDataServiceClient::with_endpoint(
        area,
        config.timezone()?,
        &config.api.endpoint,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "http"))]
fn build_source(_config: &Config, area: &str) -> Result<Arc<dyn SpotPriceSource>> {
    use energidataservice::api::StaticSpotPriceSource;
    use energidataservice::regions::SOURCE_ENERGIDATASERVICE;

    get_logger("main").warn(&format!(
        "Built without the http feature; {} has no price source",
        area
    ));
    Ok(Arc::new(StaticSpotPriceSource::new(SOURCE_ENERGIDATASERVICE)))
}

async fn report(entries: &[Entry]) -> Result<()> {
    for entry in entries {
        let sensor = entry.sensor.lock().await;
        let doc = json!({
            "entity_id": sensor.entity_id(),
            "name": sensor.name(),
            "state": sensor.state(),
            "unit_of_measurement": sensor.unit_of_measurement(),
            "attributes": sensor.extra_state_attributes(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }
    Ok(())
}

async fn refresh(entries: &[Entry], dispatcher: &UpdateDispatcher, logger: &StructuredLogger) {
    for entry in entries {
        if let Err(e) = entry.source.update().await {
            logger.warn(&format!("Refresh of {} failed: {}", entry.config.area, e));
        }
    }
    let notified = dispatcher.send(UPDATE_EDS);
    logger.debug(&format!("Signalled {} sensors", notified));
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    config.validate().context("Invalid configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    let logger = get_logger("main");
    logger.info(&format!(
        "Energi Data Service {} starting with {} sensor(s)",
        env!("APP_VERSION"),
        config.sensors.len()
    ));

    let tz = config.timezone()?;
    let converter = Arc::new(config.rate_table()?);
    let dispatcher = UpdateDispatcher::new();

    let mut entries = Vec::with_capacity(config.sensors.len());
    let mut listeners = Vec::with_capacity(config.sensors.len());
    for sensor_config in &config.sensors {
        let source = build_source(&config, &sensor_config.area)?;
        let sensor = PriceSensor::new(
            sensor_config,
            &config.host,
            tz,
            Arc::clone(&source),
            converter.clone(),
        )
        .with_context(|| format!("Failed to set up sensor for {}", sensor_config.area))?;
        let sensor = Arc::new(Mutex::new(sensor));
        listeners.push(register(Arc::clone(&sensor), &dispatcher).await?);
        entries.push(Entry {
            config: sensor_config.clone(),
            source,
            sensor,
        });
    }

    report(&entries).await?;

    if args.diagnostics {
        for entry in &entries {
            let sensor = entry.sensor.lock().await;
            let diag = config_entry_diagnostics(
                &ConfigEntry::for_sensor(&entry.config),
                entry.source.as_ref(),
                &sensor,
                &config.host,
            )?;
            println!("{}", serde_json::to_string_pretty(&diag)?);
        }
    }

    if let Some(minutes) = args.watch {
        let mut ticker = tokio::time::interval(Duration::from_secs(minutes.max(1) * 60));
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    refresh(&entries, &dispatcher, &logger).await;
                    report(&entries).await?;
                }
                _ = tokio::signal::ctrl_c() => {
                    logger.info("Shutting down");
                    break;
                }
            }
        }
    }

    drop(dispatcher);
    for handle in listeners {
        handle.abort();
    }
    Ok(())
}
