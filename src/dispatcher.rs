//! Update notifications
//!
//! A price source signals a topic after it has refreshed its data and every
//! subscribed sensor re-validates. Topics are plain strings; each one is a
//! tokio broadcast channel created on first use.

use crate::logging::get_logger;
use crate::sensor::PriceSensor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// Topic raised after the price source has refreshed
pub const UPDATE_EDS: &str = "eds_update";

const CHANNEL_CAPACITY: usize = 16;

/// Process-wide publish/subscribe registry
#[derive(Debug, Default, Clone)]
pub struct UpdateDispatcher {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<()>>>>,
}

impl UpdateDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<()> {
        let mut topics = match self.topics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Register an observer for a topic
    pub fn connect(&self, topic: &str) -> broadcast::Receiver<()> {
        self.sender(topic).subscribe()
    }

    /// Signal a topic; returns how many observers were notified
    pub fn send(&self, topic: &str) -> usize {
        self.sender(topic).send(()).unwrap_or(0)
    }
}

/// Re-validate `sensor` every time the topic behind `rx` is signalled.
///
/// Missed signals collapse into a single validation. The task ends when the
/// dispatcher is dropped.
pub fn spawn_update_listener(
    sensor: Arc<tokio::sync::Mutex<PriceSensor>>,
    rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let logger = get_logger("dispatcher");
    tokio::spawn(async move {
        let mut stream = BroadcastStream::new(rx);
        while let Some(item) = stream.next().await {
            if let Err(BroadcastStreamRecvError::Lagged(n)) = item {
                logger.debug(&format!("Listener lagged by {} signals", n));
            }
            let mut sensor = sensor.lock().await;
            if let Err(e) = sensor.validate_data().await {
                logger.debug(&format!("Validation of {} failed: {}", sensor.name(), e));
            }
        }
        logger.debug("Update channel closed, listener stopped");
    })
}
