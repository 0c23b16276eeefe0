use crate::api::{MIN_HOURS_PER_DAY, SpotPriceSource};
use crate::error::Result;
use crate::pricing::RawPriceRecord;
use chrono::{DateTime, Utc};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct Slots {
    today: Vec<RawPriceRecord>,
    tomorrow: Vec<RawPriceRecord>,
    pending: Option<(Vec<RawPriceRecord>, Vec<RawPriceRecord>)>,
    next_refresh: Option<DateTime<Utc>>,
    predictions: Option<serde_json::Value>,
}

/// In-memory price source for hosts that obtain prices themselves.
///
/// Records are pushed with [`set_prices`](Self::set_prices). Records staged
/// with [`stage_update`](Self::stage_update) become visible on the next
/// `update()`, which is how a fetch is modelled.
#[derive(Debug)]
pub struct StaticSpotPriceSource {
    source: String,
    slots: RwLock<Slots>,
    update_calls: AtomicUsize,
}

impl StaticSpotPriceSource {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            slots: RwLock::new(Slots::default()),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Replace the cached records immediately
    pub fn set_prices(&self, today: Vec<RawPriceRecord>, tomorrow: Vec<RawPriceRecord>) {
        if let Ok(mut s) = self.slots.write() {
            s.today = today;
            s.tomorrow = tomorrow;
        }
    }

    /// Records to publish on the next `update()`
    pub fn stage_update(&self, today: Vec<RawPriceRecord>, tomorrow: Vec<RawPriceRecord>) {
        if let Ok(mut s) = self.slots.write() {
            s.pending = Some((today, tomorrow));
        }
    }

    pub fn set_predictions(&self, predictions: Option<serde_json::Value>) {
        if let Ok(mut s) = self.slots.write() {
            s.predictions = predictions;
        }
    }

    pub fn set_next_data_refresh(&self, at: Option<DateTime<Utc>>) {
        if let Ok(mut s) = self.slots.write() {
            s.next_refresh = at;
        }
    }

    /// Number of `update()` calls so far
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn read<T>(&self, f: impl FnOnce(&Slots) -> T) -> Option<T> {
        self.slots.read().ok().map(|s| f(&s))
    }
}

#[async_trait::async_trait]
impl SpotPriceSource for StaticSpotPriceSource {
    fn today(&self) -> Vec<RawPriceRecord> {
        self.read(|s| s.today.clone()).unwrap_or_default()
    }

    fn tomorrow(&self) -> Vec<RawPriceRecord> {
        self.read(|s| s.tomorrow.clone()).unwrap_or_default()
    }

    fn tomorrow_valid(&self) -> bool {
        self.read(|s| s.tomorrow.len() >= MIN_HOURS_PER_DAY)
            .unwrap_or(false)
    }

    async fn update(&self) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut s) = self.slots.write()
            && let Some((today, tomorrow)) = s.pending.take()
        {
            s.today = today;
            s.tomorrow = tomorrow;
        }
        Ok(())
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn predictions(&self) -> Option<serde_json::Value> {
        self.read(|s| s.predictions.clone()).flatten()
    }

    fn next_data_refresh(&self) -> Option<DateTime<Utc>> {
        self.read(|s| s.next_refresh).flatten()
    }
}
