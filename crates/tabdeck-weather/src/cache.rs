//! Forecast cache kept in the `local` store.
//!
//! All entries live under one key (`wx_cache`) as a map of rounded
//! coordinate → `{ts, data}`. The map is bounded: once it grows past its
//! capacity the entries with the oldest timestamps are dropped. Every
//! read-modify-write goes through one async lock, so overlapping fetches in
//! the same process never lose each other's updates.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabdeck_core::storage::keys;
use tabdeck_core::{KeyValueStore, KeyValueStoreExt};
use tokio::sync::Mutex;

use crate::types::{Coordinate, ForecastPayload, WeatherError};

pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_CAPACITY: usize = 50;

/// Cache key: both coordinates rounded to 3 decimals, comma-joined.
///
/// Exact binary ties such as 30.0625 round to even ("30.062"). Keys are only
/// ever compared with keys made here, so that is consistent.
pub fn cache_key(coord: Coordinate) -> String {
    format!("{:.3},{:.3}", coord.latitude, coord.longitude)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Write time, milliseconds since the Unix epoch
    pub ts: i64,
    pub data: ForecastPayload,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age_ms = now.timestamp_millis() - self.ts;
        i128::from(age_ms) < ttl.as_millis() as i128
    }
}

type CacheMap = HashMap<String, CacheEntry>;

pub struct ForecastCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    capacity: usize,
    lock: Mutex<()>,
}

impl ForecastCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration, capacity: usize) -> Self {
        Self {
            store,
            ttl,
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn with_defaults(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    fn load(&self) -> CacheMap {
        match self.store.get_value::<CacheMap>(keys::FORECAST_CACHE) {
            Ok(map) => map.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Discarding unreadable forecast cache: {}", e);
                CacheMap::new()
            }
        }
    }

    fn evict(&self, map: &mut CacheMap) {
        if map.len() <= self.capacity {
            return;
        }

        let mut by_age: Vec<(String, i64)> =
            map.iter().map(|(k, e)| (k.clone(), e.ts)).collect();
        by_age.sort_by_key(|(_, ts)| *ts);

        let excess = map.len() - self.capacity;
        for (key, _) in by_age.into_iter().take(excess) {
            tracing::debug!("Evicting cached forecast {}", key);
            map.remove(&key);
        }
    }

    /// Fresh payload for `coord` as of `now`, if any.
    pub fn lookup(&self, coord: Coordinate, now: DateTime<Utc>) -> Option<ForecastPayload> {
        let key = cache_key(coord);
        self.load()
            .remove(&key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.data)
    }

    /// Write `payload` stamped with `now`, evicting beyond capacity.
    pub fn insert(
        &self,
        coord: Coordinate,
        payload: ForecastPayload,
        now: DateTime<Utc>,
    ) -> Result<(), WeatherError> {
        let mut map = self.load();
        map.insert(
            cache_key(coord),
            CacheEntry {
                ts: now.timestamp_millis(),
                data: payload,
            },
        );
        self.evict(&mut map);
        self.store.set_value(keys::FORECAST_CACHE, &map)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached payload when fresh, otherwise run `fetch` and store
    /// its result. The lock is held across the fetch, so concurrent callers
    /// for the same coordinate share one upstream request.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        coord: Coordinate,
        fetch: F,
    ) -> Result<ForecastPayload, WeatherError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ForecastPayload, WeatherError>>,
    {
        let _guard = self.lock.lock().await;

        if let Some(payload) = self.lookup(coord, Utc::now()) {
            tracing::debug!("Forecast cache hit for {}", cache_key(coord));
            return Ok(payload);
        }

        tracing::debug!("Forecast cache miss for {}", cache_key(coord));
        let payload = fetch().await?;

        if let Err(e) = self.insert(coord, payload.clone(), Utc::now()) {
            tracing::warn!("Failed to persist forecast cache: {}", e);
        }

        Ok(payload)
    }
}
