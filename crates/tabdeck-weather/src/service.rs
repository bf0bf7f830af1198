use std::sync::Arc;
use std::time::Duration;

use tabdeck_core::{KeyValueStore, WeatherConfig};
use tracing::instrument;

use crate::cache::ForecastCache;
use crate::provider::WeatherProvider;
use crate::types::{Coordinate, ForecastPayload, WeatherError};

/// Cached forecast lookups.
pub struct WeatherService {
    provider: WeatherProvider,
    cache: ForecastCache,
}

impl WeatherService {
    pub fn new(provider: WeatherProvider, cache: ForecastCache) -> Self {
        Self { provider, cache }
    }

    /// Build from config; `local` is where the cache map lives.
    pub fn from_config(
        config: &WeatherConfig,
        local: Arc<dyn KeyValueStore>,
    ) -> Result<Self, WeatherError> {
        let provider = WeatherProvider::new(&config.forecast_url)?;
        let cache = ForecastCache::new(
            local,
            Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60),
            config.cache_capacity,
        );
        Ok(Self::new(provider, cache))
    }

    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    /// Forecast for `coord`, from cache when fresh.
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(&self, coord: Coordinate) -> Result<ForecastPayload, WeatherError> {
        self.cache
            .get_or_fetch(coord, || self.provider.fetch(coord))
            .await
    }
}
