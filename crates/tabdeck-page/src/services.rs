//! Everything the page and options screens talk to, built once from config.

use std::sync::Arc;
use std::time::Duration;

use tabdeck_calendar::CalendarClient;
use tabdeck_core::{App, AppError, Config, KeyValueStore, Stores};
use tabdeck_weather::{
    FixedPosition, GeocodingClient, LocationResolver, PositionSource, WeatherService,
};

pub struct PageServices {
    pub sync: Arc<dyn KeyValueStore>,
    pub resolver: LocationResolver,
    pub weather: WeatherService,
    pub calendar: CalendarClient,
    pub position: Box<dyn PositionSource>,
    pub geolocation_timeout: Duration,
    pub embed_url: String,
}

impl PageServices {
    pub fn from_app(app: &App) -> Result<Self, AppError> {
        let calendar = CalendarClient::from_config(&app.config().calendar);
        Self::new(app.config(), app.stores(), calendar)
    }

    /// Services over explicit stores and calendar client. The position
    /// source starts out empty; see [`PageServices::with_position`].
    pub fn new(
        config: &Config,
        stores: &Stores,
        calendar: CalendarClient,
    ) -> Result<Self, AppError> {
        let geocoder = GeocodingClient::new(&config.weather.geocoding_url)?;

        Ok(Self {
            sync: stores.sync.clone(),
            resolver: LocationResolver::new(geocoder, stores.sync.clone()),
            weather: WeatherService::from_config(&config.weather, stores.local.clone())?,
            calendar,
            position: Box::new(FixedPosition(None)),
            geolocation_timeout: Duration::from_secs(config.weather.geolocation_timeout_secs),
            embed_url: config.calendar.embed_url.clone(),
        })
    }

    pub fn with_position(mut self, position: impl PositionSource + 'static) -> Self {
        self.position = Box::new(position);
        self
    }
}
