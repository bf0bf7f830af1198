//! Weather for the new tab page
//!
//! Resolves a location (session override, saved coordinates, or a typed
//! query) to a display label, fetches the Open-Meteo forecast through a
//! bounded local cache, and turns it into a day-by-day view.

pub mod cache;
pub mod display;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod states;
pub mod types;

pub use cache::{cache_key, ForecastCache};
pub use display::{DayRow, ForecastView, Headline};
pub use geocode::{is_raw_coordinate_label, Candidate, GeocodingClient};
pub use location::{locate, FixedPosition, PositionSource};
pub use provider::WeatherProvider;
pub use resolver::{LocationResolver, LocationSettings};
pub use service::WeatherService;
pub use types::*;
