use serde::{Deserialize, Serialize};
use tabdeck_core::error::ReqwestErrorExt;
use tabdeck_core::{AppError, StorageError};

/// Geographic coordinate.
///
/// Serialized as `{"lat": .., "lon": ..}`, which is how saved coordinates are
/// kept in the sync store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Last-resort display label, two decimals: `"30.27, -97.74"`.
    pub fn display_label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Where a resolved location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationSource {
    SessionOverride,
    SavedCoordinates,
    TypedQuery,
}

/// A location chosen for the current page session only. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOverride {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Output of one resolution cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub label: String,
    pub source: LocationSource,
}

/// Result of a forward geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Current conditions block of a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub weather_code: Option<i64>,
}

/// One day of the daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub weather_code: Option<i64>,
}

/// What the forecast cache stores and the display transform consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPayload {
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

/// Pictogram buckets for WMO weather codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pictogram {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl Pictogram {
    pub const ALL: [Pictogram; 8] = [
        Self::Clear,
        Self::PartlyCloudy,
        Self::Fog,
        Self::Drizzle,
        Self::Rain,
        Self::Snow,
        Self::Thunderstorm,
        Self::Unknown,
    ];

    /// Map a WMO weather code. Every code maps to exactly one bucket.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "⛅️",
            Self::Fog => "🌫️",
            Self::Drizzle => "🌦️",
            Self::Rain => "🌧️",
            Self::Snow => "🌨️",
            Self::Thunderstorm => "⛈️",
            Self::Unknown => "❓",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }
}

/// Device position errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("No match for {0:?}")]
    NoMatch(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("Cache error: {0}")]
    Cache(#[from] StorageError),
}

impl From<WeatherError> for tabdeck_core::WeatherError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::NoMatch(query) => Self::LocationNotFound(query),
            WeatherError::Location(LocationError::PermissionDenied) => Self::PermissionDenied,
            WeatherError::Location(_) => Self::ServiceUnavailable,
            WeatherError::Cache(e) => Self::CacheError(e.to_string()),
            other => Self::ApiError(other.to_string()),
        }
    }
}

impl From<WeatherError> for AppError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Cache(e) => AppError::Storage(e),
            other => AppError::Weather(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_clear() {
        assert_eq!(Pictogram::from_wmo_code(0), Pictogram::Clear);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        for code in [1, 2, 3] {
            assert_eq!(Pictogram::from_wmo_code(code), Pictogram::PartlyCloudy);
        }
    }

    #[test]
    fn test_wmo_code_fog() {
        assert_eq!(Pictogram::from_wmo_code(45), Pictogram::Fog);
        assert_eq!(Pictogram::from_wmo_code(48), Pictogram::Fog);
    }

    #[test]
    fn test_wmo_code_rain_includes_showers() {
        for code in [61, 63, 65, 80, 81, 82] {
            assert_eq!(Pictogram::from_wmo_code(code), Pictogram::Rain);
        }
    }

    #[test]
    fn test_wmo_code_snow() {
        for code in [71, 73, 75, 85, 86] {
            assert_eq!(Pictogram::from_wmo_code(code), Pictogram::Snow);
        }
    }

    #[test]
    fn test_wmo_code_thunderstorm() {
        for code in [95, 96, 99] {
            assert_eq!(Pictogram::from_wmo_code(code), Pictogram::Thunderstorm);
        }
    }

    #[test]
    fn test_unlisted_codes_are_unknown() {
        // Freezing drizzle/rain and snow grains have no bucket of their own.
        for code in [-1, 4, 56, 57, 66, 67, 77, 100, i64::MAX, i64::MIN] {
            assert_eq!(Pictogram::from_wmo_code(code), Pictogram::Unknown);
        }
    }

    #[test]
    fn test_mapping_is_total_over_small_range() {
        for code in -10..=200 {
            let picto = Pictogram::from_wmo_code(code);
            assert!(Pictogram::ALL.contains(&picto));
        }
    }

    #[test]
    fn test_symbols_are_distinct() {
        let symbols: std::collections::HashSet<_> =
            Pictogram::ALL.iter().map(|p| p.symbol()).collect();
        assert_eq!(symbols.len(), Pictogram::ALL.len());
    }

    #[test]
    fn test_coordinate_serializes_with_short_keys() {
        let coord = Coordinate::new(30.27, -97.74);
        let json = serde_json::to_value(coord).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"lat": 30.27, "lon": -97.74}));
    }

    #[test]
    fn test_display_label_two_decimals() {
        assert_eq!(Coordinate::new(30.2672, -97.7431).display_label(), "30.27, -97.74");
    }

    #[test]
    fn test_error_maps_to_core() {
        let core: tabdeck_core::WeatherError = WeatherError::NoMatch("Atlantis".into()).into();
        assert!(matches!(core, tabdeck_core::WeatherError::LocationNotFound(_)));

        let core: tabdeck_core::WeatherError =
            WeatherError::Location(LocationError::PermissionDenied).into();
        assert_eq!(core.user_message(), "Location blocked");
    }

    #[test]
    fn test_error_maps_to_app_error() {
        let app: AppError = WeatherError::Status(503).into();
        assert_eq!(app.user_message(), "Weather unavailable");

        let app: AppError = WeatherError::Cache(StorageError::Corruption("x".into())).into();
        assert!(matches!(app, AppError::Storage(_)));
    }
}
