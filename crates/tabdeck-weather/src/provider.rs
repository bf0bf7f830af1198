use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{
    Coordinate, CurrentConditions, DailyForecast, ForecastPayload, WeatherError,
};

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,weather_code";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_probability_max,weather_code";

/// Forecast endpoint client. One request per call; caching lives in
/// [`crate::ForecastCache`].
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions plus the daily series, Fahrenheit, local timezone.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, coord: Coordinate) -> Result<ForecastPayload, WeatherError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coord.latitude.to_string()),
                ("longitude", coord.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body: open_meteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let payload = ForecastPayload::from(body);
        tracing::info!("Fetched forecast with {} days", payload.daily.len());
        Ok(payload)
    }
}

/// Open-Meteo forecast response shapes.
mod open_meteo {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: Option<CurrentData>,
        pub daily: Option<DailyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub temperature_2m: Option<f64>,
        pub apparent_temperature: Option<f64>,
        pub weather_code: Option<i64>,
    }

    /// Column-oriented: one array per field, indexed like `time`.
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        #[serde(default)]
        pub time: Vec<String>,
        #[serde(default)]
        pub temperature_2m_max: Vec<Option<f64>>,
        #[serde(default)]
        pub temperature_2m_min: Vec<Option<f64>>,
        #[serde(default)]
        pub precipitation_probability_max: Vec<Option<f64>>,
        #[serde(default)]
        pub weather_code: Vec<Option<i64>>,
    }

    fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
        values.get(i).copied().flatten()
    }

    impl From<ForecastResponse> for ForecastPayload {
        fn from(response: ForecastResponse) -> Self {
            let current = response.current.map(|c| CurrentConditions {
                temperature: c.temperature_2m,
                feels_like: c.apparent_temperature,
                weather_code: c.weather_code,
            });

            let daily = response
                .daily
                .map(|d| {
                    d.time
                        .iter()
                        .enumerate()
                        .map(|(i, date)| DailyForecast {
                            date: date.clone(),
                            high: column(&d.temperature_2m_max, i),
                            low: column(&d.temperature_2m_min, i),
                            precipitation_probability: column(&d.precipitation_probability_max, i),
                            weather_code: column(&d.weather_code, i),
                        })
                        .collect()
                })
                .unwrap_or_default();

            Self { current, daily }
        }
    }
}
