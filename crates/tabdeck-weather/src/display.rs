//! Forecast → display structure.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{ForecastPayload, Pictogram};

/// Days listed after today.
pub const UPCOMING_DAYS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub temperature: i64,
    pub feels_like: i64,
    pub pictogram: Pictogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub date: String,
    /// Short weekday name ("Mon"), when the date parses
    pub weekday: Option<String>,
    pub high: i64,
    pub low: i64,
    pub precipitation_probability: i64,
    pub pictogram: Pictogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub today: Headline,
    pub days: Vec<DayRow>,
}

/// Nearest integer with halves going up, so -2.5 becomes -2.
fn round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Index of `today` in the daily series, 0 when it isn't there.
pub fn today_index(payload: &ForecastPayload, today: NaiveDate) -> usize {
    let today = today.format("%Y-%m-%d").to_string();
    payload
        .daily
        .iter()
        .position(|d| d.date == today)
        .unwrap_or(0)
}

impl ForecastView {
    /// Headline from live conditions (falling back to today's daily values)
    /// and up to six following days.
    pub fn build(payload: &ForecastPayload, today: NaiveDate) -> Self {
        let idx = today_index(payload, today);
        let current = payload.current.clone().unwrap_or_default();
        let today_daily = payload.daily.get(idx);

        let temperature = round(
            current
                .temperature
                .or_else(|| today_daily.and_then(|d| d.high))
                .unwrap_or(0.0),
        );
        let code = current
            .weather_code
            .or_else(|| today_daily.and_then(|d| d.weather_code))
            .unwrap_or(-1);
        let feels_like = current.feels_like.map(round).unwrap_or(temperature);

        let days = payload
            .daily
            .iter()
            .skip(idx + 1)
            .take(UPCOMING_DAYS)
            .map(|d| DayRow {
                date: d.date.clone(),
                weekday: NaiveDate::parse_from_str(&d.date, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.format("%a").to_string()),
                high: round(d.high.unwrap_or(0.0)),
                low: round(d.low.unwrap_or(0.0)),
                precipitation_probability: round(d.precipitation_probability.unwrap_or(0.0)),
                pictogram: Pictogram::from_wmo_code(d.weather_code.unwrap_or(-1)),
            })
            .collect();

        Self {
            today: Headline {
                temperature,
                feels_like,
                pictogram: Pictogram::from_wmo_code(code),
            },
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrentConditions, DailyForecast};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
    }

    fn series(start: &str, days: u32) -> Vec<DailyForecast> {
        (0..days)
            .map(|i| {
                let d = date(start) + chrono::Days::new(u64::from(i));
                DailyForecast {
                    date: d.format("%Y-%m-%d").to_string(),
                    high: Some(80.0 + f64::from(i)),
                    low: Some(60.0 + f64::from(i)),
                    precipitation_probability: Some(f64::from(i) * 10.0),
                    weather_code: Some(61),
                }
            })
            .collect()
    }

    #[test]
    fn test_today_found_in_series() {
        let payload = ForecastPayload {
            current: None,
            daily: series("2026-10-15", 7),
        };
        assert_eq!(today_index(&payload, date("2026-10-16")), 1);
    }

    #[test]
    fn test_today_missing_defaults_to_first() {
        let payload = ForecastPayload {
            current: None,
            daily: series("2026-10-20", 7),
        };
        assert_eq!(today_index(&payload, date("2026-10-16")), 0);
    }

    #[test]
    fn test_headline_prefers_current_conditions() {
        let payload = ForecastPayload {
            current: Some(CurrentConditions {
                temperature: Some(71.6),
                feels_like: Some(74.4),
                weather_code: Some(0),
            }),
            daily: series("2026-10-16", 7),
        };

        let view = ForecastView::build(&payload, date("2026-10-16"));
        assert_eq!(view.today.temperature, 72);
        assert_eq!(view.today.feels_like, 74);
        assert_eq!(view.today.pictogram, Pictogram::Clear);
    }

    #[test]
    fn test_halves_round_up() {
        let payload = ForecastPayload {
            current: Some(CurrentConditions {
                temperature: Some(-2.5),
                feels_like: Some(2.5),
                weather_code: Some(71),
            }),
            daily: Vec::new(),
        };

        let view = ForecastView::build(&payload, date("2026-01-10"));
        assert_eq!(view.today.temperature, -2);
        assert_eq!(view.today.feels_like, 3);
        assert_eq!(round(-2.6), -3);
    }

    #[test]
    fn test_headline_falls_back_to_daily() {
        let payload = ForecastPayload {
            current: None,
            daily: series("2026-10-16", 3),
        };

        let view = ForecastView::build(&payload, date("2026-10-16"));
        assert_eq!(view.today.temperature, 80);
        assert_eq!(view.today.feels_like, 80);
        assert_eq!(view.today.pictogram, Pictogram::Rain);
    }

    #[test]
    fn test_empty_payload_renders_unknown() {
        let view = ForecastView::build(&ForecastPayload::default(), date("2026-10-16"));
        assert_eq!(view.today.temperature, 0);
        assert_eq!(view.today.pictogram, Pictogram::Unknown);
        assert!(view.days.is_empty());
    }

    #[test]
    fn test_rows_start_tomorrow_and_cap_at_six() {
        let payload = ForecastPayload {
            current: None,
            daily: series("2026-10-15", 10),
        };

        let view = ForecastView::build(&payload, date("2026-10-16"));
        assert_eq!(view.days.len(), 6);
        assert_eq!(view.days[0].date, "2026-10-17");
        assert_eq!(view.days[0].weekday.as_deref(), Some("Sat"));
        assert_eq!(view.days[0].high, 82);
        assert_eq!(view.days[0].precipitation_probability, 20);
        assert_eq!(view.days[5].date, "2026-10-22");
    }

    #[test]
    fn test_rows_stop_at_end_of_series() {
        let payload = ForecastPayload {
            current: None,
            daily: series("2026-10-16", 4),
        };

        let view = ForecastView::build(&payload, date("2026-10-16"));
        assert_eq!(view.days.len(), 3);
    }
}
