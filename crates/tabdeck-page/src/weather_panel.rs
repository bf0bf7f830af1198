//! Weather panel state and its text rendering.

use std::fmt;

use chrono::NaiveDate;
use tabdeck_weather::{
    ForecastView, LocationResolver, LocationSettings, SessionOverride, WeatherService,
};

pub const NOT_CONFIGURED: &str = "Open Customize to choose location.";
pub const UNAVAILABLE: &str = "Weather unavailable";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub label: String,
    pub date: NaiveDate,
    pub view: ForecastView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPanel {
    NotConfigured,
    Unavailable,
    Ready(WeatherReport),
}

impl WeatherPanel {
    /// Resolve the location and load its forecast. Every failure ends up as
    /// [`WeatherPanel::Unavailable`]; nothing configured is
    /// [`WeatherPanel::NotConfigured`].
    pub async fn load(
        resolver: &LocationResolver,
        weather: &WeatherService,
        session_override: Option<&SessionOverride>,
        settings: &LocationSettings,
        today: NaiveDate,
    ) -> Self {
        let location = match resolver.resolve(session_override, settings).await {
            Ok(Some(location)) => location,
            Ok(None) => return Self::NotConfigured,
            Err(e) => {
                tracing::error!("Weather location lookup failed: {}", e);
                return Self::Unavailable;
            }
        };

        match weather.forecast(location.coordinate).await {
            Ok(payload) => Self::Ready(WeatherReport {
                label: location.label,
                date: today,
                view: ForecastView::build(&payload, today),
            }),
            Err(e) => {
                tracing::error!("Weather render error: {}", e);
                Self::Unavailable
            }
        }
    }

    pub fn status(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured => Some(NOT_CONFIGURED),
            Self::Unavailable => Some(UNAVAILABLE),
            Self::Ready(_) => None,
        }
    }
}

impl fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = match self {
            Self::Ready(report) => report,
            other => return f.write_str(other.status().unwrap_or_default()),
        };

        let today = &report.view.today;
        writeln!(f, "{}", report.label)?;
        writeln!(f, "{}", report.date.format("%A, %b %-d"))?;
        write!(
            f,
            "{} {}°F (feels like {}°)",
            today.pictogram.symbol(),
            today.temperature,
            today.feels_like
        )?;

        for day in &report.view.days {
            write!(
                f,
                "\n{:<4}{} {:>4}° {:>4}° {:>4}%",
                day.weekday.as_deref().unwrap_or(&day.date),
                day.pictogram.symbol(),
                day.high,
                day.low,
                day.precipitation_probability
            )?;
        }

        Ok(())
    }
}
