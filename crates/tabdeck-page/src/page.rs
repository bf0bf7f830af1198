//! New tab page boot.
//!
//! Settings are read first. Without selected calendars (or on first run) the
//! page stops at a setup prompt and does no weather work at all. Otherwise it
//! builds the greeting, timezone label and agenda URL, then the weather panel.

use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use tabdeck_calendar::agenda_embed_url;
use tabdeck_core::{AppError, ConfigError};
use tabdeck_weather::SessionOverride;

use crate::services::PageServices;
use crate::settings::UserSettings;
use crate::weather_panel::WeatherPanel;

pub const NO_CALENDARS: &str = "No calendars selected. Click Customize.";

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub greeting: String,
    pub timezone: String,
    pub agenda_url: String,
    pub weather: WeatherPanel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    NeedsSetup,
    Ready(Page),
}

pub fn greeting(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "Good day".to_string()
    } else {
        format!("Good day, {} 👋", name)
    }
}

/// Name of the machine's zone: `$TZ` when it is a known IANA name, else the
/// current UTC offset.
pub fn local_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if tz.parse::<Tz>().is_ok() {
            return tz;
        }
    }
    Local::now().format("UTC%:z").to_string()
}

/// Saved zone, or the local one when unset.
pub fn effective_timezone(saved: &str) -> String {
    let saved = saved.trim();
    if saved.is_empty() {
        local_timezone()
    } else {
        saved.to_string()
    }
}

/// Today's date in `timezone`, falling back to local time for names that
/// don't parse.
pub fn today_in(timezone: &str) -> NaiveDate {
    match timezone.parse::<Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
        Err(_) => Local::now().date_naive(),
    }
}

pub async fn boot(
    services: &PageServices,
    session_override: Option<&SessionOverride>,
) -> Result<PageState, AppError> {
    let settings = UserSettings::load(services.sync.as_ref())?;

    if settings.needs_setup() {
        tracing::info!(
            first_run = settings.first_run,
            calendars = settings.calendar_ids.len(),
            "Page needs setup"
        );
        return Ok(PageState::NeedsSetup);
    }

    let timezone = effective_timezone(&settings.timezone);
    let agenda_url = agenda_embed_url(&services.embed_url, &timezone, &settings.calendar_ids)
        .map_err(|e| ConfigError::Invalid(format!("calendar.embed_url: {}", e)))?;
    tracing::debug!("Calendar embed URL: {}", agenda_url);

    let weather = WeatherPanel::load(
        &services.resolver,
        &services.weather,
        session_override,
        &settings.location(),
        today_in(&timezone),
    )
    .await;

    Ok(PageState::Ready(Page {
        greeting: greeting(&settings.name),
        timezone,
        agenda_url: agenda_url.into(),
        weather,
    }))
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeedsSetup => f.write_str(NO_CALENDARS),
            Self::Ready(page) => {
                writeln!(f, "{}", page.greeting)?;
                writeln!(f, "{}", page.timezone)?;
                writeln!(f, "Agenda: {}", page.agenda_url)?;
                writeln!(f)?;
                write!(f, "{}", page.weather)
            }
        }
    }
}
