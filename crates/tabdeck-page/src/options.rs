//! Options screen actions.

use std::fmt;

use chrono_tz::Tz;
use serde_json::Value;
use tabdeck_calendar::message::{dispatch, Request};
use tabdeck_calendar::types::CalendarListResponse;
use tabdeck_calendar::{sort_for_picker, Calendar};
use tabdeck_core::storage::keys;
use tabdeck_core::{AppError, ConfigError, Entries, StorageError};
use tabdeck_weather::{is_raw_coordinate_label, locate, LocationError};

use crate::page::local_timezone;
use crate::services::PageServices;
use crate::settings::UserSettings;

pub const LOCATION_BLOCKED: &str = "Location blocked";

/// What the options form submits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveForm {
    pub name: String,
    /// Empty means the local zone
    pub timezone: String,
    pub location: String,
    pub calendar_ids: Vec<String>,
}

/// Save the form. A location that fails to geocode is still saved as text,
/// with no coordinates, and the page resolves it later.
pub async fn save(services: &PageServices, form: SaveForm) -> Result<UserSettings, AppError> {
    let timezone = match form.timezone.trim() {
        "" => local_timezone(),
        tz if tz.parse::<Tz>().is_ok() => tz.to_string(),
        tz => {
            return Err(ConfigError::Invalid(format!("unknown time zone {:?}", tz)).into());
        }
    };

    let location_query = form.location.trim().to_string();
    let (location_coords, location_label) = if location_query.is_empty() {
        (None, String::new())
    } else {
        match services.resolver.geocoder().geocode(&location_query).await {
            Ok(place) => (Some(place.coordinate), place.label),
            Err(e) => {
                tracing::warn!("Could not geocode {:?}: {}", location_query, e);
                (None, String::new())
            }
        }
    };

    let settings = UserSettings {
        name: form.name.trim().to_string(),
        timezone,
        location_query,
        location_coords,
        location_label,
        calendar_ids: form.calendar_ids,
        first_run: false,
    };
    settings.save(services.sync.as_ref())?;
    Ok(settings)
}

/// Result of "use current position".
#[derive(Debug)]
pub enum PositionStatus {
    Saved(String),
    Blocked(LocationError),
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved(label) => write!(f, "Saved {}", label),
            Self::Blocked(_) => f.write_str(LOCATION_BLOCKED),
        }
    }
}

/// Ask the position source for a fix, label it, and save it as the weather
/// location. The typed location is cleared.
pub async fn use_current_position(services: &PageServices) -> Result<PositionStatus, AppError> {
    let coordinate = match locate(services.position.as_ref(), services.geolocation_timeout).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Position unavailable: {}", e);
            return Ok(PositionStatus::Blocked(e));
        }
    };

    let label = services.resolver.geocoder().reverse_label(coordinate).await;

    let coords = serde_json::to_value(coordinate).map_err(|e| StorageError::InvalidValue {
        key: keys::LOCATION_COORDS.to_string(),
        message: e.to_string(),
    })?;
    // A coordinate-shaped label is left blank so the page re-resolves it.
    let stored_label = if is_raw_coordinate_label(&label) {
        String::new()
    } else {
        label.clone()
    };

    let mut entries = Entries::new();
    entries.insert(keys::LOCATION_COORDS.to_string(), coords);
    entries.insert(keys::LOCATION_LABEL.to_string(), stored_label.into());
    entries.insert(keys::LOCATION_QUERY.to_string(), Value::String(String::new()));
    services.sync.set(entries)?;

    tracing::info!("Saved current position as {:?}", label);
    Ok(PositionStatus::Saved(label))
}

/// Sign-in failure shown on the options screen.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Sign-in failed: {0}")]
pub struct SignInError(pub String);

/// List the user's calendars through the backend message contract, primary
/// first.
pub async fn sign_in(services: &PageServices) -> Result<Vec<Calendar>, SignInError> {
    let response = dispatch(&services.calendar, Request::CalendarList).await;

    if !response.ok {
        return Err(SignInError(response.error.unwrap_or_default()));
    }

    let list: CalendarListResponse =
        serde_json::from_value(response.data.unwrap_or(Value::Null))
            .map_err(|e| SignInError(e.to_string()))?;

    let mut calendars: Vec<Calendar> = list.items.into_iter().map(Calendar::from).collect();
    sort_for_picker(&mut calendars);
    tracing::info!("Signed in, {} calendars", calendars.len());
    Ok(calendars)
}
