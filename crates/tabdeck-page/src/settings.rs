//! User settings kept in the sync store.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tabdeck_core::storage::keys;
use tabdeck_core::{Entries, KeyValueStore, StorageError};
use tabdeck_weather::{Coordinate, LocationSettings};

const ALL_KEYS: [&str; 8] = [
    keys::NAME,
    keys::TIMEZONE,
    keys::LOCATION_QUERY,
    keys::LOCATION_COORDS,
    keys::LOCATION_LABEL,
    keys::CALENDAR_IDS,
    keys::LEGACY_CALENDAR_IDS,
    keys::FIRST_RUN,
];

#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub name: String,
    /// IANA zone; empty means the local zone
    pub timezone: String,
    /// Free-text location as typed
    pub location_query: String,
    pub location_coords: Option<Coordinate>,
    pub location_label: String,
    pub calendar_ids: Vec<String>,
    pub first_run: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            timezone: String::new(),
            location_query: String::new(),
            location_coords: None,
            location_label: String::new(),
            calendar_ids: Vec::new(),
            first_run: true,
        }
    }
}

/// Take `key` out of `entries` as a `T`. Missing, null, or mistyped values
/// fall back to the default.
fn take<T: DeserializeOwned>(entries: &mut Entries, key: &str, default: T) -> T {
    match entries.remove(key) {
        None | Some(Value::Null) => default,
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed setting {}: {}", key, e);
            default
        }),
    }
}

impl UserSettings {
    /// Read settings, filling defaults. Calendar ids saved under the old
    /// `selCalIds` key are adopted when `calIds` is empty.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let mut entries = store.get(&ALL_KEYS)?;
        let defaults = Self::default();

        let mut settings = Self {
            name: take(&mut entries, keys::NAME, defaults.name),
            timezone: take(&mut entries, keys::TIMEZONE, defaults.timezone),
            location_query: take(&mut entries, keys::LOCATION_QUERY, defaults.location_query),
            location_coords: take(&mut entries, keys::LOCATION_COORDS, defaults.location_coords),
            location_label: take(&mut entries, keys::LOCATION_LABEL, defaults.location_label),
            calendar_ids: take(&mut entries, keys::CALENDAR_IDS, defaults.calendar_ids),
            first_run: take(&mut entries, keys::FIRST_RUN, defaults.first_run),
        };

        if settings.calendar_ids.is_empty() {
            let legacy: Vec<String> = take(&mut entries, keys::LEGACY_CALENDAR_IDS, Vec::new());
            if !legacy.is_empty() {
                tracing::info!("Adopting {} calendar ids from legacy key", legacy.len());
                settings.calendar_ids = legacy;
            }
        }

        Ok(settings)
    }

    /// Write every setting back.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        let coords = match self.location_coords {
            Some(c) => serde_json::to_value(c).map_err(|e| StorageError::InvalidValue {
                key: keys::LOCATION_COORDS.to_string(),
                message: e.to_string(),
            })?,
            None => Value::Null,
        };

        let mut entries = Entries::new();
        entries.insert(keys::NAME.to_string(), self.name.clone().into());
        entries.insert(keys::TIMEZONE.to_string(), self.timezone.clone().into());
        entries.insert(keys::LOCATION_QUERY.to_string(), self.location_query.clone().into());
        entries.insert(keys::LOCATION_COORDS.to_string(), coords);
        entries.insert(keys::LOCATION_LABEL.to_string(), self.location_label.clone().into());
        entries.insert(keys::CALENDAR_IDS.to_string(), self.calendar_ids.clone().into());
        entries.insert(keys::FIRST_RUN.to_string(), self.first_run.into());

        store.set(entries)?;
        tracing::info!("Saved user settings");
        Ok(())
    }

    /// The part the location resolver reads.
    pub fn location(&self) -> LocationSettings {
        LocationSettings {
            saved_coords: self.location_coords,
            saved_label: self.location_label.clone(),
            query: self.location_query.clone(),
        }
    }

    /// True when the page should stop at the "no calendars" prompt.
    pub fn needs_setup(&self) -> bool {
        self.first_run || self.calendar_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;
    use tabdeck_core::{JsonFileStore, MemoryStore};

    fn store(value: Value) -> MemoryStore {
        match value {
            Value::Object(map) => MemoryStore::with_entries(map),
            _ => MemoryStore::new(),
        }
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = UserSettings::load(&MemoryStore::new()).unwrap();
        assert_eq!(settings, UserSettings::default());
        assert!(settings.first_run);
        assert!(settings.needs_setup());
    }

    #[test]
    fn test_load_saved_values() {
        let store = store(json!({
            "name": "Ada",
            "tz": "Europe/London",
            "wx": "London",
            "wx_coords": {"lat": 51.51, "lon": -0.13},
            "wx_label": "London",
            "calIds": ["primary"],
            "firstRun": false
        }));

        let settings = UserSettings::load(&store).unwrap();
        assert_eq!(settings.name, "Ada");
        assert_eq!(settings.location_coords, Some(Coordinate::new(51.51, -0.13)));
        assert_eq!(settings.calendar_ids, vec!["primary"]);
        assert!(!settings.needs_setup());
    }

    #[test]
    fn test_legacy_calendar_ids_adopted() {
        let store = store(json!({"selCalIds": ["a", "b"], "firstRun": false}));
        let settings = UserSettings::load(&store).unwrap();
        assert_eq!(settings.calendar_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_legacy_ignored_when_current_present() {
        let store = store(json!({"calIds": ["new"], "selCalIds": ["old"]}));
        let settings = UserSettings::load(&store).unwrap();
        assert_eq!(settings.calendar_ids, vec!["new"]);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let store = store(json!({"name": 42, "wx_coords": "nowhere", "firstRun": "no"}));
        let settings = UserSettings::load(&store).unwrap();
        assert_eq!(settings.name, "");
        assert_eq!(settings.location_coords, None);
        assert!(settings.first_run);
    }

    #[test]
    fn test_save_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("sync.json"));

        let settings = UserSettings {
            name: "Grace".to_string(),
            timezone: "America/New_York".to_string(),
            location_query: "Arlington".to_string(),
            location_coords: Some(Coordinate::new(38.88, -77.1)),
            location_label: "Arlington, VA".to_string(),
            calendar_ids: vec!["primary".to_string(), "navy".to_string()],
            first_run: false,
        };
        settings.save(&store).unwrap();

        assert_eq!(UserSettings::load(&store).unwrap(), settings);
    }

    #[test]
    fn test_location_settings() {
        let settings = UserSettings {
            location_query: "Paris".to_string(),
            ..Default::default()
        };
        let location = settings.location();
        assert_eq!(location.query, "Paris");
        assert!(location.saved_coords.is_none());
    }
}
