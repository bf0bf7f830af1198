//! Picks the location for one render cycle.
//!
//! Order: session override, saved coordinates, typed query. The override is
//! passed in per call and is never written anywhere. Labels resolved from
//! saved coordinates and typed queries are written back to the sync store,
//! except labels that are only a coordinate pair.

use std::sync::Arc;

use tabdeck_core::storage::keys;
use tabdeck_core::{Entries, KeyValueStore};

use crate::geocode::{is_raw_coordinate_label, GeocodingClient};
use crate::types::{Coordinate, LocationSource, ResolvedLocation, SessionOverride, WeatherError};

/// The saved location settings a resolution cycle reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationSettings {
    pub saved_coords: Option<Coordinate>,
    pub saved_label: String,
    pub query: String,
}

pub struct LocationResolver {
    geocoder: GeocodingClient,
    settings: Arc<dyn KeyValueStore>,
}

impl LocationResolver {
    pub fn new(geocoder: GeocodingClient, settings: Arc<dyn KeyValueStore>) -> Self {
        Self { geocoder, settings }
    }

    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    /// `Ok(None)` means nothing is configured, which is a normal empty state.
    /// Errors only come from forward-geocoding a typed query.
    pub async fn resolve(
        &self,
        session_override: Option<&SessionOverride>,
        settings: &LocationSettings,
    ) -> Result<Option<ResolvedLocation>, WeatherError> {
        if let Some(o) = session_override {
            tracing::debug!("Using session location override {:?}", o.label);
            return Ok(Some(ResolvedLocation {
                coordinate: o.coordinate,
                label: o.label.clone(),
                source: LocationSource::SessionOverride,
            }));
        }

        if let Some(coordinate) = settings.saved_coords {
            let mut label = settings.saved_label.clone();
            if label.trim().is_empty() || is_raw_coordinate_label(&label) {
                tracing::debug!("Saved label {:?} needs re-resolving", label);
                label = self.geocoder.reverse_label(coordinate).await;
                self.persist_label(&label, None);
            }

            return Ok(Some(ResolvedLocation {
                coordinate,
                label,
                source: LocationSource::SavedCoordinates,
            }));
        }

        let query = settings.query.trim();
        if !query.is_empty() {
            let place = self.geocoder.geocode(query).await?;
            self.persist_label(&place.label, Some(place.coordinate));

            return Ok(Some(ResolvedLocation {
                coordinate: place.coordinate,
                label: place.label,
                source: LocationSource::TypedQuery,
            }));
        }

        Ok(None)
    }

    /// Write the label (and coordinate) back. A coordinate-shaped label is
    /// never written; the coordinate still is.
    fn persist_label(&self, label: &str, coordinate: Option<Coordinate>) {
        let mut entries = Entries::new();

        if let Some(coordinate) = coordinate {
            match serde_json::to_value(coordinate) {
                Ok(value) => {
                    entries.insert(keys::LOCATION_COORDS.to_string(), value);
                }
                Err(e) => tracing::warn!("Could not encode coordinate: {}", e),
            }
        }

        if is_raw_coordinate_label(label) {
            tracing::debug!("Not persisting placeholder label {:?}", label);
        } else {
            entries.insert(keys::LOCATION_LABEL.to_string(), label.into());
        }

        if entries.is_empty() {
            return;
        }

        match self.settings.set(entries) {
            Ok(()) => tracing::info!("Saved location label {:?}", label),
            Err(e) => tracing::warn!("Failed to save location label: {}", e),
        }
    }
}
