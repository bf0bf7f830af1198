//! Forward and reverse geocoding against the Open-Meteo geocoding API.
//!
//! Labels are always "City, ST" or "City" and never a road. Reverse lookups
//! fall back through three tiers: the nearest named place, the nearest
//! populated place from a search around the point, and finally the raw
//! coordinate itself.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::states::abbreviate_state;
use crate::types::{Coordinate, GeocodedPlace, WeatherError};

const USER_AGENT: &str = concat!("tabdeck/", env!("CARGO_PKG_VERSION"));
const NEAREST_CANDIDATES: u32 = 10;

/// Substrings that mark a place name as a road rather than a locality.
const ROAD_MARKERS: [&str; 13] = [
    "road",
    "rd",
    "street",
    "st",
    "highway",
    "hwy",
    "fm-",
    "farm-to-market",
    "loop",
    "drive",
    "dr",
    "ave",
    "avenue",
];

#[allow(clippy::expect_used)]
static RAW_COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        -?\d{1,3}(?:\.\d+)?   # latitude
        \s*,\s*
        -?\d{1,3}(?:\.\d+)?   # longitude
        \s*$
        ",
    )
    .expect("coordinate pattern is valid")
});

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<Candidate>>,
}

/// One geocoding result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub feature_code: Option<String>,
}

impl Candidate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// "Name, ST", or "Name" when there is no first-level region.
    pub fn label(&self) -> String {
        format_label(&self.name, self.admin1.as_deref())
    }

    fn is_populated_place(&self) -> bool {
        self.feature_code
            .as_deref()
            .is_some_and(|code| code.starts_with("PPL"))
    }
}

pub fn format_label(name: &str, region: Option<&str>) -> String {
    match region.filter(|r| !r.is_empty()) {
        Some(region) => format!("{}, {}", name, abbreviate_state(region)),
        None => name.to_string(),
    }
}

/// True for labels that are just a coordinate pair, e.g. `"30.27, -97.74"`.
pub fn is_raw_coordinate_label(label: &str) -> bool {
    RAW_COORDINATES.is_match(label)
}

/// Case-insensitive substring test against the road markers.
pub fn looks_like_road(name: &str) -> bool {
    let name = name.to_lowercase();
    ROAD_MARKERS.iter().any(|marker| name.contains(marker))
}

fn looks_like_county(admin2: Option<&str>) -> bool {
    admin2.is_some_and(|a| a.to_lowercase().contains("county"))
}

/// Squared flattened distance, good enough for ranking nearby candidates.
pub fn flattened_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlon = (lon1 - lon2) * ((lat1 + lat2) * std::f64::consts::PI / 360.0).cos();
    dlat * dlat + dlon * dlon
}

/// Pick the populated place closest to `origin`, else the first candidate.
pub fn pick_nearest(origin: Coordinate, candidates: &[Candidate]) -> Option<&Candidate> {
    let distance = |c: &Candidate| {
        flattened_distance(origin.latitude, origin.longitude, c.latitude, c.longitude)
    };

    candidates
        .iter()
        .filter(|c| c.is_populated_place())
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        .or_else(|| candidates.first())
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_candidates(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Candidate>, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        Ok(body.results.unwrap_or_default())
    }

    /// Nearest named place to a coordinate (at most one candidate).
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, coord: Coordinate) -> Result<Vec<Candidate>, WeatherError> {
        self.get_candidates(
            "/v1/reverse",
            &[
                ("latitude", coord.latitude.to_string()),
                ("longitude", coord.longitude.to_string()),
                ("count", "1".to_string()),
                ("language", "en".to_string()),
            ],
        )
        .await
    }

    /// Up to ten places around a coordinate.
    #[instrument(skip(self), level = "debug")]
    pub async fn search_near(&self, coord: Coordinate) -> Result<Vec<Candidate>, WeatherError> {
        self.get_candidates(
            "/v1/search",
            &[
                ("latitude", coord.latitude.to_string()),
                ("longitude", coord.longitude.to_string()),
                ("count", NEAREST_CANDIDATES.to_string()),
                ("language", "en".to_string()),
            ],
        )
        .await
    }

    /// Free-text search, best match only.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, name: &str) -> Result<Vec<Candidate>, WeatherError> {
        self.get_candidates(
            "/v1/search",
            &[
                ("name", name.to_string()),
                ("count", "1".to_string()),
                ("language", "en".to_string()),
            ],
        )
        .await
    }

    /// Forward geocode free text to a coordinate and label.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, query: &str) -> Result<GeocodedPlace, WeatherError> {
        let candidate = self
            .search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NoMatch(query.to_string()))?;

        Ok(GeocodedPlace {
            coordinate: candidate.coordinate(),
            label: candidate.label(),
        })
    }

    /// Populated place nearest to the coordinate.
    pub async fn nearest_city(&self, coord: Coordinate) -> Result<String, WeatherError> {
        let candidates = self.search_near(coord).await?;
        pick_nearest(coord, &candidates)
            .filter(|c| !c.name.is_empty())
            .map(Candidate::label)
            .ok_or_else(|| WeatherError::NoMatch(coord.display_label()))
    }

    /// Display label for a coordinate. Never fails: network errors fall
    /// through to the next tier and the last tier is the coordinate itself.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_label(&self, coord: Coordinate) -> String {
        match self.reverse(coord).await {
            Ok(results) => match results.into_iter().next() {
                Some(place) if !place.name.is_empty() => {
                    if !looks_like_road(&place.name) && !looks_like_county(place.admin2.as_deref())
                    {
                        return place.label();
                    }
                    tracing::debug!("Reverse result {:?} is not a locality", place.name);
                }
                _ => tracing::debug!("Reverse lookup returned no named place"),
            },
            Err(e) => tracing::debug!("Reverse lookup failed: {}", e),
        }

        match self.nearest_city(coord).await {
            Ok(label) => return label,
            Err(e) => tracing::debug!("Nearest city search failed: {}", e),
        }

        tracing::warn!("Falling back to coordinates for location label");
        coord.display_label()
    }
}
