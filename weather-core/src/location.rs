//! Turning user input or a device position into a place name the
//! current-conditions lookup accepts.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, info, instrument};

use crate::{
    error::{GeolocationError, Result, WeatherError},
    model::Coordinates,
    provider::WeatherProvider,
};

/// Longest query the search box accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 20;

/// Host seam for the device's geoposition.
#[async_trait]
pub trait DeviceLocator: Send + Sync + Debug {
    async fn current_position(&self) -> std::result::Result<Coordinates, GeolocationError>;
}

/// A locator whose answer is known up front (CLI flags, tests).
#[derive(Debug, Clone, PartialEq)]
pub struct StaticLocator(pub std::result::Result<Coordinates, GeolocationError>);

impl StaticLocator {
    pub fn granted(coords: Coordinates) -> Self {
        Self(Ok(coords))
    }

    pub fn denied() -> Self {
        Self(Err(GeolocationError::PermissionDenied))
    }
}

#[async_trait]
impl DeviceLocator for StaticLocator {
    async fn current_position(&self) -> std::result::Result<Coordinates, GeolocationError> {
        self.0.clone()
    }
}

/// Reject empty or over-long queries. The text itself is forwarded untouched;
/// the provider does its own fuzzy matching.
pub fn validate_query(query: &str) -> Result<&str> {
    if query.is_empty() {
        return Err(WeatherError::InvalidQuery("query is empty".to_string()));
    }
    let chars = query.chars().count();
    if chars > MAX_QUERY_CHARS {
        return Err(WeatherError::InvalidQuery(format!(
            "query has {chars} characters, at most {MAX_QUERY_CHARS} are allowed"
        )));
    }
    Ok(query)
}

/// Where the device flow ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePlace {
    /// Reverse-geocoded from the device position.
    Resolved(String),
    /// Permission was denied; the configured default place is used instead.
    Fallback(String),
}

impl DevicePlace {
    pub fn name(&self) -> &str {
        match self {
            DevicePlace::Resolved(name) | DevicePlace::Fallback(name) => name,
        }
    }
}

/// Ask the host for a position and reverse-geocode it to a place name.
///
/// Only `PermissionDenied` falls back to `fallback`; every other geolocation
/// failure is returned to the caller.
#[instrument(skip(provider, locator))]
pub async fn resolve_device_place(
    provider: &dyn WeatherProvider,
    locator: &dyn DeviceLocator,
    fallback: &str,
) -> Result<DevicePlace> {
    let coords = match locator.current_position().await {
        Ok(coords) => coords,
        Err(GeolocationError::PermissionDenied) => {
            info!(fallback, "location permission denied, using default place");
            return Ok(DevicePlace::Fallback(fallback.to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    debug!(lat = coords.latitude, lon = coords.longitude, "device position acquired");

    let hit = provider
        .reverse_geocode(coords)
        .await?
        .into_iter()
        .next()
        .ok_or(WeatherError::EmptyGeocode)?;

    Ok(DevicePlace::Resolved(hit.name))
}

/// A one-click search preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularLocation {
    pub label: &'static str,
    pub query: &'static str,
}

pub const POPULAR_LOCATIONS: [PopularLocation; 5] = [
    PopularLocation { label: "Buenos Aires, AR", query: "Buenos Aires" },
    PopularLocation { label: "London, GB", query: "London" },
    PopularLocation { label: "Dubai, AE", query: "Dubai" },
    PopularLocation { label: "Tokyo, JP", query: "Tokyo" },
    PopularLocation { label: "Cancún, MX", query: "Cancún" },
];

/// Case-insensitive prefix match against the preset labels.
pub fn find_popular(name: &str) -> Option<&'static PopularLocation> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    POPULAR_LOCATIONS
        .iter()
        .find(|preset| preset.label.to_lowercase().starts_with(&needle))
}
