use thiserror::Error;

/// Failures reported by the host when asked for the device position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
}

/// Errors raised while acquiring or normalizing weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to reach OpenWeather ({endpoint}): {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Reverse geocoding returned no place for the given coordinates")]
    EmptyGeocode,

    #[error("OpenWeather response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Forecast series has {actual} entries, at least {needed} are required")]
    SeriesTooShort { needed: usize, actual: usize },

    #[error("Forecast timestamp `{0}` has no time-of-day part")]
    MalformedTimestamp(String),

    #[error("Invalid location query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_too_short_mentions_both_counts() {
        let err = WeatherError::SeriesTooShort { needed: 33, actual: 12 };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("33"));
    }

    #[test]
    fn geolocation_error_converts_transparently() {
        let err: WeatherError = GeolocationError::PermissionDenied.into();
        assert_eq!(err.to_string(), "Location permission denied");
    }
}
