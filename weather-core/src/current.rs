//! Current conditions: one lookup by place name that also yields the
//! resolved coordinates used by the forecast fetchers.

use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    model::{CurrentConditions, CurrentReport, IconCode, Location, floor_celsius},
    provider::WeatherProvider,
};

/// Fetch and normalize current conditions for `place`.
#[instrument(skip(provider))]
pub async fn fetch_current(
    provider: &dyn WeatherProvider,
    place: &str,
) -> Result<(Location, CurrentConditions)> {
    let report = provider.current_conditions(place).await?;
    let (location, current) = normalize_current(report)?;
    debug!(location = %location, temp = current.temperature_c, "current conditions resolved");
    Ok((location, current))
}

pub fn normalize_current(report: CurrentReport) -> Result<(Location, CurrentConditions)> {
    let weather = report
        .weather
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingField("weather[0]"))?;

    let location = Location {
        latitude: report.coord.lat,
        longitude: report.coord.lon,
        name: report.name,
        country: report.sys.country,
    };

    let current = CurrentConditions {
        temperature_c: floor_celsius(report.main.temp),
        feels_like_c: floor_celsius(report.main.feels_like),
        temp_max_c: floor_celsius(report.main.temp_max),
        temp_min_c: floor_celsius(report.main.temp_min),
        humidity_pct: report.main.humidity,
        cloud_cover_pct: report.clouds.all,
        wind_speed_mps: report.wind.speed,
        description: weather.description,
        icon: IconCode(weather.icon),
    };

    Ok((location, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProvider, report, series};

    #[test]
    fn temperatures_are_floored_not_rounded() {
        let raw = report("Dubai", "AE", 25.07, 55.17, 31.9);
        let (_, current) = normalize_current(raw).unwrap();

        assert_eq!(current.temperature_c, 31);
        // 31.9 - 1.5 = 30.4
        assert_eq!(current.feels_like_c, 30);
        // 31.9 + 2.3 = 34.2
        assert_eq!(current.temp_max_c, 34);
        // 31.9 - 3.8 = 28.1
        assert_eq!(current.temp_min_c, 28);
    }

    #[test]
    fn negative_temperatures_floor_downwards() {
        let raw = report("Ushuaia", "AR", -54.8, -68.3, -0.2);
        let (_, current) = normalize_current(raw).unwrap();
        assert_eq!(current.temperature_c, -1);
    }

    #[test]
    fn location_and_passthrough_fields_are_copied() {
        let raw = report("Tokyo", "JP", 35.69, 139.69, 18.0);
        let (location, current) = normalize_current(raw).unwrap();

        assert_eq!(location.name, "Tokyo");
        assert_eq!(location.country, "JP");
        assert_eq!(location.latitude, 35.69);
        assert_eq!(location.longitude, 139.69);
        assert_eq!(current.humidity_pct, 64);
        assert_eq!(current.cloud_cover_pct, 40);
        assert_eq!(current.wind_speed_mps, 4.12);
        assert_eq!(current.description, "scattered clouds");
        assert_eq!(current.icon.as_str(), "03d");
    }

    #[test]
    fn missing_weather_entry_is_an_error() {
        let mut raw = report("Tokyo", "JP", 35.69, 139.69, 18.0);
        raw.weather.clear();
        let err = normalize_current(raw).unwrap_err();
        assert!(matches!(err, WeatherError::MissingField("weather[0]")));
    }

    #[tokio::test]
    async fn unknown_place_surfaces_provider_error() {
        let provider = FakeProvider::default();
        let err = fetch_current(&provider, "Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn query_is_passed_verbatim() {
        let provider = FakeProvider::default()
            .with_place(report("Cancún", "MX", 21.16, -86.85, 29.0), series(40, 25.0));

        let (location, _) = fetch_current(&provider, "Cancún").await.unwrap();
        assert_eq!(location.name, "Cancún");
        assert_eq!(provider.current_calls(), vec!["Cancún".to_string()]);
    }
}
