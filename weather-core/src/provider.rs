use crate::{
    Config,
    error::Result,
    model::{Coordinates, CurrentReport, ForecastSlot, GeocodeHit},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The three upstream calls the pipeline depends on.
///
/// Payloads are returned as the provider shapes them; normalization happens
/// in the fetchers.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Reverse geocoding; the provider may return several candidates.
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<GeocodeHit>>;

    async fn current_conditions(&self, place: &str) -> Result<CurrentReport>;

    /// Full 3-hour-cadence series for the coordinates.
    async fn forecast_series(&self, coords: Coordinates) -> Result<Vec<ForecastSlot>>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::new(api_key.to_owned()).with_base_url(config.base_url());

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
