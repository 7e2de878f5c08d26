use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::DEFAULT_BASE_URL,
    error::{Result, WeatherError},
    model::{Coordinates, CurrentReport, ForecastSlot, GeocodeHit},
};

use super::WeatherProvider;

const GEOCODE_PATH: &str = "/geo/1.0/reverse";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
/// Descriptions come back in the app's single display locale.
pub const LANG: &str = "en";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint, %url, "sending OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| WeatherError::Http { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Http { endpoint, source })?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<ForecastSlot>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<GeocodeHit>> {
        self.get_json(
            "reverse geocoding",
            GEOCODE_PATH,
            &[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn current_conditions(&self, place: &str) -> Result<CurrentReport> {
        self.get_json(
            "current weather",
            CURRENT_PATH,
            &[
                ("q", place.to_string()),
                ("units", "metric".to_string()),
                ("lang", LANG.to_string()),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn forecast_series(&self, coords: Coordinates) -> Result<Vec<ForecastSlot>> {
        let parsed: OwForecastResponse = self
            .get_json(
                "forecast",
                FORECAST_PATH,
                &[
                    ("lat", coords.latitude.to_string()),
                    ("lon", coords.longitude.to_string()),
                    ("units", "metric".to_string()),
                    ("lang", LANG.to_string()),
                ],
            )
            .await?;

        Ok(parsed.list)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
