//! Scripted provider and payload builders shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    error::{Result, WeatherError},
    model::{
        Coordinates, CurrentReport, ForecastSlot, GeocodeHit, ReportClouds, ReportCoord,
        ReportMain, ReportSys, ReportWeather, ReportWind, SlotMain,
    },
    provider::WeatherProvider,
};

pub(crate) fn report(name: &str, country: &str, lat: f64, lon: f64, temp: f64) -> CurrentReport {
    CurrentReport {
        name: name.to_string(),
        coord: ReportCoord { lat, lon },
        sys: ReportSys { country: country.to_string() },
        main: ReportMain {
            temp,
            feels_like: temp - 1.5,
            temp_max: temp + 2.3,
            temp_min: temp - 3.8,
            humidity: 64,
        },
        wind: ReportWind { speed: 4.12 },
        clouds: ReportClouds { all: 40 },
        weather: vec![ReportWeather {
            description: "scattered clouds".to_string(),
            icon: "03d".to_string(),
        }],
    }
}

/// `len` slots three hours apart starting at midnight; slot `i` reads `base + i + 0.7`.
pub(crate) fn series(len: usize, base: f64) -> Vec<ForecastSlot> {
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    (0..len)
        .map(|i| {
            let at = start + chrono::Duration::hours(3 * i as i64);
            let temp = base + i as f64 + 0.7;
            ForecastSlot {
                dt_txt: at.format("%Y-%m-%d %H:%M:%S").to_string(),
                main: SlotMain {
                    temp,
                    temp_max: temp + 1.0,
                    temp_min: temp - 1.0,
                },
                pop: (i % 10) as f64 / 10.0,
                weather: vec![ReportWeather {
                    description: String::new(),
                    icon: format!("{:02}d", i % 50),
                }],
            }
        })
        .collect()
}

fn coord_key(coords: Coordinates) -> String {
    format!("{:.4},{:.4}", coords.latitude, coords.longitude)
}

fn not_found(endpoint: &'static str) -> WeatherError {
    WeatherError::Status {
        endpoint,
        status: 404,
        body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    current: HashMap<String, CurrentReport>,
    current_delay: HashMap<String, Duration>,
    forecast_delay: HashMap<String, Duration>,
    series: HashMap<String, Vec<ForecastSlot>>,
    geocode: Vec<GeocodeHit>,
    forecast_calls: AtomicUsize,
    current_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub(crate) fn with_place(mut self, report: CurrentReport, series: Vec<ForecastSlot>) -> Self {
        let key = coord_key(Coordinates::new(report.coord.lat, report.coord.lon));
        self.series.insert(key, series);
        self.current.insert(report.name.clone(), report);
        self
    }

    /// Known place whose forecast endpoint answers 404.
    pub(crate) fn with_current_only(mut self, report: CurrentReport) -> Self {
        self.current.insert(report.name.clone(), report);
        self
    }

    pub(crate) fn with_delay(mut self, place: &str, delay: Duration) -> Self {
        self.current_delay.insert(place.to_string(), delay);
        self
    }

    /// Holds back the forecast endpoint for the place at `coords`.
    pub(crate) fn with_forecast_delay(mut self, coords: Coordinates, delay: Duration) -> Self {
        self.forecast_delay.insert(coord_key(coords), delay);
        self
    }

    pub(crate) fn with_geocode(mut self, name: &str, coords: Coordinates) -> Self {
        self.geocode.push(GeocodeHit {
            name: name.to_string(),
            country: None,
            lat: coords.latitude,
            lon: coords.longitude,
        });
        self
    }

    pub(crate) fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn current_calls(&self) -> Vec<String> {
        self.current_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn reverse_geocode(&self, _coords: Coordinates) -> Result<Vec<GeocodeHit>> {
        Ok(self.geocode.clone())
    }

    async fn current_conditions(&self, place: &str) -> Result<CurrentReport> {
        if let Ok(mut calls) = self.current_calls.lock() {
            calls.push(place.to_string());
        }
        if let Some(delay) = self.current_delay.get(place) {
            tokio::time::sleep(*delay).await;
        }
        self.current
            .get(place)
            .cloned()
            .ok_or_else(|| not_found("current weather"))
    }

    async fn forecast_series(&self, coords: Coordinates) -> Result<Vec<ForecastSlot>> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        let key = coord_key(coords);
        if let Some(delay) = self.forecast_delay.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        self.series
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found("forecast"))
    }
}
