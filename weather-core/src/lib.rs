//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its upstream payload types
//! - Location resolution (search text or device position)
//! - Normalization into current, daily and hourly views
//! - The pipeline controller that sequences them and publishes state
//!
//! It is used by `weather-cli`, but can also be driven by any other front end
//! that consumes [`PipelineState`] and [`PipelineEvent`].

pub mod config;
pub mod current;
pub mod error;
pub mod forecast;
pub mod hourly;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{GeolocationError, WeatherError};
pub use location::{DeviceLocator, POPULAR_LOCATIONS, PopularLocation, StaticLocator};
pub use model::{
    Coordinates, CurrentConditions, DailyForecastEntry, DailyForecastSample, HourlyForecastEntry,
    HourlyForecastSample, IconCode, Location, WeatherView,
};
pub use pipeline::{Alert, Phase, Pipeline, PipelineEvent, PipelineHandles, PipelineState};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
