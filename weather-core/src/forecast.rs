//! Five-day view sampled from the 3-hour forecast series.
//!
//! Each day is a single slot, eight steps (24h) apart, starting at the next
//! slot. Max/min come from that one slot; they are not aggregated over the
//! day. Keep the fixed indices: consumers compare against this exact sampling.

use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, DailyForecastEntry, DailyForecastSample, ForecastSlot, floor_celsius},
    provider::WeatherProvider,
};

/// Series indices read for the daily view: next slot, then +24h … +96h.
pub const DAILY_SAMPLE_INDICES: [usize; 5] = [0, 8, 16, 24, 32];

/// Shortest series from which every daily index can be read.
pub const MIN_DAILY_SERIES_LEN: usize = 33;

#[instrument(skip(provider))]
pub async fn fetch_daily(
    provider: &dyn WeatherProvider,
    coords: Coordinates,
) -> Result<DailyForecastSample> {
    let series = provider.forecast_series(coords).await?;
    debug!(len = series.len(), "forecast series received for daily sampling");
    sample_daily(&series)
}

/// Build the daily view; fails instead of returning a partial sample.
pub fn sample_daily(series: &[ForecastSlot]) -> Result<DailyForecastSample> {
    if series.len() < MIN_DAILY_SERIES_LEN {
        return Err(WeatherError::SeriesTooShort {
            needed: MIN_DAILY_SERIES_LEN,
            actual: series.len(),
        });
    }

    let entries = DAILY_SAMPLE_INDICES
        .iter()
        .map(|&idx| {
            let slot = &series[idx];
            Ok(DailyForecastEntry {
                temp_max_c: floor_celsius(slot.main.temp_max),
                temp_min_c: floor_celsius(slot.main.temp_min),
                timestamp: slot.dt_txt.clone(),
                icon: slot.icon()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DailyForecastSample::new(entries))
}
