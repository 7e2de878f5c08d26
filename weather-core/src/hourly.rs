//! Near-term view: the first six 3-hour slots (~18 hours).

use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    model::{
        Coordinates, ForecastSlot, HourlyForecastEntry, HourlyForecastSample, floor_celsius,
        time_of_day,
    },
    provider::WeatherProvider,
};

pub const HOURLY_SAMPLE_LEN: usize = 6;

/// Issues its own forecast request; the daily sampler's response is not reused.
#[instrument(skip(provider))]
pub async fn fetch_hourly(
    provider: &dyn WeatherProvider,
    coords: Coordinates,
) -> Result<HourlyForecastSample> {
    let series = provider.forecast_series(coords).await?;
    debug!(len = series.len(), "forecast series received for hourly extraction");
    extract_hourly(&series)
}

pub fn extract_hourly(series: &[ForecastSlot]) -> Result<HourlyForecastSample> {
    if series.len() < HOURLY_SAMPLE_LEN {
        return Err(WeatherError::SeriesTooShort {
            needed: HOURLY_SAMPLE_LEN,
            actual: series.len(),
        });
    }

    let entries = series[..HOURLY_SAMPLE_LEN]
        .iter()
        .map(|slot| {
            Ok(HourlyForecastEntry {
                time: time_of_day(&slot.dt_txt)?,
                temperature_c: floor_celsius(slot.main.temp),
                temp_max_c: floor_celsius(slot.main.temp_max),
                temp_min_c: floor_celsius(slot.main.temp_min),
                pop: slot.pop,
                icon: slot.icon()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(HourlyForecastSample::new(entries))
}
