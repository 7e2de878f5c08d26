//! Plain-text rendering of the pipeline views.

use std::fmt;

use chrono::NaiveDateTime;
use weather_core::{
    CurrentConditions, DailyForecastSample, HourlyForecastSample, Location, PopularLocation,
    WeatherView,
};

/// A resolved view as printed by `search`, `locate` and `popular <name>`.
pub struct WeatherReport<'a> {
    pub view: &'a WeatherView,
    /// Shown in the header; the views carry no fetch time of their own.
    pub now: NaiveDateTime,
}

impl fmt::Display for WeatherReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        current_section(f, &self.view.location, &self.view.current, self.now)?;

        if let Some(hourly) = &self.view.hourly {
            writeln!(f)?;
            hourly_section(f, hourly)?;
        }

        if let Some(daily) = &self.view.daily {
            writeln!(f)?;
            daily_section(f, daily)?;
        }

        Ok(())
    }
}

fn current_section(
    f: &mut fmt::Formatter<'_>,
    location: &Location,
    current: &CurrentConditions,
    now: NaiveDateTime,
) -> fmt::Result {
    writeln!(f, "Weather in {location} - {}", now.format("%d/%m/%Y %H:%M"))?;
    writeln!(f, "  State:       {}", current.description)?;
    writeln!(
        f,
        "  Temperature: {}°C (feels like {}°C)",
        current.temperature_c, current.feels_like_c
    )?;
    writeln!(
        f,
        "  Max / Min:   {}°C / {}°C",
        current.temp_max_c, current.temp_min_c
    )?;
    writeln!(f, "  Humidity:    {}%", current.humidity_pct)?;
    writeln!(f, "  Cloud cover: {}%", current.cloud_cover_pct)?;
    writeln!(f, "  Wind:        {} m/s", current.wind_speed_mps)?;
    writeln!(f, "  Icon:        {}", current.icon.url())
}

fn hourly_section(f: &mut fmt::Formatter<'_>, hourly: &HourlyForecastSample) -> fmt::Result {
    writeln!(f, "Next hours")?;
    for entry in hourly.entries() {
        writeln!(
            f,
            "  {}  {:>3}°C  max {}°C / min {}°C  rain {}  {}",
            entry.time,
            entry.temperature_c,
            entry.temp_max_c,
            entry.temp_min_c,
            percent(entry.pop),
            entry.icon.url()
        )?;
    }
    Ok(())
}

fn daily_section(f: &mut fmt::Formatter<'_>, daily: &DailyForecastSample) -> fmt::Result {
    writeln!(f, "Next 5 days")?;
    for entry in daily.entries() {
        let label = entry
            .parsed_timestamp()
            .map(|ts| ts.format("%a %d/%m %H:%M").to_string())
            .unwrap_or_else(|| entry.timestamp.clone());
        writeln!(
            f,
            "  {label}  max {}°C  min {}°C  {}",
            entry.temp_max_c,
            entry.temp_min_c,
            entry.icon.url()
        )?;
    }
    Ok(())
}

/// The preset list printed by a bare `weather popular`.
pub struct PopularList<'a>(pub &'a [PopularLocation]);

impl fmt::Display for PopularList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Popular locations:")?;
        for preset in self.0 {
            writeln!(f, "  {}", preset.label)?;
        }
        Ok(())
    }
}

/// `pop` arrives as a 0–1 fraction.
fn percent(pop: f64) -> String {
    format!("{:.0}%", pop * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use weather_core::{
        IconCode, POPULAR_LOCATIONS, forecast::sample_daily, hourly::extract_hourly,
        model::ForecastSlot,
    };

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .expect("valid date")
    }

    fn view() -> WeatherView {
        WeatherView {
            location: Location {
                latitude: -34.92,
                longitude: -57.95,
                name: "La Plata".into(),
                country: "AR".into(),
            },
            current: CurrentConditions {
                temperature_c: 17,
                feels_like_c: 16,
                temp_max_c: 18,
                temp_min_c: 12,
                humidity_pct: 66,
                cloud_cover_pct: 40,
                wind_speed_mps: 3.6,
                description: "scattered clouds".into(),
                icon: IconCode("03d".into()),
            },
            daily: None,
            hourly: None,
        }
    }

    /// 33 provider slots from 2024-05-01 15:00; slot 8 has an unparseable timestamp.
    fn slots() -> Vec<ForecastSlot> {
        let start = now().date().and_hms_opt(15, 0, 0).expect("valid time");
        (0..33i64)
            .map(|i| {
                let dt_txt = match i {
                    8 => "soon".to_string(),
                    _ => (start + Duration::hours(3 * i))
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                };
                let (temp, temp_max, temp_min, pop, icon) = match i {
                    0 => (14.2, 15.3, 13.9, 0.4, "10n"),
                    8 => (5.0, 9.4, 2.8, 0.0, "13d"),
                    _ => (10.5, 11.5, 9.5, 0.1, "01d"),
                };
                serde_json::from_value(serde_json::json!({
                    "dt_txt": dt_txt,
                    "main": { "temp": temp, "temp_max": temp_max, "temp_min": temp_min },
                    "pop": pop,
                    "weather": [{ "description": "", "icon": icon }]
                }))
                .expect("forecast slot fixture")
            })
            .collect()
    }

    #[test]
    fn current_section_has_header_and_fields() {
        let view = view();
        let text = WeatherReport { view: &view, now: now() }.to_string();
        assert!(text.starts_with("Weather in La Plata, AR - 01/05/2024 14:05\n"));
        assert!(text.contains("Temperature: 17°C (feels like 16°C)"));
        assert!(text.contains("Wind:        3.6 m/s"));
        assert!(text.contains("https://openweathermap.org/img/wn/03d@2x.png"));
        assert!(!text.contains("Next hours"));
        assert!(!text.contains("Next 5 days"));
    }

    #[test]
    fn forecast_sections_follow_current_conditions() {
        let raw = slots();
        let mut view = view();
        view.hourly = Some(extract_hourly(&raw).expect("hourly sample"));
        view.daily = Some(sample_daily(&raw).expect("daily sample"));

        let text = WeatherReport { view: &view, now: now() }.to_string();
        let hours = text.find("Next hours").expect("hourly section");
        let days = text.find("Next 5 days").expect("daily section");
        assert!(hours < days);

        assert!(text.contains("15:00   14°C  max 15°C / min 13°C  rain 40%"));
        assert!(text.contains("Wed 01/05 15:00  max 15°C  min 13°C"));
        assert!(text.contains("soon  max 9°C  min 2°C"));

        let hourly_lines = text[hours..days].lines().filter(|l| l.contains("rain")).count();
        let daily_lines = text[days..].lines().skip(1).count();
        assert_eq!((hourly_lines, daily_lines), (6, 5));
    }

    #[test]
    fn pop_is_shown_as_percentage() {
        assert_eq!(percent(0.0), "0%");
        assert_eq!(percent(0.25), "25%");
        assert_eq!(percent(1.0), "100%");
    }

    #[test]
    fn popular_list_names_every_preset() {
        let text = PopularList(&POPULAR_LOCATIONS).to_string();
        assert!(text.contains("Buenos Aires, AR"));
        assert!(text.contains("Cancún, MX"));
        assert_eq!(text.lines().count(), 1 + POPULAR_LOCATIONS.len());
    }
}
