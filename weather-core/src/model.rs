use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// OpenWeather icon code such as `"10d"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconCode(pub String);

impl IconCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self) -> String {
        format!("{ICON_BASE_URL}/{}@2x.png", self.0)
    }
}

impl std::fmt::Display for IconCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Truncate a Celsius reading the way every view displays it: floor, never round.
pub fn floor_celsius(raw: f64) -> i32 {
    raw.floor() as i32
}

/// `"2024-05-01 15:00:00"` → `"15:00"`. The provider's local-time text is trusted verbatim.
pub fn time_of_day(dt_txt: &str) -> Result<String> {
    dt_txt
        .split_once(' ')
        .and_then(|(_, time)| time.get(..5))
        .map(str::to_owned)
        .ok_or_else(|| WeatherError::MalformedTimestamp(dt_txt.to_owned()))
}

// ---------------------------------------------------------------------------
// Upstream payloads (OpenWeather JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportClouds {
    pub all: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportWeather {
    #[serde(default)]
    pub description: String,
    pub icon: String,
}

/// Body of `data/2.5/weather`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentReport {
    pub name: String,
    pub coord: ReportCoord,
    pub sys: ReportSys,
    pub main: ReportMain,
    pub wind: ReportWind,
    pub clouds: ReportClouds,
    pub weather: Vec<ReportWeather>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotMain {
    pub temp: f64,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// One 3-hour entry of `data/2.5/forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSlot {
    pub dt_txt: String,
    pub main: SlotMain,
    #[serde(default)]
    pub pop: f64,
    pub weather: Vec<ReportWeather>,
}

impl ForecastSlot {
    pub(crate) fn icon(&self) -> Result<IconCode> {
        self.weather
            .first()
            .map(|w| IconCode(w.icon.clone()))
            .ok_or(WeatherError::MissingField("list[].weather[0]"))
    }
}

// ---------------------------------------------------------------------------
// Normalized views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: i32,
    pub feels_like_c: i32,
    /// Daily max/min as reported by the instantaneous endpoint.
    pub temp_max_c: i32,
    pub temp_min_c: i32,
    pub humidity_pct: u8,
    pub cloud_cover_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon: IconCode,
}

/// One day of the daily view, read from a single 3-hour slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub temp_max_c: i32,
    pub temp_min_c: i32,
    pub timestamp: String,
    pub icon: IconCode,
}

impl DailyForecastEntry {
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, DT_TXT_FORMAT).ok()
    }
}

/// Exactly five entries; only [`crate::forecast::sample_daily`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastSample {
    entries: Vec<DailyForecastEntry>,
}

impl DailyForecastSample {
    pub(crate) fn new(entries: Vec<DailyForecastEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DailyForecastEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    pub time: String,
    pub temperature_c: i32,
    pub temp_max_c: i32,
    pub temp_min_c: i32,
    /// Probability of precipitation as a 0.0–1.0 fraction.
    pub pop: f64,
    pub icon: IconCode,
}

/// Exactly six entries; only [`crate::hourly::extract_hourly`] builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecastSample {
    entries: Vec<HourlyForecastEntry>,
}

impl HourlyForecastSample {
    pub(crate) fn new(entries: Vec<HourlyForecastEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HourlyForecastEntry] {
        &self.entries
    }
}

/// Everything the presentation layer renders for one resolved location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub location: Location,
    pub current: CurrentConditions,
    pub daily: Option<DailyForecastSample>,
    pub hourly: Option<HourlyForecastSample>,
}
