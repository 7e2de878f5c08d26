//! Pipeline controller: location → current conditions → daily + hourly.
//!
//! Each entry point runs one explicit async pipeline and returns the record
//! it assembled. Progress is published as it lands: the shared
//! [`PipelineState`] through a `watch` channel, alerts and input-clearing
//! through an unbounded `mpsc` channel.
//!
//! Overlapping runs are not cancelled. Location and current conditions are
//! applied when their fetch completes, so the last response to arrive wins;
//! daily and hourly samples only land on the view of the run that fetched
//! them.

use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::{
    current::fetch_current,
    error::{Result, WeatherError},
    forecast::fetch_daily,
    hourly::fetch_hourly,
    location::{DeviceLocator, DevicePlace, resolve_device_place, validate_query},
    model::{CurrentConditions, DailyForecastSample, HourlyForecastSample, Location, WeatherView},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Resolving,
    Loaded,
}

/// What the presentation layer renders. Failures never move it backwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PipelineState {
    pub phase: Phase,
    pub view: Option<WeatherView>,
}

/// Blocking user notices. Messages are static; causes go to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    IncorrectData,
    ForecastUnavailable,
    HourlyUnavailable,
    LocationPermissionDenied,
    LocationUnavailable,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::IncorrectData => "Incorrect data",
            Alert::ForecastUnavailable => "Forecast error",
            Alert::HourlyUnavailable => "Incorrect hourly data",
            Alert::LocationPermissionDenied => "Location permission denied by the user.",
            Alert::LocationUnavailable => "Could not determine the device location.",
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Alert(Alert),
    /// The search input can be emptied.
    ClearInput,
}

/// Receiving ends handed to the presentation layer.
#[derive(Debug)]
pub struct PipelineHandles {
    pub state: watch::Receiver<PipelineState>,
    pub events: mpsc::UnboundedReceiver<PipelineEvent>,
}

#[derive(Debug)]
struct Inner {
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn DeviceLocator>,
    default_location: String,
    state: watch::Sender<PipelineState>,
    events: mpsc::UnboundedSender<PipelineEvent>,
    /// Runs still waiting on location resolution or current conditions.
    pending: AtomicUsize,
}

/// Cheap to clone; clones share state and channels.
#[derive(Debug, Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn DeviceLocator>,
        default_location: impl Into<String>,
    ) -> (Self, PipelineHandles) {
        let (state_tx, state_rx) = watch::channel(PipelineState::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let pipeline = Self {
            inner: Arc::new(Inner {
                provider,
                locator,
                default_location: default_location.into(),
                state: state_tx,
                events: events_tx,
                pending: AtomicUsize::new(0),
            }),
        };

        let handles = PipelineHandles {
            state: state_rx,
            events: events_rx,
        };

        (pipeline, handles)
    }

    /// Snapshot of the currently published state.
    pub fn state(&self) -> PipelineState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.inner.state.subscribe()
    }

    pub fn default_location(&self) -> &str {
        &self.inner.default_location
    }

    /// Explicit search. Invalid queries are rejected before any state change.
    pub async fn search_by_location_name(&self, query: &str) -> Result<WeatherView> {
        if let Err(err) = validate_query(query) {
            warn!(%err, "rejecting search query");
            self.alert(Alert::IncorrectData);
            return Err(err);
        }

        self.begin_resolving();
        self.run(query).await
    }

    /// Device flow. Permission denial searches the default place instead.
    pub async fn request_device_location(&self) -> Result<WeatherView> {
        self.begin_resolving();

        let place = resolve_device_place(
            self.inner.provider.as_ref(),
            self.inner.locator.as_ref(),
            &self.inner.default_location,
        )
        .await;

        let place = match place {
            Ok(place) => place,
            Err(err) => {
                self.finish_resolving(None);
                let alert = match err {
                    WeatherError::Geolocation(_) => Alert::LocationUnavailable,
                    _ => Alert::IncorrectData,
                };
                warn!(%err, "device location could not be resolved");
                self.alert(alert);
                return Err(err);
            }
        };

        if let DevicePlace::Fallback(_) = place {
            self.alert(Alert::LocationPermissionDenied);
        }

        self.run(place.name()).await
    }

    async fn run(&self, place: &str) -> Result<WeatherView> {
        let (location, current) = match fetch_current(self.inner.provider.as_ref(), place).await
        {
            Ok(resolved) => resolved,
            Err(err) => {
                self.finish_resolving(None);
                warn!(%err, place, "current conditions lookup failed");
                self.alert(Alert::IncorrectData);
                return Err(err);
            }
        };

        info!(location = %location, "location resolved");
        self.finish_resolving(Some((location.clone(), current.clone())));
        self.emit(PipelineEvent::ClearInput);

        let (daily, hourly) =
            tokio::join!(self.load_daily(&location), self.load_hourly(&location));

        Ok(WeatherView {
            location,
            current,
            daily,
            hourly,
        })
    }

    async fn load_daily(&self, location: &Location) -> Option<DailyForecastSample> {
        match fetch_daily(self.inner.provider.as_ref(), location.coordinates()).await {
            Ok(daily) => {
                self.update_view(location, |view| view.daily = Some(daily.clone()));
                Some(daily)
            }
            Err(err) => {
                error!(%err, "failed to load daily forecast");
                self.alert(Alert::ForecastUnavailable);
                None
            }
        }
    }

    async fn load_hourly(&self, location: &Location) -> Option<HourlyForecastSample> {
        match fetch_hourly(self.inner.provider.as_ref(), location.coordinates()).await {
            Ok(hourly) => {
                self.update_view(location, |view| view.hourly = Some(hourly.clone()));
                self.emit(PipelineEvent::ClearInput);
                Some(hourly)
            }
            Err(err) => {
                error!(%err, "failed to load hourly forecast");
                self.alert(Alert::HourlyUnavailable);
                None
            }
        }
    }

    fn begin_resolving(&self) {
        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        self.inner
            .state
            .send_modify(|state| state.phase = Phase::Resolving);
    }

    /// Close one resolving run; on success the location and current
    /// conditions replace the previous ones, other samples stay until their
    /// own fetch succeeds.
    fn finish_resolving(&self, resolved: Option<(Location, CurrentConditions)>) {
        let still_pending = self
            .inner
            .pending
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);

        self.inner.state.send_modify(|state| {
            if let Some((location, current)) = resolved {
                match state.view.as_mut() {
                    Some(view) => {
                        view.location = location;
                        view.current = current;
                    }
                    None => {
                        state.view = Some(WeatherView {
                            location,
                            current,
                            daily: None,
                            hourly: None,
                        });
                    }
                }
            }

            state.phase = if still_pending > 0 {
                Phase::Resolving
            } else if state.view.is_some() {
                Phase::Loaded
            } else {
                Phase::Idle
            };
        });
    }

    /// Apply a sample only while its run's location is still the one shown;
    /// a sample from a superseded run is dropped.
    fn update_view(&self, owner: &Location, apply: impl FnOnce(&mut WeatherView)) {
        self.inner.state.send_modify(|state| match state.view.as_mut() {
            Some(view) if view.location == *owner => apply(view),
            _ => debug!(location = %owner, "dropping sample for superseded location"),
        });
    }

    fn alert(&self, alert: Alert) {
        self.emit(PipelineEvent::Alert(alert));
    }

    fn emit(&self, event: PipelineEvent) {
        // Nobody listening is fine: the front end may have shut down.
        let _ = self.inner.events.send(event);
    }
}
