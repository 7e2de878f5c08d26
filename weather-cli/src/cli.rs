use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Text};
use tracing::debug;
use weather_core::{
    Config, Coordinates, POPULAR_LOCATIONS, Pipeline, PipelineEvent, PipelineHandles,
    StaticLocator, WeatherView, location::find_popular, provider_from_config,
};

use crate::render::{PopularList, WeatherReport};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Print the resulting state as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default location.
    Configure,

    /// Show weather for a place name.
    Search {
        /// Place name, at most 20 characters.
        place: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show weather for the device position.
    ///
    /// Without coordinates the position is treated as denied and the
    /// configured default location is shown instead.
    Locate {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List popular locations, or show weather for one of them.
    Popular {
        /// Prefix of a popular location label, e.g. "tok".
        name: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { place, output } => {
                let (pipeline, handles) = build_pipeline(StaticLocator::denied())?;
                let result = pipeline.search_by_location_name(&place).await;
                present(&pipeline, handles, result, &output)
            }
            Command::Locate { lat, lon, output } => {
                let locator = match (lat, lon) {
                    (Some(lat), Some(lon)) => StaticLocator::granted(Coordinates::new(lat, lon)),
                    _ => StaticLocator::denied(),
                };
                let (pipeline, handles) = build_pipeline(locator)?;
                let result = pipeline.request_device_location().await;
                present(&pipeline, handles, result, &output)
            }
            Command::Popular { name: None, .. } => {
                print!("{}", PopularList(&POPULAR_LOCATIONS));
                Ok(())
            }
            Command::Popular {
                name: Some(name),
                output,
            } => {
                let Some(preset) = find_popular(&name) else {
                    bail!(
                        "Unknown popular location '{name}'.\n\
                         Hint: run `weather popular` to list them."
                    );
                };
                let (pipeline, handles) = build_pipeline(StaticLocator::denied())?;
                let result = pipeline.search_by_location_name(preset.query).await;
                present(&pipeline, handles, result, &output)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    // Read the file alone so an env override is never written back.
    let mut cfg = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    cfg.set_api_key(api_key.trim().to_string());

    let default_location = Text::new("Default location (used when the position is denied):")
        .with_default(cfg.default_location())
        .prompt()
        .context("Failed to read default location")?;
    cfg.default_location = Some(default_location);

    cfg.save_to(&path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn build_pipeline(locator: StaticLocator) -> anyhow::Result<(Pipeline, PipelineHandles)> {
    let cfg = Config::load()?;
    let provider = provider_from_config(&cfg)?;
    Ok(Pipeline::new(
        provider,
        Arc::new(locator),
        cfg.default_location().to_string(),
    ))
}

fn present(
    pipeline: &Pipeline,
    mut handles: PipelineHandles,
    result: Result<WeatherView, weather_core::WeatherError>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    while let Ok(event) = handles.events.try_recv() {
        match event {
            PipelineEvent::Alert(alert) => eprintln!("! {alert}"),
            PipelineEvent::ClearInput => debug!("input cleared"),
        }
    }

    let state = pipeline.state();
    if output.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&state).context("Failed to serialize state to JSON")?
        );
    } else if let Some(view) = &state.view {
        let now = chrono::Local::now().naive_local();
        print!("{}", WeatherReport { view, now });
    }

    result.map(|_| ()).map_err(anyhow::Error::from)
}
