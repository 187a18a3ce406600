use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use csv_weather_core::{
    Config, ProviderId, collect_observations, merge,
    provider::{default_provider_from_config, provider_from_config, today},
    read_locations, write_report,
};
use inquire::{Confirm, Password};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "csv-weather", version, about = "Enrich a CSV list of cities with weather data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Build a weather report for every city in the input file.
    Report {
        /// Input CSV file path. Format, no header: City Name,Area
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV file path. Columns: name,area,temperatureC,humidity,windSpeed,pressure
        #[arg(short, long)]
        output: PathBuf,

        /// The date to report the weather for (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Report { input, output, date, provider } => {
                report(&input, &output, date.as_deref(), provider.as_deref()).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if config.default_provider.as_deref() != Some(id.as_str()) {
        let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    let path = config.save()?;
    println!("Saved {id} configuration to {}", path.display());
    Ok(())
}

async fn report(
    input: &Path,
    output: &Path,
    date: Option<&str>,
    provider: Option<&str>,
) -> anyhow::Result<()> {
    ensure_input_exists(input)?;
    ensure_output_creatable(output)?;
    let date = parse_date(date)?;

    let config = Config::load()?;
    let provider = match provider {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, &config)?,
        None => default_provider_from_config(&config)?,
    };

    let locations = read_locations(input)?;
    info!(count = locations.len(), %date, "Fetching weather");

    let observations = collect_observations(provider.as_ref(), &locations, date).await?;
    let rows = merge(&observations);
    write_report(&rows, output)?;

    println!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

/// Parse a `YYYY-MM-DD` date; no date means today, on the providers' UTC clock.
pub fn parse_date(date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}', expected format YYYY-MM-DD")),
        None => Ok(today()),
    }
}

pub fn ensure_input_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(anyhow!("Input file does not exist: {}", path.display()));
    }
    Ok(())
}

/// Create the output file if needed so a bad path fails before any network call.
///
/// Existing contents are left alone; they are replaced only once the report is written.
pub fn ensure_output_creatable(path: &Path) -> anyhow::Result<()> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("Cannot create output file: {}", path.display()))?;
    Ok(())
}
