use std::time::Duration as StdDuration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{CustomType, CustomUserError, Password, Text, validator::Validation};
use skywatch_core::{
    Config, CycleReport, Session, StationSettings, config::MAX_REFRESH_INTERVAL_SECS,
    provider_from_config,
};
use tokio::time::{Interval, MissedTickBehavior};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skywatch",
    version,
    about = "Live station weather and launch conditions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set API key, location, refresh interval and timezone.
    Configure,

    /// Fetch once and print the current dashboard.
    Show {
        /// Print JSON instead of the dashboard.
        #[arg(long)]
        json: bool,
    },

    /// Keep the dashboard on screen, refreshing data when it goes stale.
    Watch {
        /// Print one JSON line per tick instead of redrawing.
        #[arg(long)]
        json: bool,

        /// Seconds between display ticks.
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u64).range(1..=60)
        )]
        tick: u64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { json } => show(json).await,
            Command::Watch { json, tick } => watch(json, tick).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;
    let path = Config::config_file_path()?;
    println!("Configuring skywatch ({})", path.display());

    let api_key = Password::new("weatherapi.com API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("API key prompt aborted")?;
    if !api_key.trim().is_empty() {
        cfg.set_api_key(api_key.trim().to_string());
    }

    cfg.location.name = Text::new("Location name:")
        .with_default(&cfg.location.name)
        .prompt()
        .context("Location prompt aborted")?;

    cfg.location.latitude = CustomType::<f64>::new("Latitude:")
        .with_default(cfg.location.latitude)
        .with_validator(|v: &f64| -> Result<Validation, CustomUserError> {
            Ok(if (-90.0..=90.0).contains(v) {
                Validation::Valid
            } else {
                Validation::Invalid("Latitude must be within -90..=90".into())
            })
        })
        .prompt()
        .context("Latitude prompt aborted")?;

    cfg.location.longitude = CustomType::<f64>::new("Longitude:")
        .with_default(cfg.location.longitude)
        .with_validator(|v: &f64| -> Result<Validation, CustomUserError> {
            Ok(if (-180.0..=180.0).contains(v) {
                Validation::Valid
            } else {
                Validation::Invalid("Longitude must be within -180..=180".into())
            })
        })
        .prompt()
        .context("Longitude prompt aborted")?;

    cfg.refresh_interval_secs = CustomType::<u64>::new("Refresh interval (seconds):")
        .with_default(cfg.refresh_interval_secs)
        .with_validator(|v: &u64| -> Result<Validation, CustomUserError> {
            Ok(if (1..=MAX_REFRESH_INTERVAL_SECS).contains(v) {
                Validation::Valid
            } else {
                Validation::Invalid(
                    format!("Must be between 1 and {MAX_REFRESH_INTERVAL_SECS}").into(),
                )
            })
        })
        .prompt()
        .context("Refresh interval prompt aborted")?;

    cfg.timezone = Text::new("Timezone (IANA name):")
        .with_default(&cfg.timezone)
        .with_validator(|v: &str| -> Result<Validation, CustomUserError> {
            Ok(match v.parse::<chrono_tz::Tz>() {
                Ok(_) => Validation::Valid,
                Err(_) => Validation::Invalid(format!("Unknown timezone '{v}'").into()),
            })
        })
        .prompt()
        .context("Timezone prompt aborted")?;

    cfg.station_settings()?;
    cfg.save()?;

    println!("Saved configuration for {}.", cfg.location.name);
    Ok(())
}

fn open_session() -> anyhow::Result<Session> {
    let cfg = Config::load()?;
    let settings = cfg.station_settings()?;
    let provider = provider_from_config(&cfg)?;

    Ok(Session::new(provider, settings, Utc::now()))
}

async fn show(json: bool) -> anyhow::Result<()> {
    let mut session = open_session()?;
    let report = session.cycle(Utc::now()).await;

    if json {
        println!("{}", render::json(&report)?);
    } else {
        print!("{}", render::dashboard(&report, session.settings()));
    }

    Ok(())
}

async fn watch(json: bool, tick: u64) -> anyhow::Result<()> {
    let mut session = open_session()?;

    log::info!(
        "Watching {} (refresh every {}s)",
        session.settings().location_name,
        session.settings().refresh_interval.num_seconds()
    );

    let emit = |report: &CycleReport, settings: &StationSettings| -> anyhow::Result<()> {
        if json {
            println!("{}", render::json(report)?);
        } else {
            let frame = render::dashboard(report, settings);
            print!("{}{frame}", render::CLEAR_SCREEN);
        }
        Ok(())
    };

    watch_loop(
        &mut session,
        StdDuration::from_secs(tick),
        tokio::signal::ctrl_c(),
        emit,
    )
    .await
}

/// Run a cycle every `tick` and hand each report to `emit` until `shutdown`
/// resolves. Shutdown also cancels a cycle that is still fetching.
async fn watch_loop<S, F>(
    session: &mut Session,
    tick: StdDuration,
    shutdown: S,
    mut emit: F,
) -> anyhow::Result<()>
where
    S: Future<Output = std::io::Result<()>>,
    F: FnMut(&CycleReport, &StationSettings) -> anyhow::Result<()>,
{
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        let report = tokio::select! {
            res = &mut shutdown => {
                res.context("Failed to listen for Ctrl+C")?;
                log::info!("Received Ctrl+C, stopping");
                return Ok(());
            }
            report = next_report(&mut ticker, session) => report,
        };

        emit(&report, session.settings())?;
    }
}

async fn next_report(ticker: &mut Interval, session: &mut Session) -> CycleReport {
    ticker.tick().await;
    session.cycle(Utc::now()).await
}
