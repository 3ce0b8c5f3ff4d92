use anyhow::Context;
use serde::Serialize;
use skywatch_core::{
    CycleReport, DerivedView, Observation, StationSettings, Unavailability, Verdict,
    WeatherSnapshot,
};

pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonReport<'a> {
    Ready {
        observation: &'a Observation,
        view: &'a DerivedView,
    },
    Unavailable {
        reason: String,
    },
}

pub fn json(report: &CycleReport) -> anyhow::Result<String> {
    let out = match report {
        CycleReport::Ready { observation, view } => JsonReport::Ready { observation, view },
        CycleReport::Unavailable(why) => JsonReport::Unavailable {
            reason: why.to_string(),
        },
    };

    serde_json::to_string(&out).context("Failed to serialize cycle report to JSON")
}

pub fn dashboard(report: &CycleReport, settings: &StationSettings) -> String {
    match report {
        CycleReport::Ready { observation, view } => ready(&observation.snapshot, view, settings),
        CycleReport::Unavailable(Unavailability::Waiting) => {
            format!("{}\n\nWaiting for data…\n", header(settings))
        }
        CycleReport::Unavailable(why) => {
            format!("{}\n\nWaiting for data… ({why})\n", header(settings))
        }
    }
}

fn header(settings: &StationSettings) -> String {
    let c = settings.coordinates;
    format!(
        "{} Live Weather\nLocation: {} ({}, {})",
        settings.location_name, settings.location_name, c.latitude, c.longitude
    )
}

fn ready(snap: &WeatherSnapshot, view: &DerivedView, settings: &StationSettings) -> String {
    let (icon, phase) = if view.is_daytime {
        ("☀", "Day")
    } else {
        ("☾", "Night")
    };
    let launch = match view.launch_safety.verdict {
        Verdict::Safe => "GO",
        Verdict::Abort => "NO-GO",
    };
    let station_time = view.station_time.format("%Y-%m-%d %H:%M:%S");
    let next_update = countdown(view.seconds_until_next_refresh);

    let lines = [
        header(settings),
        String::new(),
        format!("{icon} {phase}time at {}", settings.location_name),
        format!("  {}", snap.condition_text),
        format!(
            "  Temperature: {}°C ({}°F)   Feels like: {}°C ({}°F)",
            snap.temperature.celsius,
            snap.temperature.fahrenheit,
            snap.feels_like.celsius,
            snap.feels_like.fahrenheit
        ),
        format!(
            "  Humidity: {}%   Wind: {} kph ({} mph) {}",
            snap.humidity_pct, snap.wind.kph, snap.wind.mph, snap.wind_direction
        ),
        format!(
            "  Air quality: {} (EPA {})",
            view.air_quality, snap.air_quality_index
        ),
        format!(
            "  Precip: {} mm   Vis: {} km   UV: {}   Cloud: {}%",
            snap.precipitation_mm, snap.visibility.km, snap.uv_index, snap.cloud_cover_pct
        ),
        format!(
            "  Sunrise: {}   Sunset: {}",
            view.sunrise.format("%H:%M"),
            view.sunset.format("%H:%M")
        ),
        String::new(),
        format!("Launch: {launch} ({})", view.launch_safety.summary()),
        String::new(),
        format!("Station time: {station_time}"),
        format!("Data from: {}", snap.observation_local_time),
        format!("Next update in: {next_update}"),
        format!("Last refresh: {}", view.last_refresh.format("%H:%M:%S")),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn countdown(secs: u64) -> String {
    if secs == 1 {
        "1 sec".to_string()
    } else {
        format!("{secs} secs")
    }
}
