use serde::{Deserialize, Serialize};

/// Fixed point the station reports for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Provider query form, e.g. `"25.993217,-97.172555"`.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub kph: f64,
    pub mph: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub km: f64,
    pub miles: f64,
}

/// Current conditions as reported by the provider. Read-only to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: Temperature,
    pub feels_like: Temperature,
    pub humidity_pct: u8,
    pub wind: Speed,
    /// Absent when the provider does not report gusts.
    pub gust_kph: Option<f64>,
    /// Millimetres accumulated in the current observation period.
    pub precipitation_mm: f64,
    pub visibility: Distance,
    pub uv_index: f64,
    pub cloud_cover_pct: u8,
    pub condition_text: String,
    pub condition_icon: String,
    /// US EPA index.
    pub air_quality_index: u8,
    pub wind_direction: String,
    /// Provider-local timestamp string, displayed verbatim.
    pub observation_local_time: String,
}

/// Sunrise/sunset as the provider reports them, e.g. `"07:15 AM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstroInfo {
    pub sunrise: String,
    pub sunset: String,
}

/// One fetched set of readings plus astronomy data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub snapshot: WeatherSnapshot,
    pub astro: AstroInfo,
}
