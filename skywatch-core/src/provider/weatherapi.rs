use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{AstroInfo, Coordinates, Distance, Observation, Speed, Temperature, WeatherSnapshot},
};

use super::WeatherProvider;

const BASE_URL: &str = "https://api.weatherapi.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CURRENT: &str = "current";
const ASTRONOMY: &str = "astronomy";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self { api_key, http })
    }

    async fn get(
        &self,
        endpoint: &'static str,
        extra: &[(&str, &str)],
        location: &Coordinates,
    ) -> Result<String, FetchError> {
        let url = format!("{BASE_URL}/{endpoint}.json");
        let q = location.as_query();

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str())])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Upstream {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }

    async fn fetch_current(&self, location: &Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let body = self.get(CURRENT, &[("aqi", "yes")], location).await?;
        parse_current(&body)
    }

    async fn fetch_astronomy(&self, location: &Coordinates) -> Result<AstroInfo, FetchError> {
        let body = self.get(ASTRONOMY, &[], location).await?;
        parse_astronomy(&body)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_observation(&self, location: &Coordinates) -> Result<Observation, FetchError> {
        let (snapshot, astro) =
            tokio::try_join!(self.fetch_current(location), self.fetch_astronomy(location))?;

        log::debug!(
            "WeatherAPI observation for {}: {} (local {})",
            location.as_query(),
            snapshot.condition_text,
            snapshot.observation_local_time,
        );

        Ok(Observation { snapshot, astro })
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaAirQuality {
    #[serde(rename = "us-epa-index")]
    us_epa_index: u8,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    feelslike_f: f64,
    humidity: u8,
    wind_kph: f64,
    wind_mph: f64,
    wind_dir: String,
    gust_kph: Option<f64>,
    precip_mm: f64,
    vis_km: f64,
    vis_miles: f64,
    uv: f64,
    cloud: u8,
    condition: WaCondition,
    air_quality: WaAirQuality,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaAstronomy {
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaAstronomyResponse {
    astronomy: WaAstronomy,
}

pub(crate) fn parse_current(body: &str) -> Result<WeatherSnapshot, FetchError> {
    let parsed: WaCurrentResponse =
        serde_json::from_str(body).map_err(|err| FetchError::MalformedResponse {
            endpoint: CURRENT,
            reason: err.to_string(),
        })?;

    let WaCurrentResponse {
        location,
        current: c,
    } = parsed;

    Ok(WeatherSnapshot {
        temperature: Temperature {
            celsius: c.temp_c,
            fahrenheit: c.temp_f,
        },
        feels_like: Temperature {
            celsius: c.feelslike_c,
            fahrenheit: c.feelslike_f,
        },
        humidity_pct: c.humidity,
        wind: Speed {
            kph: c.wind_kph,
            mph: c.wind_mph,
        },
        gust_kph: c.gust_kph,
        precipitation_mm: c.precip_mm,
        visibility: Distance {
            km: c.vis_km,
            miles: c.vis_miles,
        },
        uv_index: c.uv,
        cloud_cover_pct: c.cloud,
        condition_text: c.condition.text,
        condition_icon: c.condition.icon,
        air_quality_index: c.air_quality.us_epa_index,
        wind_direction: c.wind_dir,
        observation_local_time: location.localtime,
    })
}

pub(crate) fn parse_astronomy(body: &str) -> Result<AstroInfo, FetchError> {
    let parsed: WaAstronomyResponse =
        serde_json::from_str(body).map_err(|err| FetchError::MalformedResponse {
            endpoint: ASTRONOMY,
            reason: err.to_string(),
        })?;

    let WaAstro { sunrise, sunset } = parsed.astronomy.astro;
    Ok(AstroInfo { sunrise, sunset })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
