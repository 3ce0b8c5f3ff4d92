use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, Observation},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Source of current conditions plus today's sunrise/sunset for a point.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_observation(&self, location: &Coordinates) -> Result<Observation, FetchError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for weatherapi.com.\n\
             Hint: run `skywatch configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(Box::new(WeatherApiProvider::new(api_key.to_owned())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `skywatch configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
