use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::FetchError,
    model::{Outcome, WeatherQuery, WeatherResult},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Issues exactly one request for the query; failures are not retried.
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    Ok(Box::new(OpenWeatherProvider::from_config(config)?))
}

/// Runs one lookup and folds any failure into a display-ready outcome.
pub async fn lookup(provider: &dyn WeatherProvider, query: &WeatherQuery) -> Outcome {
    match provider.current_weather(query).await {
        Ok(result) => Outcome::Weather(result),
        Err(err) => {
            tracing::warn!(city = %query.city, error = %err, "weather lookup failed");
            Outcome::Error(err.to_error_result())
        }
    }
}
