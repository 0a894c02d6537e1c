use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::WeatherSettings,
    model::{WeatherCondition, WeatherInfo},
};

#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered with anything other than `200 OK`.
    #[error("Failed to get weather information.")]
    Fetch,

    /// DNS, connect, reset and similar; shown with the underlying message.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse weather response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can look up the current weather at a capital.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        country_code: &str,
        capital: &str,
    ) -> Result<WeatherInfo, WeatherError>;
}

/// OpenWeather "current weather" adapter. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    settings: WeatherSettings,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(settings: WeatherSettings) -> Self {
        Self { settings, http: Client::new() }
    }

    fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}@2x.png", self.settings.image_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    timezone: i64,
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_weather(
        &self,
        country_code: &str,
        capital: &str,
    ) -> Result<WeatherInfo, WeatherError> {
        let location = format!("{capital},{country_code}");
        debug!(%location, url = %self.settings.api_url, "requesting current weather");

        let res = self
            .http
            .get(&self.settings.api_url)
            .query(&[("q", location.as_str()), ("appid", self.settings.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if status != StatusCode::OK {
            warn!(%status, %location, "weather provider rejected request");
            return Err(WeatherError::Fetch);
        }

        let parsed: OwCurrentResponse = res.json().await.map_err(WeatherError::Decode)?;

        Ok(WeatherInfo {
            temperature: parsed.main.temp,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| WeatherCondition {
                    id: w.id,
                    icon: self.icon_url(&w.icon),
                    description: w.description,
                })
                .collect(),
            timezone: parsed.timezone,
        })
    }
}
