use async_trait::async_trait;
use eyre::{Result, eyre};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::cli::chat::services::{Conditions, Place, WeatherService};

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

/// Geocoding and current-weather lookups against OpenWeather.
pub struct OpenWeatherClient {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<WeatherDescription>,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct WeatherDescription {
    description: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}{}", self.api_base.trim_end_matches('/'), path);
        let mut all: Vec<(&str, &str)> = params.to_vec();
        all.push(("appid", self.api_key.as_str()));
        Ok(Url::parse_with_params(&base, &all)?)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("OpenWeather request failed with status {}: {}", status, body);
            return Err(eyre!("OpenWeather request failed ({})", status));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Option<Place>> {
        let url = self.url("/geo/1.0/direct", &[("q", city), ("limit", "1")])?;
        let entries: Vec<GeoEntry> = self.get(url).await?;

        Ok(entries.into_iter().next().map(|entry| Place {
            name: entry.name,
            country: entry.country,
            lat: entry.lat,
            lon: entry.lon,
        }))
    }

    async fn current_conditions(&self, lat: f64, lon: f64) -> Result<Conditions> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let url = self.url(
            "/data/2.5/weather",
            &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric"), ("lang", "pt_br")],
        )?;
        let response: WeatherResponse = self.get(url).await?;

        Ok(conditions_from(response))
    }
}

fn conditions_from(response: WeatherResponse) -> Conditions {
    Conditions {
        temperature: response.main.temp,
        description: response
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_default(),
        humidity: response.main.humidity,
        utc_offset_seconds: response.timezone,
    }
}
