//! Contracts for the remote capabilities the chat engine depends on.

use async_trait::async_trait;
use eyre::Result;

/// Best geocoding match for a city name.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Localized description, e.g. "céu limpo".
    pub description: String,
    pub humidity: u8,
    /// Offset of the local time zone from UTC, in seconds.
    pub utc_offset_seconds: i32,
}

/// Single-prompt text completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    /// `Ok(None)` when the city is unknown.
    async fn geocode(&self, city: &str) -> Result<Option<Place>>;

    async fn current_conditions(&self, lat: f64, lon: f64) -> Result<Conditions>;
}

/// Whether remote calls can be attempted at all.
#[async_trait]
pub trait NetworkCheck: Send + Sync {
    async fn is_online(&self) -> bool;
}
