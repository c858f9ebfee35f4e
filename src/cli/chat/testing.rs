//! Fakes for the remote services, shared by the chat tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::{eyre, Result};

use super::services::{Conditions, LanguageModel, NetworkCheck, Place, WeatherService};

#[derive(Default)]
pub struct FakeModel {
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            Err(eyre!("HTTP 503"))
        } else {
            Ok("Que tal um bolo de fubá?".to_string())
        }
    }
}

/// Knows every city except the ones listed as unknown.
#[derive(Default)]
pub struct FakeWeather {
    pub unknown: Vec<&'static str>,
    pub geocode_fail: AtomicBool,
    pub conditions_fail: AtomicBool,
    pub geocoded: Mutex<Vec<String>>,
    pub conditions_calls: AtomicUsize,
}

impl FakeWeather {
    pub fn geocoded(&self) -> Vec<String> {
        self.geocoded.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherService for FakeWeather {
    async fn geocode(&self, city: &str) -> Result<Option<Place>> {
        self.geocoded.lock().unwrap().push(city.to_string());
        if self.geocode_fail.load(Ordering::SeqCst) {
            return Err(eyre!("connection reset"));
        }
        if self.unknown.iter().any(|u| *u == city) {
            return Ok(None);
        }
        Ok(Some(Place {
            name: city.to_string(),
            country: "BR".to_string(),
            lat: -25.43,
            lon: -49.27,
        }))
    }

    async fn current_conditions(&self, _lat: f64, _lon: f64) -> Result<Conditions> {
        self.conditions_calls.fetch_add(1, Ordering::SeqCst);
        if self.conditions_fail.load(Ordering::SeqCst) {
            return Err(eyre!("HTTP 401"));
        }
        Ok(Conditions {
            temperature: 12.3,
            description: "chuva leve".to_string(),
            humidity: 88,
            utc_offset_seconds: -10800,
        })
    }
}

pub struct FixedNetwork(pub bool);

#[async_trait]
impl NetworkCheck for FixedNetwork {
    async fn is_online(&self) -> bool {
        self.0
    }
}
