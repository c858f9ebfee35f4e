use std::env;
use std::path::PathBuf;

use crate::cli::chat::history_storage::FileStorage;
use crate::{gemini_client, openweather_client};

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub openweather_api_key: Option<String>,
    pub openweather_api_base: String,
    pub history_file: Option<PathBuf>,
    pub location_enabled: bool,
    pub strict_city_replies: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_api_base: gemini_client::DEFAULT_API_BASE.to_string(),
            gemini_model: gemini_client::DEFAULT_MODEL.to_string(),
            openweather_api_key: None,
            openweather_api_base: openweather_client::DEFAULT_API_BASE.to_string(),
            history_file: FileStorage::default_path(),
            location_enabled: true,
            strict_city_replies: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        settings.gemini_api_key = get("GEMINI_API_KEY");
        if let Some(base) = get("GEMINI_API_BASE") {
            settings.gemini_api_base = base;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            settings.gemini_model = model;
        }
        settings.openweather_api_key = get("OPENWEATHER_API_KEY");
        if let Some(base) = get("OPENWEATHER_API_BASE") {
            settings.openweather_api_base = base;
        }
        if let Some(path) = get("MEGACHEF_HISTORY_FILE") {
            settings.history_file = Some(PathBuf::from(path));
        }

        settings
    }

    /// Weather and time answers need both the flag and an OpenWeather key.
    pub fn location_available(&self) -> bool {
        self.location_enabled && self.openweather_api_key.is_some()
    }
}
