use async_trait::async_trait;
use eyre::{eyre, Result};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::cli::chat::services::LanguageModel;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiClient {
    api_key: String,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(eyre!("Gemini API key is empty"));
        }

        Ok(Self {
            api_key,
            api_base: api_base.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let request_body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ]
        });

        debug!(
            "Sending request to Gemini API: {}",
            serde_json::to_string_pretty(&request_body)?
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, error_text);
            return Err(eyre!("API request failed ({}): {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        debug!(
            "Received response from Gemini API: {}",
            serde_json::to_string_pretty(&response_json)?
        );

        extract_text(&response_json).ok_or_else(|| eyre!("Gemini response contained no text"))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
