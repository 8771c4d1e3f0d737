use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::services::gemini_service::{GenerationRequest, GenerativeModel};
use crate::services::json_extraction::parse_model_json;

#[derive(Debug)]
pub enum AssistError {
    ModelError(String),
    ParseError(String),
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistError::ModelError(msg) => write!(f, "{}", msg),
            AssistError::ParseError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AssistError {}

/// Short free-form helpers on the lighter assist model.
pub struct AssistService {
    model: Arc<dyn GenerativeModel>,
    model_name: String,
}

impl AssistService {
    pub fn new(model: Arc<dyn GenerativeModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub async fn smart_tips(&self, destination: &str, themes: &str) -> Result<Value, AssistError> {
        let prompt = format!(
            "Provide 3-4 concise, actionable travel tips for a trip to {}, focusing on the themes of {}. \
             For example, mention specific local foods to try, cultural etiquette, or hidden gems. \
             Return the tips as a JSON array of strings.",
            destination, themes
        );
        let text = self.ask(prompt, 0.7, 512).await?;
        parse_model_json(&text).map_err(|e| AssistError::ParseError(e.to_string()))
    }

    pub async fn translate_itinerary(
        &self,
        itinerary: &Value,
        target_language: &str,
    ) -> Result<Value, AssistError> {
        let itinerary_json = serde_json::to_string_pretty(itinerary)
            .map_err(|e| AssistError::ParseError(e.to_string()))?;
        let prompt = format!(
            "Translate the user-facing string values in the following JSON object to {}. \
             Keep the JSON structure and all keys identical. Only translate the values of keys like \
             'summary', 'description', 'title', 'notes', 'weatherAdvisory', etc. \
             Do not translate keys or technical values.\n\n{}",
            target_language, itinerary_json
        );
        let text = self.ask(prompt, 0.2, 4096).await?;
        parse_model_json(&text).map_err(|e| AssistError::ParseError(e.to_string()))
    }

    pub async fn weather_summary(&self, weather: &Value) -> Result<String, AssistError> {
        let weather_json = serde_json::to_string_pretty(weather)
            .map_err(|e| AssistError::ParseError(e.to_string()))?;
        let prompt = format!(
            "Based on the following weather data, provide a concise, conversational summary for a traveler. \
             Mention the overall trend, any significant weather events (like rain), and what to pack.\n\n{}",
            weather_json
        );
        let text = self.ask(prompt, 0.7, 512).await?;
        if text.trim().is_empty() {
            return Ok("Could not generate a weather summary.".to_string());
        }
        Ok(text)
    }

    async fn ask(&self, prompt: String, temperature: f32, max_tokens: u32) -> Result<String, AssistError> {
        let request = GenerationRequest::new(self.model_name.clone(), prompt)
            .with_sampling(temperature, 0.9, max_tokens);
        self.model
            .generate(&request)
            .await
            .map(|output| output.text)
            .map_err(|e| AssistError::ModelError(e.to_string()))
    }
}
