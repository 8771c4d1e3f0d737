use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::google_auth_service::{AuthError, GoogleTokenProvider};

const DEVELOPER_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

#[derive(Debug)]
pub enum GeminiError {
    ConfigurationError(String),
    AuthError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiError::ConfigurationError(msg) => write!(f, "Gemini is not configured: {}", msg),
            GeminiError::AuthError(msg) => write!(f, "Gemini authentication failed: {}", msg),
            GeminiError::HttpError(err) => write!(f, "Gemini HTTP error: {}", err),
            GeminiError::ResponseError(msg) => write!(f, "Gemini response error: {}", msg),
        }
    }
}

impl std::error::Error for GeminiError {}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::HttpError(err)
    }
}

impl From<AuthError> for GeminiError {
    fn from(err: AuthError) -> Self {
        GeminiError::AuthError(err.0)
    }
}

/// A single-turn `generateContent` call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub json_output: bool,
    pub response_schema: Option<Value>,
    pub image_output: bool,
    pub safety_threshold: Option<&'static str>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            temperature: 0.4,
            top_p: 0.8,
            max_output_tokens: 2048,
            json_output: false,
            response_schema: None,
            image_output: false,
            safety_threshold: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f32, top_p: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Ask for `application/json` output constrained by `schema`.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.json_output = true;
        self.response_schema = Some(schema);
        self
    }

    pub fn with_images(mut self) -> Self {
        self.image_output = true;
        self
    }

    pub fn with_safety_threshold(mut self, threshold: &'static str) -> Self {
        self.safety_threshold = Some(threshold);
        self
    }

    pub fn to_body(&self) -> Value {
        let mut generation_config = json!({
            "temperature": self.temperature,
            "topP": self.top_p,
            "maxOutputTokens": self.max_output_tokens,
        });
        if self.json_output {
            generation_config["responseMimeType"] = json!("application/json");
        }
        if let Some(schema) = &self.response_schema {
            generation_config["responseSchema"] = schema.clone();
        }
        if self.image_output {
            generation_config["responseModalities"] = json!(["TEXT", "IMAGE"]);
        }

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": self.prompt }] }],
            "generationConfig": generation_config,
        });
        if let Some(instruction) = &self.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }
        if let Some(threshold) = self.safety_threshold {
            body["safetySettings"] = Value::Array(
                HARM_CATEGORIES
                    .iter()
                    .map(|category| json!({ "category": category, "threshold": threshold }))
                    .collect(),
            );
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationOutput {
    pub text: String,
    pub images: Vec<InlineImage>,
}

impl GenerationOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            images: Vec::new(),
        }
    }
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, GeminiError>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    data: String,
}

enum Backend {
    DeveloperApi { api_key: String },
    Vertex { project_id: String, location: String },
    Unconfigured,
}

/// Gemini over REST, either through Vertex AI or the Developer API.
pub struct GeminiClient {
    client: Client,
    backend: Backend,
    tokens: Arc<GoogleTokenProvider>,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, tokens: Arc<GoogleTokenProvider>) -> Result<Self, GeminiError> {
        let backend = match (&config.gemini_api_key, &config.gcp_project_id) {
            (Some(api_key), _) => Backend::DeveloperApi {
                api_key: api_key.clone(),
            },
            (None, Some(project_id)) => Backend::Vertex {
                project_id: project_id.clone(),
                location: config.gcp_global_location.clone(),
            },
            (None, None) => {
                log::warn!("Neither GEMINI_API_KEY nor GCP_PROJECT_ID is set; Gemini calls will fail");
                Backend::Unconfigured
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            backend,
            tokens,
        })
    }

    fn endpoint(&self, model: &str) -> Result<String, GeminiError> {
        match &self.backend {
            Backend::DeveloperApi { .. } => Ok(format!(
                "{}/models/{}:generateContent",
                DEVELOPER_API_BASE, model
            )),
            Backend::Vertex {
                project_id,
                location,
            } => Ok(format!(
                "https://{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                vertex_host(location),
                project_id,
                location,
                model
            )),
            Backend::Unconfigured => Err(GeminiError::ConfigurationError(
                "set GEMINI_API_KEY or GCP_PROJECT_ID".to_string(),
            )),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, GeminiError> {
        let url = self.endpoint(&request.model)?;
        let mut builder = self.client.post(&url).json(&request.to_body());

        builder = match &self.backend {
            Backend::DeveloperApi { api_key } => builder.header("x-goog-api-key", api_key),
            _ => builder.header("Authorization", self.tokens.authorization().await?),
        };

        log::debug!("Gemini request -> {} ({})", request.model, url);
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeminiError::ResponseError(format!(
                "Request failed with status {}: {}",
                status, error_text
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ResponseError(format!("Failed to parse response: {}", e)))?;

        collect_output(payload)
    }
}

fn vertex_host(location: &str) -> String {
    if location == "global" {
        "aiplatform.googleapis.com".to_string()
    } else {
        format!("{}-aiplatform.googleapis.com", location)
    }
}

fn collect_output(payload: GenerateContentResponse) -> Result<GenerationOutput, GeminiError> {
    if payload.candidates.is_empty() {
        let reason = payload
            .prompt_feedback
            .map(|feedback| feedback.to_string())
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GeminiError::ResponseError(format!(
            "Gemini returned no candidates: {}",
            reason
        )));
    }

    let mut output = GenerationOutput::default();
    for candidate in payload.candidates {
        if let Some(reason) = &candidate.finish_reason {
            if reason != "STOP" {
                log::warn!("Gemini candidate finished with {}", reason);
            }
        }
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(text) = part.text {
                if !part.thought {
                    output.text.push_str(&text);
                }
            }
            if let Some(inline) = part.inline_data {
                let data = general_purpose::STANDARD.decode(inline.data.as_bytes()).map_err(|e| {
                    GeminiError::ResponseError(format!("Invalid inline image data: {}", e))
                })?;
                output.images.push(InlineImage {
                    mime_type: inline.mime_type.unwrap_or_else(|| "image/jpeg".to_string()),
                    data,
                });
            }
        }
        // The first candidate with text wins; later candidates are alternatives.
        if !output.text.is_empty() {
            break;
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new("gemini-2.5-flash", "plan a trip")
            .with_system_instruction("be terse")
            .with_schema(json!({ "type": "OBJECT" }))
            .with_safety_threshold("BLOCK_NONE");

        let body = request.to_body();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan a trip");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert!(body["generationConfig"].get("responseModalities").is_none());
    }

    #[test]
    fn test_vertex_host_for_regional_location() {
        assert_eq!(vertex_host("global"), "aiplatform.googleapis.com");
        assert_eq!(vertex_host("us-central1"), "us-central1-aiplatform.googleapis.com");
    }

    #[test]
    fn test_collect_output_joins_text_and_decodes_images() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let output = collect_output(payload).unwrap();
        assert_eq!(output.text, "{\"a\":1}");
        assert_eq!(output.images.len(), 1);
        assert_eq!(output.images[0].mime_type, "image/png");
        assert_eq!(output.images[0].data, b"hello".to_vec());
    }

    #[test]
    fn test_collect_output_without_candidates_is_error() {
        let payload: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(collect_output(payload).is_err());
    }
}
