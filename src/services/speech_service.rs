use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::services::google_auth_service::{AuthError, GoogleTokenProvider};

const TEXT_TO_SPEECH_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
const SPEECH_TO_TEXT_URL: &str = "https://speech.googleapis.com/v1/speech:recognize";
const VOICE_NAME: &str = "en-US-Neural2-F";
const LANGUAGE_CODE: &str = "en-US";
const SPEAKING_RATE: f32 = 1.02;

#[derive(Debug)]
pub enum SpeechError {
    AuthError(String),
    HttpError(reqwest::Error),
    ResponseError { status: u16, body: String },
    DecodeError(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::AuthError(msg) => write!(f, "Speech authentication failed: {}", msg),
            SpeechError::HttpError(err) => write!(f, "Speech HTTP error: {}", err),
            SpeechError::ResponseError { status, body } => {
                write!(f, "Speech request failed with status {}: {}", status, body)
            }
            SpeechError::DecodeError(msg) => write!(f, "Speech payload error: {}", msg),
        }
    }
}

impl std::error::Error for SpeechError {}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::HttpError(err)
    }
}

impl From<AuthError> for SpeechError {
    fn from(err: AuthError) -> Self {
        SpeechError::AuthError(err.0)
    }
}

#[async_trait]
pub trait SpeechServices: Send + Sync {
    /// MP3 audio for `text`, base64 encoded.
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError>;

    /// Transcript of WEBM/Opus audio; empty when nothing was recognised.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Cloud Text-to-Speech and Speech-to-Text over REST.
pub struct GoogleSpeechClient {
    client: Client,
    tokens: Arc<GoogleTokenProvider>,
    quota_project: Option<String>,
}

impl GoogleSpeechClient {
    pub fn new(config: &AppConfig, tokens: Arc<GoogleTokenProvider>) -> Result<Self, SpeechError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            tokens,
            quota_project: config.gcp_project_id.clone(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, SpeechError> {
        let mut request = self
            .client
            .post(url)
            .header("Authorization", self.tokens.authorization().await?)
            .json(&body);
        if let Some(project) = &self.quota_project {
            request = request.header("x-goog-user-project", project);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SpeechServices for GoogleSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<String, SpeechError> {
        let body = json!({
            "input": { "text": text },
            "voice": {
                "languageCode": LANGUAGE_CODE,
                "name": VOICE_NAME,
                "ssmlGender": "FEMALE"
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": SPEAKING_RATE
            }
        });
        let response: SynthesizeResponse = self.post(TEXT_TO_SPEECH_URL, body).await?;
        Ok(response.audio_content)
    }

    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        let body = json!({
            "config": {
                "encoding": "WEBM_OPUS",
                "languageCode": LANGUAGE_CODE,
                "enableAutomaticPunctuation": true
            },
            "audio": { "content": general_purpose::STANDARD.encode(audio) }
        });
        let response: RecognizeResponse = self.post(SPEECH_TO_TEXT_URL, body).await?;
        Ok(first_transcript(response))
    }
}

fn first_transcript(response: RecognizeResponse) -> String {
    response
        .results
        .into_iter()
        .find_map(|result| result.alternatives.into_iter().next())
        .map(|alternative| alternative.transcript.trim().to_string())
        .unwrap_or_default()
}

/// Decode a base64 audio upload, tolerating a `data:` URL prefix.
pub fn decode_audio(audio_base64: &str) -> Result<Vec<u8>, SpeechError> {
    let payload = audio_base64
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(audio_base64)
        .trim();
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| SpeechError::DecodeError(e.to_string()))
}
