use serde::{Deserialize, Serialize};

use crate::models::itinerary::Itinerary;
use crate::models::preferences::TripPreferences;

#[derive(Debug, Deserialize, Serialize)]
pub struct TranscribeRequest {
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VoiceMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSessionStarted {
    pub session_id: String,
    pub text: String,
    pub audio: Option<String>,
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VoiceReply {
    pub reply: String,
    pub audio: Option<String>,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Itinerary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<TripPreferences>,
    pub warnings: Option<Vec<String>>,
}
