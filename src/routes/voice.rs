use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::models::voice::{TranscribeRequest, VoiceMessageRequest};
use crate::state::AppState;

/*
    POST /api/v1/voice/session/start
*/
pub async fn start_session(state: web::Data<AppState>) -> HttpResponse {
    let started = state.voice.start_session().await;
    log::info!("Voice session {} started", started.session_id);
    HttpResponse::Ok().json(started)
}

/*
    POST /api/v1/voice/session/{session_id}/transcribe
*/
pub async fn transcribe(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TranscribeRequest>,
) -> Result<HttpResponse, ApiError> {
    let transcript = state
        .voice
        .transcribe(&path, body.audio.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "transcript": transcript })))
}

/*
    POST /api/v1/voice/session/{session_id}/message
*/
pub async fn message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<VoiceMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    let reply = state
        .voice
        .handle_message(&path, body.message.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}
