use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::error_body;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SmartTipsQuery {
    pub destination: String,
    #[serde(default)]
    pub themes: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub itinerary: Value,
    pub target_language: String,
}

/*
    GET /api/v1/smart-tips?destination&themes
*/
pub async fn smart_tips(state: web::Data<AppState>, query: web::Query<SmartTipsQuery>) -> HttpResponse {
    match state.assist.smart_tips(&query.destination, &query.themes).await {
        Ok(tips) => HttpResponse::Ok().json(json!({
            "destination": query.destination,
            "themes": query.themes,
            "tips": tips,
        })),
        Err(e) => {
            log::error!("Smart tips failed for {}: {}", query.destination, e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/*
    POST /api/v1/translate-itinerary
*/
pub async fn translate_itinerary(
    state: web::Data<AppState>,
    body: web::Json<TranslateRequest>,
) -> HttpResponse {
    match state
        .assist
        .translate_itinerary(&body.itinerary, &body.target_language)
        .await
    {
        Ok(translated) => HttpResponse::Ok().json(translated),
        Err(e) => {
            log::error!("Translation to {} failed: {}", body.target_language, e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/*
    POST /api/v1/weather-summary
*/
pub async fn weather_summary(state: web::Data<AppState>, body: web::Json<Value>) -> HttpResponse {
    match state.assist.weather_summary(&body).await {
        Ok(summary) => HttpResponse::Ok().json(json!({ "summary": summary })),
        Err(e) => {
            log::error!("Weather summary failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
