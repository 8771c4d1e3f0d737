use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::models::preferences::ItineraryRequest;
use crate::state::AppState;

/*
    POST /api/v1/itinerary
*/
pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<ItineraryRequest>,
) -> Result<HttpResponse, ApiError> {
    let prefs = &body.preferences;
    log::info!(
        "Generating itinerary {} -> {} ({} to {})",
        prefs.origin,
        prefs.destination,
        prefs.start_date,
        prefs.end_date
    );
    let itinerary = state.generator.generate(prefs).await.map_err(|e| {
        log::error!("Itinerary generation failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(itinerary))
}

/*
    GET /api/v1/itinerary/{id}
*/
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let record = state
        .store
        .load_itinerary(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Itinerary not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "id": record.id,
        "itinerary": record.itinerary,
        "preferences": record.preferences,
        "providers": record.providers,
        "updatedAt": record.updated_at,
    })))
}

/*
    DELETE /api/v1/itinerary/{id}
*/
pub async fn delete_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_itinerary(&id).await? {
        return Err(ApiError::NotFound("Itinerary not found".to_string()));
    }
    log::info!("Deleted itinerary {}", id);
    Ok(HttpResponse::Ok().json(json!({ "id": id, "deleted": true })))
}
