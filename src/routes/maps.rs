use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::error_body;
use crate::models::places::DirectionsRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub city: String,
}

/*
    POST /api/v1/geocode-locations?city
    Body: a list of names, {locations}, {itinerary} or {days}
*/
pub async fn geocode_locations(
    state: web::Data<AppState>,
    query: web::Query<GeocodeQuery>,
    body: web::Json<Value>,
) -> HttpResponse {
    let results = state.geocoder.geocode(&body, &query.city).await;
    log::debug!("Geocoded {} locations for '{}'", results.len(), query.city);
    HttpResponse::Ok().json(json!({ "results": results }))
}

/*
    POST /api/v1/directions
*/
pub async fn directions(
    state: web::Data<AppState>,
    body: web::Json<DirectionsRequest>,
) -> HttpResponse {
    match state.directions.route(&body).await {
        Ok(route) => HttpResponse::Ok().json(route),
        Err(e) => {
            log::error!("Directions request failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
