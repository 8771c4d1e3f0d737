use actix_web::{http::StatusCode, web, HttpResponse};

use crate::error::{error_body, ApiError};
use crate::services::fashion_service::{FashionError, FashionQuery};
use crate::services::suggestion_service::{FlightQuery, HotelQuery};
use crate::state::AppState;

/*
    GET /api/v1/suggest-hotels?city&start_date&end_date&budget&travellers&itinerary_id
*/
pub async fn hotels(state: web::Data<AppState>, query: web::Query<HotelQuery>) -> HttpResponse {
    match state.suggestions.suggest_hotels(&query).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => {
            log::error!("Hotel suggestions failed for {}: {}", query.city, e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/*
    GET /api/v1/suggest-flights?origin&destination&depart&ret&travellers&itinerary_id&budget
*/
pub async fn flights(state: web::Data<AppState>, query: web::Query<FlightQuery>) -> HttpResponse {
    match state.suggestions.suggest_flights(&query).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => {
            log::error!(
                "Flight suggestions failed for {} -> {}: {}",
                query.origin,
                query.destination,
                e
            );
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/*
    GET /api/v1/suggest-fashion?city&season_hint&itinerary_id&budget
*/
pub async fn fashion(
    state: web::Data<AppState>,
    query: web::Query<FashionQuery>,
) -> Result<HttpResponse, ApiError> {
    match state.fashion.suggest(&query).await {
        Ok(payload) => Ok(HttpResponse::Ok().json(payload)),
        Err(FashionError::Exhausted(msg)) => {
            log::error!("Fashion suggestions exhausted for {}: {}", query.city, msg);
            Err(ApiError::BadGateway(msg))
        }
        Err(e) => {
            log::error!("Fashion suggestions failed for {}: {}", query.city, e);
            Ok(error_body(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}
