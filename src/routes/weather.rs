use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{error_body, ApiError};
use crate::routes::bounded;
use crate::services::weather_service::DEFAULT_FORECAST_DAYS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub city: String,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherSearchQuery {
    pub city: String,
    pub num: Option<u32>,
}

/*
    GET /api/v1/weather-forecast?city&days
*/
pub async fn forecast(
    state: web::Data<AppState>,
    query: web::Query<ForecastQuery>,
) -> Result<HttpResponse, ApiError> {
    let days = bounded(query.days, DEFAULT_FORECAST_DAYS, 1, 10, "days")?;
    Ok(match state.weather.forecast(&query.city, days).await {
        Ok(forecast) => HttpResponse::Ok().json(forecast),
        Err(e) => {
            log::error!("Weather forecast failed for {}: {}", query.city, e);
            error_body(StatusCode::BAD_REQUEST, e)
        }
    })
}

/*
    GET /api/v1/weather-search?city&num
*/
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<WeatherSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let num = bounded(query.num, 5, 1, 10, "num")?;
    let results = state
        .search
        .search_web(&format!("{} weather forecast", query.city), num)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "city": query.city, "results": results })))
}
