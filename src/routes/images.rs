use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{error_body, ApiError};
use crate::models::images::{ImageGenerationRequest, ItineraryImagesRequest};
use crate::routes::bounded;
use crate::services::image_service::ImageError;
use crate::state::AppState;

const DEFAULT_IMAGE_COUNT: u32 = 6;

#[derive(Debug, Deserialize)]
pub struct CityImagesQuery {
    pub city: String,
    pub num: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ImageSearchQuery {
    pub query: String,
    pub num: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CityHeroQuery {
    pub city: String,
    #[serde(default)]
    pub force: bool,
}

/*
    GET /api/v1/city-images?city&num
*/
pub async fn city_images(
    state: web::Data<AppState>,
    query: web::Query<CityImagesQuery>,
) -> Result<HttpResponse, ApiError> {
    let num = bounded(query.num, DEFAULT_IMAGE_COUNT, 1, 10, "num")?;
    let results = state.images.city_images(&query.city, num).await?;
    let images: Vec<&str> = results.iter().filter_map(|r| r.link.as_deref()).collect();
    Ok(HttpResponse::Ok().json(json!({
        "city": query.city,
        "images": images,
        "results": results,
    })))
}

/*
    GET /api/v1/image-search?query&num
*/
pub async fn image_search(
    state: web::Data<AppState>,
    query: web::Query<ImageSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let num = bounded(query.num, DEFAULT_IMAGE_COUNT, 1, 10, "num")?;
    let images = state.images.image_search(&query.query, num).await?;
    Ok(HttpResponse::Ok().json(json!({ "query": query.query, "images": images })))
}

/*
    GET /api/v1/city-hero?city&force
*/
pub async fn city_hero(
    state: web::Data<AppState>,
    query: web::Query<CityHeroQuery>,
) -> Result<HttpResponse, ApiError> {
    let hero = state.images.city_hero(&query.city, query.force).await?;
    Ok(HttpResponse::Ok().json(hero))
}

/*
    POST /api/v1/itinerary-images
*/
pub async fn itinerary_images(
    state: web::Data<AppState>,
    body: web::Json<ItineraryImagesRequest>,
) -> Result<HttpResponse, ApiError> {
    let results = state.images.itinerary_images(&body).await?;
    Ok(HttpResponse::Ok().json(json!({
        "city": body.city,
        "results": results,
    })))
}

/*
    POST /api/v1/generate-image
*/
pub async fn generate_image(
    state: web::Data<AppState>,
    body: web::Json<ImageGenerationRequest>,
) -> HttpResponse {
    match state.images.generate_image(&body.prompt).await {
        Ok((image, model_text)) => HttpResponse::Ok().json(json!({
            "image": image,
            "model_text": model_text,
        })),
        Err(ImageError::GenerationError { message, model_text }) => {
            log::error!("Image generation failed: {}", message);
            HttpResponse::InternalServerError().json(json!({
                "error": message,
                "model_text": model_text,
            }))
        }
        Err(e) => {
            log::error!("Image generation failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
