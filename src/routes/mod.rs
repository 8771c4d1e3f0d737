use actix_web::{error, web, HttpRequest};

use crate::error::ApiError;

pub mod assist;
pub mod health;
pub mod images;
pub mod itinerary;
pub mod maps;
pub mod suggestions;
pub mod voice;
pub mod weather;

pub const API_PREFIX: &str = "/api/v1";
const JSON_BODY_LIMIT: usize = 16 * 1024 * 1024;

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Unprocessable(err.to_string()).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Unprocessable(err.to_string()).into()
}

/// Range check for numeric query parameters, 422 when out of range.
pub(crate) fn bounded(value: Option<u32>, default: u32, min: u32, max: u32, name: &str) -> Result<u32, ApiError> {
    let value = value.unwrap_or(default);
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::Unprocessable(format!(
            "{} must be between {} and {}",
            name, min, max
        )))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(json_error),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error))
    .service(
        web::scope(API_PREFIX)
            .route("/health", web::get().to(health::health_check))
            .route("/health/services", web::get().to(health::service_status))
            // Itineraries
            .route("/itinerary", web::post().to(itinerary::generate))
            .route("/itinerary/{id}", web::get().to(itinerary::get_by_id))
            .route("/itinerary/{id}", web::delete().to(itinerary::delete_by_id))
            // Suggestions
            .route("/suggest-hotels", web::get().to(suggestions::hotels))
            .route("/suggest-flights", web::get().to(suggestions::flights))
            .route("/suggest-fashion", web::get().to(suggestions::fashion))
            // Weather and maps
            .route("/weather-forecast", web::get().to(weather::forecast))
            .route("/weather-search", web::get().to(weather::search))
            .route("/geocode-locations", web::post().to(maps::geocode_locations))
            .route("/directions", web::post().to(maps::directions))
            // Imagery
            .route("/city-images", web::get().to(images::city_images))
            .route("/image-search", web::get().to(images::image_search))
            .route("/city-hero", web::get().to(images::city_hero))
            .route("/itinerary-images", web::post().to(images::itinerary_images))
            .route("/generate-image", web::post().to(images::generate_image))
            // Assistant helpers
            .route("/smart-tips", web::get().to(assist::smart_tips))
            .route("/translate-itinerary", web::post().to(assist::translate_itinerary))
            .route("/weather-summary", web::post().to(assist::weather_summary))
            // Voice
            .service(
                web::scope("/voice/session")
                    .route("/start", web::post().to(voice::start_session))
                    .route("/{session_id}/transcribe", web::post().to(voice::transcribe))
                    .route("/{session_id}/message", web::post().to(voice::message)),
            ),
    );
}
