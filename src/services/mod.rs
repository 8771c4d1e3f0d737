pub mod assist_service;
pub mod directions_service;
pub mod fashion_service;
pub mod gemini_service;
pub mod geocode_service;
pub mod google_auth_service;
pub mod image_service;
pub mod insights_service;
pub mod itinerary_cache;
pub mod itinerary_generation_service;
pub mod itinerary_normalizer;
pub mod json_extraction;
pub mod narration_service;
pub mod search_service;
pub mod speech_service;
pub mod suggestion_service;
pub mod voice_assistant_service;
pub mod weather_service;
