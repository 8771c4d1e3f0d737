use std::env;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_ITINERARY_CACHE_TTL_SECS: i64 = 6 * 3600;

/// Runtime settings, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub gcp_project_id: Option<String>,
    pub gcp_location: String,
    pub gcp_global_location: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub assist_model: String,
    pub image_model: String,
    pub max_gemini_attempts: u32,
    pub maps_api_key: Option<String>,
    pub custom_search_key: Option<String>,
    pub custom_search_cx: Option<String>,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub itinerary_collection: String,
    pub generated_image_bucket: Option<String>,
    pub itinerary_cache_ttl_secs: i64,
    pub access_token_override: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            gcp_project_id: None,
            gcp_location: "us-central1".to_string(),
            gcp_global_location: "global".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            assist_model: "gemini-2.0-flash".to_string(),
            image_model: "gemini-2.5-flash-image-preview".to_string(),
            max_gemini_attempts: 1,
            maps_api_key: None,
            custom_search_key: None,
            custom_search_cx: None,
            mongodb_uri: None,
            mongodb_database: "TripPlanner".to_string(),
            itinerary_collection: "itineraries".to_string(),
            generated_image_bucket: None,
            itinerary_cache_ttl_secs: DEFAULT_ITINERARY_CACHE_TTL_SECS,
            access_token_override: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let gcp_global_location = env_string("GCP_GLOBAL_LOCATION")
            .or_else(|| env_string("GCP_LOCATION"))
            .unwrap_or(defaults.gcp_global_location);

        Self {
            host: env_string("HOST").unwrap_or(defaults.host),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            cors_origins: env_string("CORS_ALLOW_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            gcp_project_id: env_string("GCP_PROJECT_ID")
                .or_else(|| env_string("GOOGLE_CLOUD_PROJECT")),
            gcp_location: env_string("GCP_LOCATION").unwrap_or(defaults.gcp_location),
            gcp_global_location,
            gemini_api_key: env_string("GEMINI_API_KEY"),
            gemini_model: env_string("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            assist_model: env_string("GEMINI_ASSIST_MODEL").unwrap_or(defaults.assist_model),
            image_model: env_string("IMAGE_MODEL").unwrap_or(defaults.image_model),
            max_gemini_attempts: env_parsed("MAX_GEMINI_ATTEMPTS")
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.max_gemini_attempts),
            maps_api_key: ["GOOGLE_MAPS_API_KEY", "MAPS_API_KEY", "VITE_MAPS_API_KEY"]
                .iter()
                .find_map(|key| env_string(key)),
            custom_search_key: env_string("GOOGLE_CUSTOM_SEARCH_KEY"),
            custom_search_cx: env_string("GOOGLE_CUSTOM_SEARCH_CX"),
            mongodb_uri: env_string("MONGODB_URI"),
            mongodb_database: env_string("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            itinerary_collection: env_string("ITINERARY_COLLECTION")
                .unwrap_or(defaults.itinerary_collection),
            generated_image_bucket: env_string("GENERATED_IMAGE_BUCKET"),
            itinerary_cache_ttl_secs: env_parsed("ITINERARY_CACHE_TTL_SECS")
                .unwrap_or(defaults.itinerary_cache_ttl_secs),
            access_token_override: env_string("GOOGLE_CLOUD_ACCESS_TOKEN"),
        }
    }
}

/// Non-empty, trimmed value of an environment variable.
fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|value| value.parse().ok())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
