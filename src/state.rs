use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::memory::InMemoryItineraryStore;
use crate::db::mongo::{create_mongo_client, MongoItineraryStore};
use crate::db::{ItineraryStore, StorageError};
use crate::services::assist_service::AssistService;
use crate::services::directions_service::DirectionsClient;
use crate::services::fashion_service::FashionService;
use crate::services::gemini_service::{GeminiClient, GeminiError, GenerativeModel};
use crate::services::geocode_service::{GeocodeClient, MapsError};
use crate::services::google_auth_service::GoogleTokenProvider;
use crate::services::image_service::{GcsImageUploader, ImageService};
use crate::services::itinerary_cache::ItineraryCache;
use crate::services::itinerary_generation_service::{ItineraryGenerationConfig, ItineraryGenerator};
use crate::services::search_service::{CustomSearchClient, SearchError, WebSearch};
use crate::services::speech_service::{GoogleSpeechClient, SpeechError, SpeechServices};
use crate::services::suggestion_service::SuggestionService;
use crate::services::voice_assistant_service::VoiceAssistant;
use crate::services::weather_service::WeatherClient;

#[derive(Debug)]
pub struct StartupError(pub String);

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Startup error: {}", self.0)
    }
}

impl std::error::Error for StartupError {}

impl From<StorageError> for StartupError {
    fn from(err: StorageError) -> Self {
        StartupError(err.to_string())
    }
}

impl From<GeminiError> for StartupError {
    fn from(err: GeminiError) -> Self {
        StartupError(err.to_string())
    }
}

impl From<SearchError> for StartupError {
    fn from(err: SearchError) -> Self {
        StartupError(err.to_string())
    }
}

impl From<SpeechError> for StartupError {
    fn from(err: SpeechError) -> Self {
        StartupError(err.to_string())
    }
}

impl From<MapsError> for StartupError {
    fn from(err: MapsError) -> Self {
        StartupError(err.to_string())
    }
}

/// Outbound backends the services are built on.
pub struct Backends {
    pub model: Arc<dyn GenerativeModel>,
    pub search: Arc<dyn WebSearch>,
    pub speech: Arc<dyn SpeechServices>,
    pub store: Arc<dyn ItineraryStore>,
    pub uploader: Option<GcsImageUploader>,
}

/// Everything the route handlers share, held in `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ItineraryStore>,
    pub search: Arc<dyn WebSearch>,
    pub generator: Arc<ItineraryGenerator>,
    pub suggestions: SuggestionService,
    pub fashion: FashionService,
    pub geocoder: Arc<GeocodeClient>,
    pub weather: WeatherClient,
    pub directions: DirectionsClient,
    pub images: ImageService,
    pub assist: AssistService,
    pub voice: VoiceAssistant,
}

impl AppState {
    /// Connect the production backends described by `config`.
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let tokens = Arc::new(GoogleTokenProvider::new(config.access_token_override.clone()));

        let store: Arc<dyn ItineraryStore> = match &config.mongodb_uri {
            Some(uri) => {
                let client = create_mongo_client(uri).await?;
                log::info!("Using MongoDB database {}", config.mongodb_database);
                Arc::new(MongoItineraryStore::new(
                    client,
                    &config.mongodb_database,
                    &config.itinerary_collection,
                ))
            }
            None => {
                log::warn!("MONGODB_URI not set; itineraries are kept in memory");
                Arc::new(InMemoryItineraryStore::new())
            }
        };

        let uploader = match &config.generated_image_bucket {
            Some(bucket) => match GcsImageUploader::new(bucket.clone()).await {
                Ok(uploader) => Some(uploader),
                Err(e) => {
                    log::warn!("Generated images will not be uploaded: {}", e);
                    None
                }
            },
            None => None,
        };

        let backends = Backends {
            model: Arc::new(GeminiClient::new(&config, tokens.clone())?),
            search: Arc::new(CustomSearchClient::new(&config)?),
            speech: Arc::new(GoogleSpeechClient::new(&config, tokens)?),
            store,
            uploader,
        };
        Self::with_backends(config, backends)
    }

    pub fn with_backends(config: AppConfig, backends: Backends) -> Result<Self, StartupError> {
        let Backends {
            model,
            search,
            speech,
            store,
            uploader,
        } = backends;

        let generator = Arc::new(ItineraryGenerator::new(
            model.clone(),
            search.clone(),
            store.clone(),
            ItineraryCache::new(config.itinerary_cache_ttl_secs),
            ItineraryGenerationConfig::from_app_config(&config),
        ));
        let geocoder = Arc::new(GeocodeClient::new(&config)?);

        Ok(Self {
            suggestions: SuggestionService::new(
                model.clone(),
                search.clone(),
                store.clone(),
                config.gemini_model.clone(),
            ),
            fashion: FashionService::new(
                model.clone(),
                search.clone(),
                store.clone(),
                config.gemini_model.clone(),
            ),
            weather: WeatherClient::new(&config, geocoder.clone())?,
            directions: DirectionsClient::new(&config)?,
            images: ImageService::new(
                search.clone(),
                model.clone(),
                store.clone(),
                config.image_model.clone(),
                uploader,
            ),
            assist: AssistService::new(model, config.assist_model.clone()),
            voice: VoiceAssistant::new(speech, generator.clone()),
            generator,
            geocoder,
            store,
            search,
            config,
        })
    }
}
