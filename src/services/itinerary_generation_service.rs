use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::{ItineraryStore, StorageError};
use crate::models::itinerary::{ActivityImage, Itinerary, ItineraryMeta, StoredItinerary};
use crate::models::preferences::TripPreferences;
use crate::models::suggestions::Providers;
use crate::services::gemini_service::{GenerationRequest, GenerativeModel};
use crate::services::insights_service::compute_trip_insights;
use crate::services::itinerary_cache::{cache_key, matches_destination, ItineraryCache};
use crate::services::itinerary_normalizer::into_itinerary;
use crate::services::json_extraction::parse_model_json;
use crate::services::narration_service::generate_day_narrations;
use crate::services::search_service::WebSearch;

const ITINERARY_TOKEN_CAP: u32 = 20_000;
const IMAGES_PER_ACTIVITY: u32 = 3;
const CITY_IMAGE_COUNT: u32 = 6;

#[derive(Debug)]
pub enum GenerationError {
    InvalidPreferences(String),
    ModelError(String),
    StorageError(StorageError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::InvalidPreferences(msg) => write!(f, "{}", msg),
            GenerationError::ModelError(msg) => write!(f, "{}", msg),
            GenerationError::StorageError(err) => write!(f, "Failed to persist itinerary: {}", err),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<StorageError> for GenerationError {
    fn from(err: StorageError) -> Self {
        GenerationError::StorageError(err)
    }
}

#[derive(Debug, Clone)]
pub struct ItineraryGenerationConfig {
    pub model: String,
    pub max_attempts: u32,
    pub max_output_tokens: u32,
}

impl ItineraryGenerationConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            model: config.gemini_model.clone(),
            max_attempts: config.max_gemini_attempts.max(1),
            max_output_tokens: ITINERARY_TOKEN_CAP,
        }
    }
}

impl Default for ItineraryGenerationConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

pub struct ItineraryGenerator {
    model: Arc<dyn GenerativeModel>,
    search: Arc<dyn WebSearch>,
    store: Arc<dyn ItineraryStore>,
    cache: ItineraryCache,
    config: ItineraryGenerationConfig,
}

impl ItineraryGenerator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        search: Arc<dyn WebSearch>,
        store: Arc<dyn ItineraryStore>,
        cache: ItineraryCache,
        config: ItineraryGenerationConfig,
    ) -> Self {
        Self {
            model,
            search,
            store,
            cache,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn ItineraryStore> {
        &self.store
    }

    /// Validate, generate, enrich, persist and cache an itinerary.
    pub async fn generate(&self, prefs: &TripPreferences) -> Result<Itinerary, GenerationError> {
        prefs
            .validate()
            .map_err(GenerationError::InvalidPreferences)?;
        let day_count = prefs
            .day_count()
            .map_err(GenerationError::InvalidPreferences)?;

        let key = cache_key(prefs);
        if let Some(mut cached) = self.cache.get(&key) {
            log::info!("Serving cached itinerary for {}", prefs.destination);
            cached.meta = ItineraryMeta {
                source: "cache".to_string(),
                mode: Some("structured".to_string()),
                cache_key: Some(key),
            };
            return Ok(cached);
        }

        let mut itinerary = self.request_itinerary(prefs, day_count).await?;

        if prefs.enable_live_data {
            self.attach_activity_images(&mut itinerary).await;
            itinerary.image_urls = self.city_images(&prefs.destination).await;
        }
        itinerary.themes = prefs.themes.clone();
        itinerary.narrations = generate_day_narrations(&itinerary, prefs);
        itinerary.insights = Some(compute_trip_insights(&itinerary, prefs));
        itinerary.meta = ItineraryMeta {
            source: "gemini".to_string(),
            mode: Some("structured".to_string()),
            cache_key: None,
        };

        let id = self.persist(&mut itinerary, prefs).await?;
        log::info!(
            "Generated {}-day itinerary {} for {}",
            itinerary.days.len(),
            id,
            prefs.destination
        );

        if matches_destination(&itinerary, prefs) {
            self.cache.put(key, itinerary.clone());
        } else {
            log::warn!(
                "Not caching itinerary {}: activities stray from {}",
                id,
                prefs.destination
            );
        }
        Ok(itinerary)
    }

    async fn request_itinerary(
        &self,
        prefs: &TripPreferences,
        day_count: u32,
    ) -> Result<Itinerary, GenerationError> {
        let base_instruction = system_instruction(prefs, day_count);
        let strict = strict_instruction(&base_instruction);
        let prompt = build_prompt(prefs);
        let mut last_error: Option<String> = None;

        for attempt in 0..self.config.max_attempts {
            let instruction = if attempt == 0 {
                base_instruction.clone()
            } else {
                strict.clone()
            };
            let request = GenerationRequest::new(self.config.model.clone(), prompt.clone())
                .with_system_instruction(instruction)
                .with_sampling(0.4, 0.8, self.config.max_output_tokens)
                .with_schema(response_schema())
                .with_safety_threshold("BLOCK_NONE");

            let output = self
                .model
                .generate(&request)
                .await
                .map_err(|e| GenerationError::ModelError(e.to_string()))?;

            if output.text.trim().is_empty() {
                last_error = Some("Gemini returned an empty response".to_string());
                continue;
            }

            let raw = match parse_model_json::<Value>(&output.text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    last_error = Some(format!(
                        "Parse failure on attempt {}: expected a JSON object",
                        attempt + 1
                    ));
                    continue;
                }
                Err(e) => {
                    last_error = Some(format!("Parse failure on attempt {}: {}", attempt + 1, e));
                    continue;
                }
            };

            let created_at = Utc::now().to_rfc3339();
            return into_itinerary(raw, prefs, &created_at).map_err(|e| {
                GenerationError::ModelError(format!("Malformed itinerary from model: {}", e))
            });
        }

        Err(GenerationError::ModelError(last_error.unwrap_or_else(|| {
            "Failed to generate a complete itinerary".to_string()
        })))
    }

    /// Up to three photos per activity, searched once per distinct place.
    async fn attach_activity_images(&self, itinerary: &mut Itinerary) {
        let mut keys: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for activity in itinerary.activities() {
            if let Some(key) = image_key(&activity.location, &activity.title) {
                if seen.insert(key.to_lowercase()) {
                    keys.push(key);
                }
            }
        }

        let lookups = keys.iter().map(|key| async move {
            let query = format!("{} travel photo", key);
            let images = match self.search.search_images(&query, IMAGES_PER_ACTIVITY).await {
                Ok(results) => results
                    .iter()
                    .filter_map(|result| result.to_activity_image())
                    .collect(),
                Err(e) => {
                    log::warn!("Image search failed for '{}': {}", query, e);
                    Vec::new()
                }
            };
            (key.to_lowercase(), images)
        });
        let found: HashMap<String, Vec<ActivityImage>> = join_all(lookups).await.into_iter().collect();

        for day in itinerary.days.iter_mut() {
            for activity in day.activities.iter_mut() {
                activity.images = image_key(&activity.location, &activity.title)
                    .and_then(|key| found.get(&key.to_lowercase()).cloned())
                    .unwrap_or_default();
            }
        }
    }

    async fn city_images(&self, destination: &str) -> Vec<String> {
        let query = format!("{} travel photography", destination);
        match self.search.search_images(&query, CITY_IMAGE_COUNT).await {
            Ok(results) => results.into_iter().filter_map(|result| result.link).collect(),
            Err(e) => {
                log::warn!("City image search failed for {}: {}", destination, e);
                Vec::new()
            }
        }
    }

    async fn persist(
        &self,
        itinerary: &mut Itinerary,
        prefs: &TripPreferences,
    ) -> Result<String, GenerationError> {
        let id = itinerary
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        itinerary.id = Some(id.clone());

        let record = StoredItinerary {
            id: id.clone(),
            itinerary: itinerary.clone(),
            preferences: Some(prefs.clone()),
            providers: Providers::default(),
            updated_at: Utc::now().to_rfc3339(),
        };
        self.store.save_itinerary(&record).await?;
        Ok(id)
    }
}

fn image_key(location: &str, title: &str) -> Option<String> {
    [location, title]
        .into_iter()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

pub fn system_instruction(prefs: &TripPreferences, day_count: u32) -> String {
    format!(
        "Write terse JSON in English. Keep all strings short. \
         summary = 32 words. title = 10 words. description = 32 words. \
         Use 24h times like 09:00. Costs are integers. \
         Destination is {}, India only. \
         Mark source as \"places-api\" for real POIs, else \"ai\". \
         Each activity object MUST include keys time, title, description, location, cost, source. \
         Create exactly {} days with 3-4 activities each.",
        prefs.destination, day_count
    )
}

fn strict_instruction(base: &str) -> String {
    format!(
        "{} Every day MUST contain 3-4 activities and each activity MUST include title, \
         description, location, cost (integer or descriptive string), and source.",
        base
    )
}

pub fn build_prompt(prefs: &TripPreferences) -> String {
    let themes = if prefs.themes.is_empty() {
        "General".to_string()
    } else {
        prefs.themes_label()
    };
    let language = if prefs.language.trim().is_empty() {
        "English"
    } else {
        prefs.language.as_str()
    };
    format!(
        "Trip in {}, India for {} travellers. Dates {} to {}. Budget {} INR. Themes {}. Language {}.",
        prefs.destination,
        prefs.travellers,
        prefs.start_date,
        prefs.end_date,
        prefs.budget,
        themes,
        language
    )
}

/// Response schema constraining days and activities to well-formed objects.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "destination": { "type": "STRING" },
            "budget": { "type": "NUMBER" },
            "currency": { "type": "STRING" },
            "totalEstimatedCost": { "type": "NUMBER", "nullable": true },
            "weatherAdvisory": { "type": "STRING", "nullable": true },
            "costBreakdown": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "amount": { "type": "NUMBER" },
                        "notes": { "type": "STRING", "nullable": true }
                    },
                    "required": ["category", "amount"]
                }
            },
            "days": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "dateLabel": { "type": "STRING", "nullable": true },
                        "date": { "type": "STRING", "nullable": true },
                        "summary": { "type": "STRING" },
                        "activities": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "time": { "type": "STRING" },
                                    "title": { "type": "STRING" },
                                    "description": { "type": "STRING" },
                                    "location": { "type": "STRING" },
                                    "cost": { "type": "NUMBER" },
                                    "source": { "type": "STRING" }
                                },
                                "required": ["time", "title", "description", "location", "cost", "source"]
                            }
                        },
                        "accommodation": {
                            "type": "OBJECT",
                            "nullable": true,
                            "properties": {
                                "name": { "type": "STRING" },
                                "cost": { "type": "NUMBER", "nullable": true },
                                "notes": { "type": "STRING", "nullable": true }
                            }
                        }
                    },
                    "required": ["summary", "activities"]
                }
            },
            "meta": { "type": "OBJECT", "nullable": true }
        },
        "required": ["destination", "budget", "currency", "days"]
    })
}
