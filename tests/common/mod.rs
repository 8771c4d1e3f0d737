#![allow(dead_code)]

use actix_web::{web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use trip_planner_api::config::AppConfig;
use trip_planner_api::db::memory::InMemoryItineraryStore;
use trip_planner_api::db::ItineraryStore;
use trip_planner_api::models::images::{ImageResult, WebResult};
use trip_planner_api::routes;
use trip_planner_api::services::gemini_service::{
    GeminiError, GenerationOutput, GenerationRequest, GenerativeModel, InlineImage,
};
use trip_planner_api::services::search_service::{SearchError, WebSearch};
use trip_planner_api::services::speech_service::{SpeechError, SpeechServices};
use trip_planner_api::state::{AppState, Backends};

/// Replays scripted replies in order, then falls back to an empty text reply.
#[derive(Default)]
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<GenerationOutput, GeminiError>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeModel {
    pub fn with_text(replies: &[&str]) -> Self {
        let model = Self::default();
        for reply in replies {
            model.push(Ok(GenerationOutput::text(*reply)));
        }
        model
    }

    pub fn push(&self, reply: Result<GenerationOutput, GeminiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_image(&self, mime_type: &str, data: &[u8], text: &str) {
        self.push(Ok(GenerationOutput {
            text: text.to_string(),
            images: vec![InlineImage {
                mime_type: mime_type.to_string(),
                data: data.to_vec(),
            }],
        }));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, GeminiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerationOutput::default()))
    }
}

/// Search backend that answers every query with the same canned hits.
pub struct FakeSearch {
    pub configured: bool,
    pub images: Vec<ImageResult>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with_images(count: usize) -> Self {
        Self {
            configured: true,
            images: (0..count).map(sample_image).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_images(0)
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::empty()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search_images(&self, query: &str, num: u32) -> Result<Vec<ImageResult>, SearchError> {
        if !self.configured {
            return Err(SearchError::NotConfigured);
        }
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.images.iter().take(num as usize).cloned().collect())
    }

    async fn search_web(&self, query: &str, num: u32) -> Result<Vec<WebResult>, SearchError> {
        if !self.configured {
            return Err(SearchError::NotConfigured);
        }
        self.queries.lock().unwrap().push(query.to_string());
        Ok((0..num.min(2))
            .map(|i| WebResult {
                title: Some(format!("{} result {}", query, i + 1)),
                snippet: Some("Sunny spells with a chance of rain".to_string()),
                link: Some(format!("https://weather.test/{}", i + 1)),
                display_link: Some("weather.test".to_string()),
            })
            .collect())
    }
}

pub fn sample_image(index: usize) -> ImageResult {
    ImageResult {
        title: Some(format!("Photo {}", index + 1)),
        link: Some(format!("https://img.test/photo-{}.jpg", index + 1)),
        thumbnail: Some(format!("https://img.test/thumb-{}.jpg", index + 1)),
        context: Some("https://travel.test/gallery".to_string()),
        width: Some(1280),
        height: Some(720),
        display_link: Some("img.test".to_string()),
    }
}

pub struct FakeSpeech {
    pub available: bool,
}

#[async_trait]
impl SpeechServices for FakeSpeech {
    async fn synthesize(&self, _text: &str) -> Result<String, SpeechError> {
        if self.available {
            Ok("bXAzLWF1ZGlv".to_string())
        } else {
            Err(SpeechError::AuthError("no credentials".to_string()))
        }
    }

    async fn transcribe(&self, _audio: &[u8]) -> Result<String, SpeechError> {
        if self.available {
            Ok("Delhi".to_string())
        } else {
            Err(SpeechError::AuthError("no credentials".to_string()))
        }
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub model: Arc<FakeModel>,
    pub search: Arc<FakeSearch>,
    pub store: Arc<InMemoryItineraryStore>,
}

impl TestApp {
    pub fn new(model: FakeModel, search: FakeSearch) -> Self {
        Self::with_speech(model, search, FakeSpeech { available: true })
    }

    pub fn with_speech(model: FakeModel, search: FakeSearch, speech: FakeSpeech) -> Self {
        let model = Arc::new(model);
        let search = Arc::new(search);
        let store = Arc::new(InMemoryItineraryStore::new());

        let backends = Backends {
            model: model.clone(),
            search: search.clone(),
            speech: Arc::new(speech),
            store: store.clone() as Arc<dyn ItineraryStore>,
            uploader: None,
        };
        let state = AppState::with_backends(AppConfig::default(), backends)
            .expect("test state builds without network");

        Self {
            state: web::Data::new(state),
            model,
            search,
            store,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::configure)
    }
}

pub fn preferences(destination: &str) -> Value {
    json!({
        "origin": "Delhi",
        "destination": destination,
        "startDate": "2025-03-10",
        "endDate": "2025-03-11",
        "budget": 40000,
        "themes": ["Heritage", "Food"],
        "travellers": 2
    })
}

/// Two-day itinerary as the model would return it.
pub fn itinerary_reply(city: &str) -> String {
    json!({
        "totalEstimatedCost": 32000,
        "costBreakdown": [
            {"category": "Stay", "amount": 18000, "notes": "Two nights"},
            {"category": "Food", "amount": 8000},
            {"category": "Transport", "amount": 6000}
        ],
        "days": [
            {
                "dateLabel": "Day 1",
                "summary": "Forts and bazaars",
                "activities": [
                    {"time": "09:00", "title": "Amber Fort", "description": "Morning at the fort", "location": format!("Amber Fort, {}", city), "cost": 500, "source": "ai"},
                    {"time": "13:00", "title": "Lunch", "description": "Thali lunch", "location": format!("MI Road, {}", city), "cost": 800, "source": "ai"},
                    {"time": "17:00", "title": "Bazaar walk", "description": "Evening shopping", "location": format!("Johari Bazaar, {}", city), "cost": "Free", "source": "ai"}
                ]
            },
            {
                "dateLabel": "Day 2",
                "summary": "Palaces",
                "activities": [
                    {"time": "10:00", "title": "City Palace", "description": "Royal museum", "location": format!("City Palace, {}", city), "cost": 700, "source": "ai"},
                    {"time": "15:00", "title": "Hawa Mahal", "description": "Photo stop", "location": format!("Hawa Mahal, {}", city), "cost": 200, "source": "ai"}
                ]
            }
        ]
    })
    .to_string()
}
