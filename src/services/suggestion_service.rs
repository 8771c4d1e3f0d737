use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::db::{ItineraryStore, StorageError};
use crate::models::preferences::parse_iso_date;
use crate::models::suggestions::{
    FlightOption, FlightSuggestions, HotelOption, HotelSuggestions, ProviderPayload,
};
use crate::services::gemini_service::{GenerationRequest, GenerativeModel};
use crate::services::json_extraction::parse_model_json;
use crate::services::search_service::WebSearch;

const SUGGESTION_TOKEN_CAP: u32 = 2048;
const HOTEL_FALLBACK_COUNT: usize = 4;
const FLIGHT_FALLBACK_COUNT: usize = 3;

#[derive(Debug)]
pub enum SuggestionError {
    ModelError(String),
    ParseError(String),
    StorageError(StorageError),
}

impl fmt::Display for SuggestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionError::ModelError(msg) => write!(f, "{}", msg),
            SuggestionError::ParseError(msg) => write!(f, "Could not read suggestions: {}", msg),
            SuggestionError::StorageError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SuggestionError {}

impl From<StorageError> for SuggestionError {
    fn from(err: StorageError) -> Self {
        SuggestionError::StorageError(err)
    }
}

#[derive(Debug, Deserialize)]
pub struct HotelQuery {
    pub city: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub budget: i64,
    #[serde(default = "default_hotel_travellers")]
    pub travellers: u32,
    pub itinerary_id: Option<String>,
}

fn default_hotel_travellers() -> u32 {
    2
}

#[derive(Debug, Deserialize)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub depart: String,
    pub ret: Option<String>,
    #[serde(default = "default_flight_travellers")]
    pub travellers: u32,
    pub itinerary_id: Option<String>,
    pub budget: Option<i64>,
}

fn default_flight_travellers() -> u32 {
    1
}

/// Hotel and flight options drafted by Gemini and filtered against the budget.
pub struct SuggestionService {
    model: Arc<dyn GenerativeModel>,
    search: Arc<dyn WebSearch>,
    store: Arc<dyn ItineraryStore>,
    model_name: String,
}

impl SuggestionService {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        search: Arc<dyn WebSearch>,
        store: Arc<dyn ItineraryStore>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            model,
            search,
            store,
            model_name: model_name.into(),
        }
    }

    pub async fn suggest_hotels(&self, query: &HotelQuery) -> Result<HotelSuggestions, SuggestionError> {
        let nights = nights_between(&query.start_date, &query.end_date);
        let nightly_cap = (query.budget > 0).then(|| query.budget as f64 / nights as f64);

        let prompt = hotel_prompt(query, nightly_cap);
        let data = self.ask_for_list(prompt, hotel_schema()).await?;

        let raw: Vec<HotelOption> = data
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value::<HotelOption>(item).ok())
            .collect();

        let within_cap: Vec<HotelOption> = raw
            .iter()
            .filter(|hotel| !hotel.name.trim().is_empty())
            .filter(|hotel| match (nightly_cap, hotel.approx_price_in_inr) {
                (Some(cap), Some(price)) if price > 0.0 => price <= cap,
                _ => true,
            })
            .cloned()
            .collect();

        let results = if within_cap.is_empty() {
            cheapest_hotels(raw, HOTEL_FALLBACK_COUNT)
        } else {
            join_all(
                within_cap
                    .into_iter()
                    .map(|hotel| self.with_hotel_image(hotel, &query.city)),
            )
            .await
        };

        let payload = HotelSuggestions {
            city: query.city.clone(),
            start: query.start_date.clone(),
            end: query.end_date.clone(),
            travellers: query.travellers,
            budget: query.budget,
            results,
            generated_at: Utc::now().to_rfc3339(),
        };

        if let Some(id) = query.itinerary_id.as_deref() {
            self.attach(id, ProviderPayload::Hotels(payload.clone())).await?;
        }
        Ok(payload)
    }

    pub async fn suggest_flights(&self, query: &FlightQuery) -> Result<FlightSuggestions, SuggestionError> {
        let prompt = flight_prompt(query);
        let data = self.ask_for_list(prompt, flight_schema()).await?;

        let options: Vec<FlightOption> = data
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value::<FlightOption>(item).ok())
            .collect();

        let budget = query.budget.filter(|budget| *budget > 0);
        let mut results: Vec<FlightOption> = options
            .iter()
            .filter(|option| match (budget, option.price_in_inr) {
                (Some(budget), Some(price)) if price > 0.0 => price <= budget as f64,
                _ => true,
            })
            .cloned()
            .collect();
        if results.is_empty() {
            results = options.into_iter().take(FLIGHT_FALLBACK_COUNT).collect();
        }

        let payload = FlightSuggestions {
            origin: query.origin.clone(),
            destination: query.destination.clone(),
            depart: query.depart.clone(),
            return_date: query.ret.clone(),
            travellers: query.travellers,
            budget: query.budget,
            results,
            generated_at: Utc::now().to_rfc3339(),
        };

        if let Some(id) = query.itinerary_id.as_deref() {
            self.attach(id, ProviderPayload::Flights(payload.clone())).await?;
        }
        Ok(payload)
    }

    async fn ask_for_list(&self, prompt: String, schema: Value) -> Result<Vec<Value>, SuggestionError> {
        let request = GenerationRequest::new(self.model_name.clone(), prompt)
            .with_sampling(0.4, 0.8, SUGGESTION_TOKEN_CAP)
            .with_schema(schema);
        let output = self
            .model
            .generate(&request)
            .await
            .map_err(|e| SuggestionError::ModelError(e.to_string()))?;

        if output.text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match parse_model_json::<Value>(&output.text) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(other) => Err(SuggestionError::ParseError(format!(
                "expected a JSON array, got {}",
                kind_of(&other)
            ))),
            Err(e) => Err(SuggestionError::ParseError(e.to_string())),
        }
    }

    async fn with_hotel_image(&self, mut hotel: HotelOption, city: &str) -> HotelOption {
        let query = format!("{} {} hotel", hotel.name, city);
        match self.search.search_images(&query, 3).await {
            Ok(images) => {
                if let Some(image) = images.into_iter().find(|image| image.link.is_some()) {
                    hotel.image_url = image.link;
                    hotel.image_thumbnail = image.thumbnail;
                    hotel.image_context = image.context;
                }
            }
            Err(e) => log::warn!("Hotel image search failed for '{}': {}", query, e),
        }
        hotel
    }

    pub(crate) async fn attach(&self, id: &str, payload: ProviderPayload) -> Result<(), SuggestionError> {
        attach_to_itinerary(self.store.as_ref(), id, payload).await
    }
}

/// Stores a provider payload on an itinerary. A missing itinerary only warns.
pub async fn attach_to_itinerary(
    store: &dyn ItineraryStore,
    id: &str,
    payload: ProviderPayload,
) -> Result<(), SuggestionError> {
    let kind = payload.field();
    match store.attach_provider(id, payload).await {
        Ok(()) => Ok(()),
        Err(StorageError::NotFound(_)) => {
            log::warn!("Skipping {} attachment: itinerary {} not found", kind, id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Nights between check-in and checkout, at least one.
pub fn nights_between(start: &str, end: &str) -> i64 {
    match (parse_iso_date(start), parse_iso_date(end)) {
        (Some(start), Some(end)) => (end - start).num_days().max(1),
        _ => 1,
    }
}

fn cheapest_hotels(mut hotels: Vec<HotelOption>, count: usize) -> Vec<HotelOption> {
    hotels.sort_by(|a, b| {
        let a = a.approx_price_in_inr.unwrap_or(f64::INFINITY);
        let b = b.approx_price_in_inr.unwrap_or(f64::INFINITY);
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    });
    hotels.truncate(count);
    hotels
}

fn hotel_prompt(query: &HotelQuery, nightly_cap: Option<f64>) -> String {
    let budget_clause = match nightly_cap {
        Some(cap) => format!(
            "Keep nightly rates at or under INR {} whenever possible.",
            cap as i64
        ),
        None => "Stay within mid-range, budget-friendly price points suitable for the itinerary."
            .to_string(),
    };
    format!(
        "List 4-6 real hotels in {}, India for {} travellers, check-in {} checkout {}. \
         Provide short JSON with fields name, neighbourhood, approx_price_in_inr (integer), \
         rating (0-5), tags, url, confidence (0-1). {}",
        query.city, query.travellers, query.start_date, query.end_date, budget_clause
    )
}

fn flight_prompt(query: &FlightQuery) -> String {
    let budget_clause = match query.budget.filter(|budget| *budget > 0) {
        Some(budget) => format!(
            "Total fare for all {} travellers must be at or below INR {}.",
            query.travellers, budget
        ),
        None => "Keep fares budget-friendly.".to_string(),
    };
    let return_text = match query.ret.as_deref().filter(|ret| !ret.trim().is_empty()) {
        Some(ret) => format!("return on {}", ret),
        None => "one-way".to_string(),
    };
    format!(
        "List 3-4 real flight options from {} to {} departing {} ({}). \
         Include airline, flight_number, depart_time (local), arrival_time (local), duration, \
         stops summary, price_in_inr (total for {} travellers), booking_url, notes. \
         {} Prefer reputable carriers and sensible layovers under 3 hours.",
        query.origin, query.destination, query.depart, return_text, query.travellers, budget_clause
    )
}

fn hotel_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "neighbourhood": { "type": "STRING", "nullable": true },
                "approx_price_in_inr": { "type": "NUMBER" },
                "rating": { "type": "NUMBER", "nullable": true },
                "url": { "type": "STRING", "nullable": true },
                "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                "confidence": { "type": "NUMBER" }
            },
            "required": ["name", "approx_price_in_inr", "confidence"]
        },
        "maxItems": 6
    })
}

fn flight_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "airline": { "type": "STRING" },
                "flight_number": { "type": "STRING", "nullable": true },
                "depart_time": { "type": "STRING" },
                "arrival_time": { "type": "STRING" },
                "duration": { "type": "STRING" },
                "stops": { "type": "STRING" },
                "price_in_inr": { "type": "NUMBER" },
                "booking_url": { "type": "STRING", "nullable": true },
                "notes": { "type": "STRING", "nullable": true }
            },
            "required": ["airline", "depart_time", "arrival_time", "duration", "price_in_inr"]
        },
        "maxItems": 5
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(name: &str, price: Option<f64>) -> HotelOption {
        serde_json::from_value(json!({ "name": name, "approx_price_in_inr": price })).unwrap()
    }

    #[test]
    fn test_nights_between() {
        assert_eq!(nights_between("2025-03-10", "2025-03-13"), 3);
        assert_eq!(nights_between("2025-03-10", "2025-03-10"), 1);
        assert_eq!(nights_between("soon", "2025-03-10"), 1);
    }

    #[test]
    fn test_cheapest_hotels_puts_unpriced_last() {
        let hotels = vec![
            hotel("Unpriced", None),
            hotel("Palace", Some(25_000.0)),
            hotel("Hostel", Some(900.0)),
            hotel("Haveli", Some(6_000.0)),
            hotel("Resort", Some(14_000.0)),
        ];
        let names: Vec<String> = cheapest_hotels(hotels, 4).into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Hostel", "Haveli", "Resort", "Palace"]);
    }

    #[test]
    fn test_flight_prompt_budget_and_return() {
        let query = FlightQuery {
            origin: "Delhi".to_string(),
            destination: "Goa".to_string(),
            depart: "2025-12-20".to_string(),
            ret: Some("2025-12-27".to_string()),
            travellers: 2,
            itinerary_id: None,
            budget: Some(30_000),
        };
        let prompt = flight_prompt(&query);
        assert!(prompt.contains("departing 2025-12-20 (return on 2025-12-27)"));
        assert!(prompt.contains("Total fare for all 2 travellers must be at or below INR 30000."));
    }

    #[test]
    fn test_hotel_prompt_without_budget() {
        let query = HotelQuery {
            city: "Jaipur".to_string(),
            start_date: "2025-03-10".to_string(),
            end_date: "2025-03-12".to_string(),
            budget: 0,
            travellers: 2,
            itinerary_id: None,
        };
        assert!(hotel_prompt(&query, None).ends_with("price points suitable for the itinerary."));
        assert!(hotel_prompt(&query, Some(7_500.9)).contains("at or under INR 7500"));
    }
}
