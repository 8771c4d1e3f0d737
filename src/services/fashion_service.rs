//! Travel outfit suggestions for a destination, grouped by wearer.

use chrono::Utc;
use futures::future::join_all;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use url::Url;

use crate::db::ItineraryStore;
use crate::models::images::ImageResult;
use crate::models::lenient::number_from_value;
use crate::models::suggestions::{
    FashionCatalogue, FashionCategory, FashionLook, FashionSuggestions, ProviderPayload,
};
use crate::services::gemini_service::{GenerationRequest, GenerativeModel};
use crate::services::json_extraction::parse_model_json;
use crate::services::search_service::WebSearch;
use crate::services::suggestion_service::{attach_to_itinerary, SuggestionError};

const MAX_ATTEMPTS: u32 = 3;
const LOOKS_PER_CATEGORY: usize = 4;
const FASHION_TOKEN_CAP: u32 = 8192;
const SHOPPING_SEARCH_URL: &str = "https://www.google.com/search";
const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "description",
    "shopping_keywords",
    "price_in_inr",
    "style_tags",
    "weather_note",
];

const MALE_KEYWORDS: [&str; 16] = [
    "men", "male", "mens", "groom", "kurta", "pathani", "bandhgala", "waistcoat", "nehru jacket",
    "sherwani", "shirt", "trouser", "chinos", "suit", "blazer", "sherwanis",
];
const FEMALE_KEYWORDS: [&str; 19] = [
    "women", "female", "womens", "lady", "ladies", "saree", "lehenga", "gown", "dress", "anarkali",
    "salwar", "kameez", "dupatta", "kurti", "kurta set", "palazzo", "skirt", "tops", "blouse",
];
const KID_KEYWORDS: [&str; 15] = [
    "kid", "kids", "child", "children", "boy", "boys", "girl", "girls", "teen", "tween", "junior",
    "infant", "toddler", "young", "youth",
];
const ACCESSORY_KEYWORDS: [&str; 22] = [
    "bag", "backpack", "scarf", "shawl", "watch", "belt", "wallet", "sandal", "shoe", "sneaker",
    "loafer", "bracelet", "necklace", "earring", "earrings", "hat", "cap", "sunglasses", "glove",
    "gloves", "tech", "gadget",
];

#[derive(Debug)]
pub enum FashionError {
    ModelError(String),
    Exhausted(String),
    StorageError(String),
}

impl fmt::Display for FashionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FashionError::ModelError(msg) => write!(f, "{}", msg),
            FashionError::Exhausted(msg) => write!(f, "{}", msg),
            FashionError::StorageError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FashionError {}

impl From<SuggestionError> for FashionError {
    fn from(err: SuggestionError) -> Self {
        FashionError::StorageError(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct FashionQuery {
    pub city: String,
    pub season_hint: Option<String>,
    pub itinerary_id: Option<String>,
    pub budget: Option<i64>,
}

/// A look that passed validation and still needs its hero image.
struct DraftLook {
    look: FashionLook,
    image_query: String,
}

pub struct FashionService {
    model: Arc<dyn GenerativeModel>,
    search: Arc<dyn WebSearch>,
    store: Arc<dyn ItineraryStore>,
    model_name: String,
}

impl FashionService {
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

    pub async fn suggest(&self, query: &FashionQuery) -> Result<FashionSuggestions, FashionError> {
        let budget = query.budget;
        let (results, offline) = if self.search.is_configured() {
            (self.generate_catalogue(query).await?, false)
        } else {
            log::warn!("Image search is not configured; serving the offline fashion catalogue");
            (fallback_catalogue(&query.city), true)
        };

        let payload = FashionSuggestions {
            city: query.city.clone(),
            season_hint: query.season_hint.clone(),
            results,
            generated_at: Utc::now().to_rfc3339(),
            budget,
            offline,
        };

        if let Some(id) = query.itinerary_id.as_deref() {
            attach_to_itinerary(self.store.as_ref(), id, ProviderPayload::Fashion(payload.clone()))
                .await?;
        }
        Ok(payload)
    }

    async fn generate_catalogue(&self, query: &FashionQuery) -> Result<FashionCatalogue, FashionError> {
        let prompt = fashion_prompt(&query.city, query.season_hint.as_deref(), query.budget);
        let strict = format!(
            "{} Output MUST be valid JSON only. No comments or prose. Ensure each array has exactly four items.",
            prompt
        );
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_ATTEMPTS {
            let text = if attempt == 0 { &prompt } else { &strict };
            let request = GenerationRequest::new(self.model_name.clone(), text.clone())
                .with_sampling(0.4, 0.8, FASHION_TOKEN_CAP)
                .with_schema(catalogue_schema());
            let output = self
                .model
                .generate(&request)
                .await
                .map_err(|e| FashionError::ModelError(e.to_string()))?;

            let data = match parse_model_json::<Value>(&output.text) {
                Ok(data) => data,
                Err(e) => {
                    last_error = Some(format!("Fashion JSON parse failure: {}", e));
                    continue;
                }
            };
            if !is_valid_payload(&data) {
                last_error =
                    Some("Gemini fashion payload missing required structure or counts".to_string());
                continue;
            }
            match self.prepare_results(&query.city, query.budget, &data).await {
                Ok(catalogue) => return Ok(catalogue),
                Err(msg) => {
                    log::warn!("Fashion attempt {} rejected: {}", attempt + 1, msg);
                    last_error = Some(msg);
                }
            }
        }

        Err(FashionError::Exhausted(last_error.unwrap_or_else(|| {
            "Failed to generate fashion recommendations".to_string()
        })))
    }

    async fn prepare_results(
        &self,
        city: &str,
        budget: Option<i64>,
        data: &Value,
    ) -> Result<FashionCatalogue, String> {
        let mut drafts: Vec<(FashionCategory, Vec<DraftLook>)> = Vec::new();
        for category in FashionCategory::ALL {
            let entries = data
                .get(category.as_str())
                .and_then(Value::as_array)
                .filter(|entries| entries.len() == LOOKS_PER_CATEGORY)
                .ok_or_else(|| format!("Incomplete {} looks", category.as_str()))?;

            let mut seen = HashSet::new();
            let mut looks = Vec::new();
            for entry in entries {
                let draft = draft_look(entry, category, city, budget)?;
                let key = (
                    draft.look.title.to_lowercase(),
                    draft.look.shopping_keywords.to_lowercase(),
                );
                if !seen.insert(key) {
                    return Err(format!("Duplicate look detected in {}", category.as_str()));
                }
                looks.push(draft);
            }
            drafts.push((category, looks));
        }

        let images = self.fetch_images(&drafts).await;

        let mut catalogue = FashionCatalogue::default();
        for (category, looks) in drafts {
            let bucket = catalogue.looks_mut(category);
            for DraftLook { mut look, image_query } in looks {
                let hero = images
                    .get(&image_query.to_lowercase())
                    .and_then(|results| results.iter().find(|image| image.link.is_some()))
                    .ok_or_else(|| {
                        format!("No imagery for {} look '{}'", category.as_str(), look.title)
                    })?;
                look.image_url = hero.link.clone();
                look.image_thumbnail = hero.thumbnail.clone();
                look.image_context = hero.context.clone();
                bucket.push(look);
            }
        }
        Ok(catalogue)
    }

    /// One search per distinct query; failures count as no images.
    async fn fetch_images(
        &self,
        drafts: &[(FashionCategory, Vec<DraftLook>)],
    ) -> HashMap<String, Vec<ImageResult>> {
        let mut queries: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for (_, looks) in drafts {
            for draft in looks {
                let key = draft.image_query.trim().to_lowercase();
                if seen.insert(key) {
                    queries.push(draft.image_query.clone());
                }
            }
        }

        let lookups = queries.iter().map(|query| async move {
            let images = self.search.search_images(query, 4).await.unwrap_or_else(|e| {
                log::warn!("Fashion image search failed for '{}': {}", query, e);
                Vec::new()
            });
            (query.trim().to_lowercase(), images)
        });
        join_all(lookups).await.into_iter().collect()
    }
}

fn draft_look(
    entry: &Value,
    category: FashionCategory,
    city: &str,
    budget: Option<i64>,
) -> Result<DraftLook, String> {
    let name = category.as_str();
    let entry = entry
        .as_object()
        .ok_or_else(|| format!("Invalid entry in {}", name))?;

    let title = text_field(entry, "title");
    let description = text_field(entry, "description");
    let weather_note = text_field(entry, "weather_note");
    let shopping_keywords = text_field(entry, "shopping_keywords");
    if title.is_empty() || description.is_empty() || shopping_keywords.is_empty() || weather_note.is_empty()
    {
        return Err(format!("Missing fields in {} look", name));
    }

    let style_tags: Vec<String> = entry
        .get("style_tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let price = entry
        .get("price_in_inr")
        .and_then(number_from_value)
        .map(|price| price as i64)
        .ok_or_else(|| format!("Missing price for {} look '{}'", name, title))?;
    if let Some(budget) = budget.filter(|budget| *budget > 0) {
        if price > budget {
            return Err(format!("Look '{}' exceeds budget in {}", title, name));
        }
    }

    let inferred = infer_bucket(&Value::Object(entry.clone()), category);
    if inferred != category {
        log::debug!(
            "Look '{}' listed under {} reads like {}",
            title,
            name,
            inferred.as_str()
        );
    }

    let image_query = [shopping_keywords.as_str(), city, name, "travel outfit"]
        .iter()
        .filter(|term| !term.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Ok(DraftLook {
        look: FashionLook {
            shopping_url: shopping_url(&shopping_keywords),
            title,
            description,
            style_tags,
            shopping_keywords,
            price_in_inr: price,
            weather_note,
            image_url: None,
            image_thumbnail: None,
            image_context: None,
        },
        image_query,
    })
}

fn text_field(entry: &Map<String, Value>, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub fn shopping_url(keywords: &str) -> Option<String> {
    let keywords = keywords.trim();
    if keywords.is_empty() {
        return None;
    }
    Url::parse_with_params(SHOPPING_SEARCH_URL, &[("q", keywords)])
        .ok()
        .map(String::from)
}

/// Structural check before any per-look work: four categories of four complete looks.
pub fn is_valid_payload(payload: &Value) -> bool {
    let Some(payload) = payload.as_object() else {
        return false;
    };
    FashionCategory::ALL.iter().all(|category| {
        let Some(entries) = payload.get(category.as_str()).and_then(Value::as_array) else {
            return false;
        };
        entries.len() == LOOKS_PER_CATEGORY
            && entries.iter().all(|entry| {
                let Some(entry) = entry.as_object() else {
                    return false;
                };
                REQUIRED_FIELDS.iter().all(|field| entry.contains_key(*field))
                    && ["title", "description", "shopping_keywords", "weather_note"]
                        .iter()
                        .all(|field| {
                            entry
                                .get(*field)
                                .and_then(Value::as_str)
                                .is_some_and(|text| !text.trim().is_empty())
                        })
            })
    })
}

fn age_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d+\s*(?:yrs?|years?)\b").expect("valid age pattern"))
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z]+").expect("valid word pattern"))
}

fn look_text(entry: &Value) -> String {
    let mut parts: Vec<&str> = ["title", "description", "shopping_keywords", "notes"]
        .iter()
        .filter_map(|field| entry.get(*field).and_then(Value::as_str))
        .collect();
    if let Some(tags) = entry.get("style_tags").and_then(Value::as_array) {
        parts.extend(tags.iter().filter_map(Value::as_str));
    }
    parts.join(" ").to_lowercase()
}

/// Words of the text plus every adjacent word pair.
fn tokens(text: &str) -> HashSet<String> {
    let words: Vec<&str> = word_pattern().find_iter(text).map(|m| m.as_str()).collect();
    let mut tokens: HashSet<String> = words.iter().map(|word| word.to_string()).collect();
    tokens.extend(words.windows(2).map(|pair| pair.join(" ")));
    tokens
}

/// Guess which wearer a look is for from its wording.
pub fn infer_bucket(entry: &Value, fallback: FashionCategory) -> FashionCategory {
    let text = look_text(entry);
    if text.trim().is_empty() {
        return fallback;
    }

    let tokens = tokens(&text);
    let hits = |keywords: &[&str]| keywords.iter().any(|keyword| tokens.contains(*keyword));
    let male = hits(&MALE_KEYWORDS);
    let female = hits(&FEMALE_KEYWORDS);
    let kid = hits(&KID_KEYWORDS) || tokens.contains("age") || age_pattern().is_match(&text);
    let accessory = hits(&ACCESSORY_KEYWORDS);

    if kid && !(male || female) {
        return FashionCategory::Kids;
    }
    if female && !male {
        return FashionCategory::Women;
    }
    if male && !female {
        return FashionCategory::Men;
    }
    if accessory && !(male || female || kid) {
        return FashionCategory::Accessories;
    }

    let ordered = [
        (female, FashionCategory::Women),
        (male, FashionCategory::Men),
        (kid, FashionCategory::Kids),
        (accessory, FashionCategory::Accessories),
    ];
    ordered
        .into_iter()
        .find(|(hit, bucket)| *hit && *bucket != fallback)
        .map(|(_, bucket)| bucket)
        .unwrap_or(fallback)
}

pub fn fashion_prompt(city: &str, season_hint: Option<&str>, budget: Option<i64>) -> String {
    let hint = season_hint
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .map(|hint| format!("Season hint: {}.", hint))
        .unwrap_or_default();
    let budget_text = match budget.filter(|budget| *budget > 0) {
        Some(budget) => format!(
            "Ensure each recommendation keeps the primary item cost at or below INR {}.",
            budget
        ),
        None => "Stay budget-conscious with mid-range pricing.".to_string(),
    };
    format!(
        "You are a fashion concierge for {}, India. \
         Produce JSON with four keys (men, women, kids, accessories). \
         Each key must contain exactly four suggestions with fields title, description, weather_note, style_tags, shopping_keywords, price_in_inr. \
         Use clearly gendered looks for men versus women, family-friendly picks for kids, and luggage/gear for accessories. \
         For kids, focus on age-flexible options suitable for families. \
         For accessories, include items like bags, scarves, tech essentials, or travel add-ons. \
         Keep descriptions concise, practical for travel, and note any weather considerations. \
         {} {}",
        city, hint, budget_text
    )
}

fn look_array_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" },
                "style_tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                "shopping_keywords": { "type": "STRING" },
                "price_in_inr": { "type": "NUMBER" },
                "weather_note": { "type": "STRING" }
            },
            "required": REQUIRED_FIELDS
        },
        "minItems": LOOKS_PER_CATEGORY,
        "maxItems": LOOKS_PER_CATEGORY
    })
}

fn catalogue_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "men": look_array_schema(),
            "women": look_array_schema(),
            "kids": look_array_schema(),
            "accessories": look_array_schema()
        },
        "required": ["men", "women", "kids", "accessories"]
    })
}

struct CuratedLook {
    title: &'static str,
    description: &'static str,
    style_tags: &'static [&'static str],
    keywords: &'static str,
    price: i64,
    weather_note: &'static str,
}

const CURATED: [(FashionCategory, [CuratedLook; 4]); 4] = [
    (
        FashionCategory::Men,
        [
            CuratedLook {
                title: "Linen Shirt and Chinos",
                description: "Breathable linen shirt with light chinos ideal for evenings in {city}.",
                style_tags: &["smart casual", "linen", "lightweight"],
                keywords: "men linen shirt chinos {city}",
                price: 6000,
                weather_note: "Keeps you cool during warm afternoons.",
            },
            CuratedLook {
                title: "Heritage Kurta Set",
                description: "Printed cotton kurta with churidar suited for heritage walks in {city}.",
                style_tags: &["ethnic", "cotton", "breathable"],
                keywords: "men cotton kurta set {city}",
                price: 4500,
                weather_note: "Comfortable for humid mornings.",
            },
            CuratedLook {
                title: "Evening Bandhgala",
                description: "Lightweight bandhgala jacket for fine dining around {city}.",
                style_tags: &["evening", "tailored"],
                keywords: "men bandhgala evening {city}",
                price: 7200,
                weather_note: "Adds warmth for breezy nights.",
            },
            CuratedLook {
                title: "Monsoon Travel Jacket",
                description: "Water-resistant travel jacket with concealed hood for sudden showers.",
                style_tags: &["outerwear", "travel", "water resistant"],
                keywords: "men travel jacket water resistant {city}",
                price: 5800,
                weather_note: "Shields you from surprise rain.",
            },
        ],
    ),
    (
        FashionCategory::Women,
        [
            CuratedLook {
                title: "Floral Kurti and Palazzo Set",
                description: "Airy kurti with palazzo pants for market strolls in {city}.",
                style_tags: &["ethnic fusion", "lightweight"],
                keywords: "women floral kurti palazzo {city}",
                price: 5200,
                weather_note: "Flowy silhouette keeps you cool.",
            },
            CuratedLook {
                title: "Evening Silk Saree",
                description: "Regal silk saree perfect for cultural evenings in {city}.",
                style_tags: &["evening", "silk", "heritage"],
                keywords: "women silk saree evening {city}",
                price: 8500,
                weather_note: "Light silk drape works for indoor venues.",
            },
            CuratedLook {
                title: "Layered Maxi Dress",
                description: "Soft maxi dress paired with a shrug for day-to-night transitions.",
                style_tags: &["maxi", "layered", "travel"],
                keywords: "women maxi dress travel {city}",
                price: 4800,
                weather_note: "Shrug adds warmth for breezy nights.",
            },
            CuratedLook {
                title: "Heritage Jutti Flats",
                description: "Embroidered juttis that cushion long heritage walks in {city}.",
                style_tags: &["footwear", "heritage"],
                keywords: "women jutti flats {city}",
                price: 2600,
                weather_note: "Closed toe protects against dust.",
            },
        ],
    ),
    (
        FashionCategory::Kids,
        [
            CuratedLook {
                title: "Cotton Kurta and Dhoti Set",
                description: "Soft cotton kurta-dhoti set allowing free movement for kids.",
                style_tags: &["ethnic", "cotton"],
                keywords: "kids cotton kurta dhoti {city}",
                price: 2500,
                weather_note: "Breathable fabric for warm afternoons.",
            },
            CuratedLook {
                title: "Travel Jogger Set",
                description: "Stretchy joggers with graphic tee for sightseeing days.",
                style_tags: &["casual", "stretch"],
                keywords: "kids travel jogger set {city}",
                price: 2200,
                weather_note: "Lightweight knit keeps kids comfy.",
            },
            CuratedLook {
                title: "Rain-Ready Poncho",
                description: "Foldable poncho with playful print for sudden rain.",
                style_tags: &["outerwear", "rainwear"],
                keywords: "kids rain poncho {city}",
                price: 1500,
                weather_note: "Protects from monsoon drizzle.",
            },
            CuratedLook {
                title: "Adventure Sandals",
                description: "Grippy sandals built for theme parks and fort climbs.",
                style_tags: &["footwear", "adventure"],
                keywords: "kids adventure sandals {city}",
                price: 1800,
                weather_note: "Open design keeps feet cool.",
            },
        ],
    ),
    (
        FashionCategory::Accessories,
        [
            CuratedLook {
                title: "Heritage Sling Bag",
                description: "Compact sling bag with secure pockets for day trips.",
                style_tags: &["bag", "travel"],
                keywords: "travel sling bag {city}",
                price: 2800,
                weather_note: "Water-repellent finish for light rain.",
            },
            CuratedLook {
                title: "Monsoon Travel Umbrella",
                description: "Wind-resistant compact umbrella for unpredictable showers.",
                style_tags: &["umbrella", "monsoon"],
                keywords: "travel umbrella {city}",
                price: 1500,
                weather_note: "Essential for sudden downpours.",
            },
            CuratedLook {
                title: "Cooling Scarf",
                description: "Quick-dry scarf that doubles as sun protection.",
                style_tags: &["scarf", "sun protection"],
                keywords: "cooling scarf travel {city}",
                price: 1200,
                weather_note: "Soak and wring to stay cool in heat.",
            },
            CuratedLook {
                title: "Polarised Sunglasses",
                description: "Polarised shades with UV protection for bright days.",
                style_tags: &["sunglasses", "uv protection"],
                keywords: "polarised sunglasses travel {city}",
                price: 3200,
                weather_note: "Reduces glare during noon walks.",
            },
        ],
    ),
];

/// Curated looks used when image search is unavailable.
pub fn fallback_catalogue(city: &str) -> FashionCatalogue {
    let city = if city.trim().is_empty() {
        "the destination"
    } else {
        city.trim()
    };
    let mut catalogue = FashionCatalogue::default();
    for (category, looks) in CURATED.iter() {
        let bucket = catalogue.looks_mut(*category);
        for curated in looks {
            let keywords = curated.keywords.replace("{city}", city);
            bucket.push(FashionLook {
                title: curated.title.to_string(),
                description: curated.description.replace("{city}", city),
                style_tags: curated.style_tags.iter().map(|tag| tag.to_string()).collect(),
                shopping_url: shopping_url(&keywords),
                shopping_keywords: keywords,
                price_in_inr: curated.price,
                weather_note: curated.weather_note.to_string(),
                image_url: None,
                image_thumbnail: None,
                image_context: None,
            });
        }
    }
    catalogue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look(title: &str, keywords: &str, tags: &[&str]) -> Value {
        json!({
            "title": title,
            "description": "Easy to pack.",
            "shopping_keywords": keywords,
            "price_in_inr": 2500,
            "style_tags": tags,
            "weather_note": "Breathable."
        })
    }

    #[test]
    fn test_infer_bucket() {
        assert_eq!(
            infer_bucket(&look("Silk Saree", "silk saree", &[]), FashionCategory::Men),
            FashionCategory::Women
        );
        assert_eq!(
            infer_bucket(&look("Bandhgala Jacket", "bandhgala", &[]), FashionCategory::Women),
            FashionCategory::Men
        );
        assert_eq!(
            infer_bucket(&look("Play set", "cotton set for 6 years", &[]), FashionCategory::Men),
            FashionCategory::Kids
        );
        assert_eq!(
            infer_bucket(&look("Sling", "travel sling", &["bag"]), FashionCategory::Men),
            FashionCategory::Accessories
        );
        assert_eq!(
            infer_bucket(&json!({}), FashionCategory::Kids),
            FashionCategory::Kids
        );
    }

    #[test]
    fn test_payload_validation_requires_four_complete_looks() {
        let four = vec![
            look("A", "a", &[]),
            look("B", "b", &[]),
            look("C", "c", &[]),
            look("D", "d", &[]),
        ];
        let valid = json!({ "men": four, "women": four, "kids": four, "accessories": four });
        assert!(is_valid_payload(&valid));

        let mut short = valid.clone();
        short["kids"].as_array_mut().unwrap().pop();
        assert!(!is_valid_payload(&short));

        let mut blank = valid.clone();
        blank["men"][0]["weather_note"] = json!("  ");
        assert!(!is_valid_payload(&blank));

        assert!(!is_valid_payload(&json!([])));
    }

    #[test]
    fn test_draft_look_rejects_over_budget() {
        let entry = look("Saree", "silk saree", &["evening"]);
        let err = draft_look(&entry, FashionCategory::Women, "Jaipur", Some(2000))
            .err()
            .unwrap();
        assert_eq!(err, "Look 'Saree' exceeds budget in women");

        let draft = draft_look(&entry, FashionCategory::Women, "Jaipur", None).unwrap();
        assert_eq!(draft.image_query, "silk saree Jaipur women travel outfit");
        assert_eq!(
            draft.look.shopping_url.as_deref(),
            Some("https://www.google.com/search?q=silk+saree")
        );
    }

    #[test]
    fn test_fallback_catalogue_is_complete() {
        let catalogue = fallback_catalogue("Kochi");
        for category in FashionCategory::ALL {
            assert_eq!(catalogue.looks(category).len(), LOOKS_PER_CATEGORY);
        }
        assert_eq!(catalogue.men[0].shopping_keywords, "men linen shirt chinos Kochi");
        assert!(catalogue.women[0].description.ends_with("in Kochi."));
    }
}
