use serde::{Deserialize, Serialize};

use crate::models::lenient;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HotelOption {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub neighbourhood: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub approx_price_in_inr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_context: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelSuggestions {
    pub city: String,
    pub start: String,
    pub end: String,
    pub travellers: u32,
    pub budget: i64,
    pub results: Vec<HotelOption>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FlightOption {
    #[serde(default)]
    pub airline: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub depart_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub stops: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub price_in_inr: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub booking_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSuggestions {
    pub origin: String,
    pub destination: String,
    pub depart: String,
    #[serde(rename = "return")]
    pub return_date: Option<String>,
    pub travellers: u32,
    pub budget: Option<i64>,
    pub results: Vec<FlightOption>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FashionCategory {
    Men,
    Women,
    Kids,
    Accessories,
}

impl FashionCategory {
    pub const ALL: [FashionCategory; 4] = [
        FashionCategory::Men,
        FashionCategory::Women,
        FashionCategory::Kids,
        FashionCategory::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FashionCategory::Men => "men",
            FashionCategory::Women => "women",
            FashionCategory::Kids => "kids",
            FashionCategory::Accessories => "accessories",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FashionLook {
    pub title: String,
    pub description: String,
    pub style_tags: Vec<String>,
    pub shopping_keywords: String,
    pub shopping_url: Option<String>,
    pub price_in_inr: i64,
    pub weather_note: String,
    pub image_url: Option<String>,
    pub image_thumbnail: Option<String>,
    pub image_context: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct FashionCatalogue {
    pub men: Vec<FashionLook>,
    pub women: Vec<FashionLook>,
    pub kids: Vec<FashionLook>,
    pub accessories: Vec<FashionLook>,
}

impl FashionCatalogue {
    pub fn looks_mut(&mut self, category: FashionCategory) -> &mut Vec<FashionLook> {
        match category {
            FashionCategory::Men => &mut self.men,
            FashionCategory::Women => &mut self.women,
            FashionCategory::Kids => &mut self.kids,
            FashionCategory::Accessories => &mut self.accessories,
        }
    }

    pub fn looks(&self, category: FashionCategory) -> &[FashionLook] {
        match category {
            FashionCategory::Men => &self.men,
            FashionCategory::Women => &self.women,
            FashionCategory::Kids => &self.kids,
            FashionCategory::Accessories => &self.accessories,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FashionSuggestions {
    pub city: String,
    #[serde(rename = "season_hint")]
    pub season_hint: Option<String>,
    pub results: FashionCatalogue,
    pub generated_at: String,
    pub budget: Option<i64>,
    #[serde(default)]
    pub offline: bool,
}

/// Suggestions attached to a stored itinerary, one slot per provider.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Providers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotels: Option<HotelSuggestions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flights: Option<FlightSuggestions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fashion: Option<FashionSuggestions>,
}

#[derive(Debug, Clone)]
pub enum ProviderPayload {
    Hotels(HotelSuggestions),
    Flights(FlightSuggestions),
    Fashion(FashionSuggestions),
}

impl ProviderPayload {
    pub fn field(&self) -> &'static str {
        match self {
            ProviderPayload::Hotels(_) => "hotels",
            ProviderPayload::Flights(_) => "flights",
            ProviderPayload::Fashion(_) => "fashion",
        }
    }

    pub fn apply(self, providers: &mut Providers) {
        match self {
            ProviderPayload::Hotels(payload) => providers.hotels = Some(payload),
            ProviderPayload::Flights(payload) => providers.flights = Some(payload),
            ProviderPayload::Fashion(payload) => providers.fashion = Some(payload),
        }
    }
}
