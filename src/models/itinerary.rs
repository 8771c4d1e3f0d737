use serde::{Deserialize, Serialize};

use crate::models::preferences::TripPreferences;
use crate::models::suggestions::Providers;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ActivityCost {
    Amount(i64),
    Label(String),
}

impl ActivityCost {
    pub fn amount(&self) -> Option<i64> {
        match self {
            ActivityCost::Amount(value) => Some(*value),
            ActivityCost::Label(_) => None,
        }
    }
}

impl Default for ActivityCost {
    fn default() -> Self {
        ActivityCost::Label("Included".to_string())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ActivityImage {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub context_url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Activity {
    pub time: String,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub cost: ActivityCost,
    pub source: String,
    #[serde(default)]
    pub images: Vec<ActivityImage>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Accommodation {
    pub name: String,
    pub cost: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date_label: String,
    pub date: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<Accommodation>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CostItem {
    pub category: String,
    pub amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayNarration {
    pub day: String,
    pub script: String,
    pub mood: String,
    pub length_seconds: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AxisStatus {
    Great,
    Caution,
    Risk,
}

impl AxisStatus {
    pub fn from_score(score: i64) -> Self {
        if score >= 80 {
            AxisStatus::Great
        } else if score >= 60 {
            AxisStatus::Caution
        } else {
            AxisStatus::Risk
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InsightAxis {
    pub id: String,
    pub label: String,
    pub score: i64,
    pub status: AxisStatus,
    pub explanation: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripInsights {
    pub overall_score: i64,
    pub badge: String,
    pub axes: Vec<InsightAxis>,
    pub alerts: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryMeta {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub created_at: String,
    pub destination: String,
    pub budget: i64,
    pub currency: String,
    pub total_estimated_cost: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_advisory: Option<String>,
    #[serde(default)]
    pub cost_breakdown: Vec<CostItem>,
    #[serde(default)]
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default, rename = "image_urls")]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub narrations: Vec<DayNarration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<TripInsights>,
    #[serde(default)]
    pub meta: ItineraryMeta,
}

impl Itinerary {
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.days.iter().flat_map(|day| day.activities.iter())
    }
}

/// Document persisted for every generated itinerary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredItinerary {
    #[serde(rename = "_id")]
    pub id: String,
    pub itinerary: Itinerary,
    pub preferences: Option<TripPreferences>,
    #[serde(default)]
    pub providers: Providers,
    pub updated_at: String,
}
