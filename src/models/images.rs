use serde::{Deserialize, Serialize};

use crate::models::itinerary::ActivityImage;

/// One image hit from Programmable Search.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub context: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display_link: Option<String>,
}

impl ImageResult {
    pub fn to_activity_image(&self) -> Option<ActivityImage> {
        let link = self.link.as_ref()?;
        Some(ActivityImage {
            image_url: link.clone(),
            thumbnail_url: self.thumbnail.clone(),
            context_url: self.context.clone(),
            title: self.title.clone(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebResult {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
    pub display_link: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CityHero {
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub context: Option<String>,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub city: String,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlaceImage {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub title: Option<String>,
    pub context: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlaceImages {
    pub place: String,
    pub images: Vec<PlaceImage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItineraryImagesRequest {
    pub city: Option<String>,
    #[serde(default)]
    pub places: Vec<serde_json::Value>,
    pub max_places: Option<u32>,
    pub max_images: Option<u32>,
    pub images_per_place: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data_url: String,
    pub mime_type: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
