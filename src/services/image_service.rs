use base64::{engine::general_purpose, Engine as _};
use futures::future::join_all;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ItineraryStore;
use crate::models::images::{
    CityHero, GeneratedImage, ImageResult, ItineraryImagesRequest, PlaceImage, PlaceImages,
};
use crate::services::gemini_service::{GenerationRequest, GenerativeModel};
use crate::services::search_service::{SearchError, WebSearch};

const IMAGE_TOKEN_CAP: u32 = 32_768;
const DEFAULT_MAX_PLACES: u32 = 6;
const DEFAULT_IMAGES_PER_PLACE: u32 = 3;

#[derive(Debug)]
pub enum ImageError {
    NotFound(String),
    InvalidRequest(String),
    SearchError(SearchError),
    GenerationError { message: String, model_text: String },
    UploadError(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::NotFound(msg) => write!(f, "{}", msg),
            ImageError::InvalidRequest(msg) => write!(f, "{}", msg),
            ImageError::SearchError(err) => write!(f, "{}", err),
            ImageError::GenerationError { message, .. } => write!(f, "{}", message),
            ImageError::UploadError(msg) => write!(f, "GCS upload error: {}", msg),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<SearchError> for ImageError {
    fn from(err: SearchError) -> Self {
        ImageError::SearchError(err)
    }
}

/// Uploads generated images to a Cloud Storage bucket.
pub struct GcsImageUploader {
    client: Client,
    bucket_name: String,
}

impl GcsImageUploader {
    pub async fn new(bucket_name: String) -> Result<Self, ImageError> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| ImageError::UploadError(format!("Failed to create GCS client: {}", e)))?;
        Ok(Self {
            client: Client::new(config),
            bucket_name,
        })
    }

    pub async fn upload(&self, bytes: Vec<u8>, mime_type: &str) -> Result<String, ImageError> {
        let object_name = format!(
            "generated/{}-{}.{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..6],
            file_extension(mime_type)
        );
        let mut media = Media::new(object_name.clone());
        media.content_type = mime_type.to_string().into();
        let upload_type = UploadType::Simple(media);
        let request = UploadObjectRequest {
            bucket: self.bucket_name.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&request, bytes, &upload_type)
            .await
            .map_err(|e| ImageError::UploadError(format!("Failed to upload to GCS: {}", e)))?;

        Ok(format!(
            "https://storage.googleapis.com/{}/{}",
            self.bucket_name, object_name
        ))
    }
}

fn file_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

pub struct ImageService {
    search: Arc<dyn WebSearch>,
    model: Arc<dyn GenerativeModel>,
    store: Arc<dyn ItineraryStore>,
    image_model: String,
    uploader: Option<GcsImageUploader>,
}

impl ImageService {
    pub fn new(
        search: Arc<dyn WebSearch>,
        model: Arc<dyn GenerativeModel>,
        store: Arc<dyn ItineraryStore>,
        image_model: impl Into<String>,
        uploader: Option<GcsImageUploader>,
    ) -> Self {
        Self {
            search,
            model,
            store,
            image_model: image_model.into(),
            uploader,
        }
    }

    pub async fn city_images(&self, city: &str, num: u32) -> Result<Vec<ImageResult>, ImageError> {
        let images = self
            .search
            .search_images(&format!("{} travel photography", city), num)
            .await?;
        if images.is_empty() {
            return Err(ImageError::NotFound(format!("No images found for '{}'.", city)));
        }
        Ok(images)
    }

    pub async fn image_search(&self, query: &str, num: u32) -> Result<Vec<ImageResult>, ImageError> {
        Ok(self.search.search_images(query, num).await?)
    }

    /// Hero image for a city, served from the store unless `force` is set.
    pub async fn city_hero(&self, city: &str, force: bool) -> Result<CityHero, ImageError> {
        if !force {
            match self.store.load_city_image(city).await {
                Ok(Some(mut hero)) => {
                    hero.cached = true;
                    return Ok(hero);
                }
                Ok(None) => {}
                Err(e) => log::warn!("City hero cache lookup failed for {}: {}", city, e),
            }
        }

        let image = self
            .search
            .search_images(&format!("{} skyline travel photo", city), 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ImageError::NotFound("No images found for the requested query.".to_string()))?;

        let hero = CityHero {
            image_url: image.link,
            thumbnail_url: image.thumbnail,
            context: image.context,
            title: image.title,
            width: image.width,
            height: image.height,
            city: city.to_string(),
            cached: false,
        };
        if let Err(e) = self.store.save_city_image(&hero).await {
            log::warn!("Failed to cache city hero for {}: {}", city, e);
        }
        Ok(hero)
    }

    pub async fn itinerary_images(
        &self,
        request: &ItineraryImagesRequest,
    ) -> Result<Vec<PlaceImages>, ImageError> {
        if request.places.is_empty() {
            return Err(ImageError::InvalidRequest("Provide at least one place.".to_string()));
        }
        let max_places = request
            .max_places
            .or(request.max_images)
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_MAX_PLACES)
            .clamp(1, 8) as usize;
        let per_place = request
            .images_per_place
            .filter(|count| *count > 0)
            .unwrap_or(DEFAULT_IMAGES_PER_PLACE)
            .clamp(1, 5);
        let city = request.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

        let places: Vec<&str> = request
            .places
            .iter()
            .take(max_places)
            .filter_map(Value::as_str)
            .filter(|place| !place.trim().is_empty())
            .collect();

        let lookups = places.iter().map(|place| async move {
            let query = match city {
                Some(city) => format!("{} {} travel photo", place, city),
                None => format!("{} travel photo", place),
            };
            let images = self.search.search_images(&query, per_place).await?;
            Ok::<_, SearchError>((place.to_string(), images))
        });

        let mut results = Vec::new();
        for outcome in join_all(lookups).await {
            let (place, images) = outcome?;
            if images.is_empty() {
                continue;
            }
            results.push(PlaceImages {
                place,
                images: images.into_iter().filter_map(place_image).collect(),
            });
        }
        Ok(results)
    }

    /// Generate one image from a prompt; returns it with any text the model added.
    pub async fn generate_image(&self, prompt: &str) -> Result<(GeneratedImage, String), ImageError> {
        let request = GenerationRequest::new(self.image_model.clone(), prompt)
            .with_sampling(1.0, 0.95, IMAGE_TOKEN_CAP)
            .with_images()
            .with_safety_threshold("OFF");
        let output = self.model.generate(&request).await.map_err(|e| {
            ImageError::GenerationError {
                message: e.to_string(),
                model_text: String::new(),
            }
        })?;

        let Some(image) = output.images.into_iter().next() else {
            return Err(ImageError::GenerationError {
                message: "Image generation failed: no image in stream".to_string(),
                model_text: output.text,
            });
        };

        let data_url = format!(
            "data:{};base64,{}",
            image.mime_type,
            general_purpose::STANDARD.encode(&image.data)
        );
        let mut generated = GeneratedImage {
            data_url,
            mime_type: image.mime_type.clone(),
            size: image.data.len(),
            url: None,
        };

        if let Some(uploader) = &self.uploader {
            match uploader.upload(image.data, &image.mime_type).await {
                Ok(url) => generated.url = Some(url),
                Err(e) => log::error!("Generated image upload failed: {}", e),
            }
        }
        Ok((generated, output.text))
    }
}

fn place_image(image: ImageResult) -> Option<PlaceImage> {
    Some(PlaceImage {
        image_url: image.link?,
        thumbnail_url: image.thumbnail,
        title: image.title,
        context: image.context,
        width: image.width,
        height: image.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_image_requires_link() {
        assert!(place_image(ImageResult::default()).is_none());
        let image = place_image(ImageResult {
            link: Some("https://img.test/a.jpg".to_string()),
            width: Some(640),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(image.image_url, "https://img.test/a.jpg");
        assert_eq!(image.width, Some(640));
    }

    #[test]
    fn test_extension_from_mime() {
        assert_eq!(file_extension("image/png"), "png");
        assert_eq!(file_extension("image/jpeg"), "jpg");
        assert_eq!(file_extension("application/octet-stream"), "jpg");
    }
}
