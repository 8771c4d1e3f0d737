use async_trait::async_trait;
use std::fmt;

use crate::models::images::CityHero;
use crate::models::itinerary::StoredItinerary;
use crate::models::suggestions::ProviderPayload;

pub mod memory;
pub mod mongo;

#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    Serialization(String),
    Database(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(id) => write!(f, "Itinerary {} not found", id),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for StorageError {
    fn from(err: bson::ser::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Document store for generated itineraries and cached city imagery.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StorageError>;

    async fn save_itinerary(&self, record: &StoredItinerary) -> Result<(), StorageError>;

    async fn load_itinerary(&self, id: &str) -> Result<Option<StoredItinerary>, StorageError>;

    /// Returns whether a document was removed.
    async fn delete_itinerary(&self, id: &str) -> Result<bool, StorageError>;

    /// Merge a provider payload into `providers.<kind>` without touching the other kinds.
    async fn attach_provider(&self, id: &str, payload: ProviderPayload) -> Result<(), StorageError>;

    async fn save_city_image(&self, hero: &CityHero) -> Result<(), StorageError>;

    async fn load_city_image(&self, city: &str) -> Result<Option<CityHero>, StorageError>;
}

pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}
