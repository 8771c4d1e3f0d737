use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::{city_key, ItineraryStore, StorageError};
use crate::models::images::CityHero;
use crate::models::itinerary::StoredItinerary;
use crate::models::suggestions::ProviderPayload;

/// Process-local store used when no `MONGODB_URI` is configured.
#[derive(Default)]
pub struct InMemoryItineraryStore {
    itineraries: Mutex<HashMap<String, StoredItinerary>>,
    city_images: Mutex<HashMap<String, CityHero>>,
}

impl InMemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.itineraries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Database("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl ItineraryStore for InMemoryItineraryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn save_itinerary(&self, record: &StoredItinerary) -> Result<(), StorageError> {
        let mut itineraries = self.itineraries.lock().map_err(poisoned)?;
        itineraries.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn load_itinerary(&self, id: &str) -> Result<Option<StoredItinerary>, StorageError> {
        let itineraries = self.itineraries.lock().map_err(poisoned)?;
        Ok(itineraries.get(id).cloned().map(|mut record| {
            record.itinerary.id = Some(record.id.clone());
            record
        }))
    }

    async fn delete_itinerary(&self, id: &str) -> Result<bool, StorageError> {
        let mut itineraries = self.itineraries.lock().map_err(poisoned)?;
        Ok(itineraries.remove(id).is_some())
    }

    async fn attach_provider(&self, id: &str, payload: ProviderPayload) -> Result<(), StorageError> {
        let mut itineraries = self.itineraries.lock().map_err(poisoned)?;
        let record = itineraries
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        payload.apply(&mut record.providers);
        record.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }

    async fn save_city_image(&self, hero: &CityHero) -> Result<(), StorageError> {
        let mut images = self.city_images.lock().map_err(poisoned)?;
        images.insert(city_key(&hero.city), hero.clone());
        Ok(())
    }

    async fn load_city_image(&self, city: &str) -> Result<Option<CityHero>, StorageError> {
        let images = self.city_images.lock().map_err(poisoned)?;
        Ok(images.get(&city_key(city)).cloned())
    }
}
