use async_trait::async_trait;
use bson::{doc, Document};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{city_key, ItineraryStore, StorageError};
use crate::models::images::CityHero;
use crate::models::itinerary::StoredItinerary;
use crate::models::suggestions::ProviderPayload;

const CITY_IMAGES_COLLECTION: &str = "city_images";

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, StorageError> {
    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;
    Ok(Arc::new(client))
}

#[derive(Debug, Serialize, Deserialize)]
struct CityImageRecord {
    #[serde(rename = "_id")]
    id: String,
    hero: CityHero,
}

pub struct MongoItineraryStore {
    client: Arc<Client>,
    database: String,
    collection: String,
}

impl MongoItineraryStore {
    pub fn new(client: Arc<Client>, database: &str, collection: &str) -> Self {
        Self {
            client,
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }

    fn itineraries(&self) -> Collection<StoredItinerary> {
        self.client
            .database(&self.database)
            .collection(&self.collection)
    }

    fn city_images(&self) -> Collection<CityImageRecord> {
        self.client
            .database(&self.database)
            .collection(CITY_IMAGES_COLLECTION)
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn save_itinerary(&self, record: &StoredItinerary) -> Result<(), StorageError> {
        self.itineraries()
            .replace_one(doc! { "_id": &record.id }, record)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn load_itinerary(&self, id: &str) -> Result<Option<StoredItinerary>, StorageError> {
        let mut record = self.itineraries().find_one(doc! { "_id": id }).await?;
        if let Some(stored) = record.as_mut() {
            stored.itinerary.id = Some(stored.id.clone());
        }
        Ok(record)
    }

    async fn delete_itinerary(&self, id: &str) -> Result<bool, StorageError> {
        let result = self.itineraries().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn attach_provider(&self, id: &str, payload: ProviderPayload) -> Result<(), StorageError> {
        let field = format!("providers.{}", payload.field());
        let value = match &payload {
            ProviderPayload::Hotels(hotels) => bson::to_bson(hotels)?,
            ProviderPayload::Flights(flights) => bson::to_bson(flights)?,
            ProviderPayload::Fashion(fashion) => bson::to_bson(fashion)?,
        };

        let mut set = Document::new();
        set.insert(field, value);
        set.insert("updatedAt", chrono::Utc::now().to_rfc3339());

        let result = self
            .itineraries()
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_city_image(&self, hero: &CityHero) -> Result<(), StorageError> {
        let key = city_key(&hero.city);
        let record = CityImageRecord {
            id: key.clone(),
            hero: hero.clone(),
        };
        self.city_images()
            .replace_one(doc! { "_id": key }, record)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn load_city_image(&self, city: &str) -> Result<Option<CityHero>, StorageError> {
        let record = self
            .city_images()
            .find_one(doc! { "_id": city_key(city) })
            .await?;
        Ok(record.map(|r| r.hero))
    }
}
