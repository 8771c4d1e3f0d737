use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::places::{BoundingBox, CityCenter, PlaceMatch};

const PLACES_SEARCH_URL: &str = "https://places.googleapis.com/v1/places:searchText";
const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "trip-planner/1.0 (+https://gen-ai-hackathon)";
const BIAS_RADIUS_METERS: f64 = 30_000.0;
const PLACES_CONFIDENCE: f64 = 0.95;
const NOMINATIM_CONFIDENCE: f64 = 0.7;

/// Geographic centre of India, used when no provider knows the city.
pub const DEFAULT_CENTER: CityCenter = CityCenter {
    lat: 22.9734,
    lng: 78.6569,
    bbox: BoundingBox {
        left: 78.0,
        bottom: 22.5,
        right: 79.3,
        top: 23.4,
    },
};

#[derive(Debug)]
pub enum MapsError {
    NotConfigured(String),
    HttpError(reqwest::Error),
    ResponseError { status: u16, body: String },
}

impl fmt::Display for MapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapsError::NotConfigured(msg) => write!(f, "{}", msg),
            MapsError::HttpError(err) => write!(f, "Maps HTTP error: {}", err),
            MapsError::ResponseError { status, body } => {
                write!(f, "Request failed ({}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for MapsError {}

impl From<reqwest::Error> for MapsError {
    fn from(err: reqwest::Error) -> Self {
        MapsError::HttpError(err)
    }
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    id: Option<String>,
    display_name: Option<DisplayName>,
    formatted_address: Option<String>,
    location: Option<PlaceLocation>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NominatimRecord {
    lat: String,
    lon: String,
    display_name: Option<String>,
    osm_id: Option<Value>,
    boundingbox: Option<Vec<String>>,
}

/// Resolves itinerary place names to coordinates.
///
/// Places text search is tried first with a bias around the city centre;
/// names it misses go to Nominatim, bounded to the city's box.
pub struct GeocodeClient {
    client: Client,
    maps_key: Option<String>,
    centers: Mutex<HashMap<String, CityCenter>>,
}

impl GeocodeClient {
    pub fn new(config: &AppConfig) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            maps_key: config.maps_api_key.clone(),
            centers: Mutex::new(HashMap::new()),
        })
    }

    pub async fn geocode(&self, payload: &Value, city: &str) -> BTreeMap<String, PlaceMatch> {
        let queries = location_queries(payload);
        let mut results = BTreeMap::new();
        if queries.is_empty() {
            return results;
        }

        let city = normalize_name(city);
        let city = if city.is_empty() { "India".to_string() } else { city };
        let center = self.city_center(&city).await;

        if self.maps_key.is_some() {
            results.extend(self.search_places(&queries, &city, &center).await);
        }
        let missing: Vec<String> = queries
            .into_iter()
            .filter(|query| !results.contains_key(query))
            .collect();
        if !missing.is_empty() {
            results.extend(self.search_nominatim(&missing, &city, &center.bbox).await);
        }
        results
    }

    /// Memoised centre and bounding box for a city.
    pub async fn city_center(&self, city: &str) -> CityCenter {
        let key = city.trim().to_lowercase();
        if let Some(center) = self.centers.lock().ok().and_then(|c| c.get(&key).copied()) {
            return center;
        }

        let mut resolved = None;
        if self.maps_key.is_some() {
            match self.places_center(city).await {
                Ok(center) => resolved = center,
                Err(e) => log::warn!("Places lookup for city centre of '{}' failed: {}", city, e),
            }
        }
        if resolved.is_none() {
            match self.nominatim_center(city).await {
                Ok(center) => resolved = center,
                Err(e) => log::warn!("Nominatim lookup for city centre of '{}' failed: {}", city, e),
            }
        }

        match resolved {
            Some(center) => {
                if let Ok(mut centers) = self.centers.lock() {
                    centers.insert(key, center);
                }
                center
            }
            None => DEFAULT_CENTER,
        }
    }

    async fn places_center(&self, city: &str) -> Result<Option<CityCenter>, MapsError> {
        let body = json!({ "textQuery": format!("{}, India", city), "maxResultCount": 1 });
        let Some(data) = self.places_request(&body, "places.location").await? else {
            return Ok(None);
        };
        let location = data.places.into_iter().next().and_then(|place| place.location);
        let lat = location.as_ref().and_then(|l| l.latitude).unwrap_or(0.0);
        let lng = location.as_ref().and_then(|l| l.longitude).unwrap_or(0.0);
        if lat == 0.0 && lng == 0.0 {
            return Ok(None);
        }
        Ok(Some(CityCenter {
            lat,
            lng,
            bbox: BoundingBox::around(lat, lng),
        }))
    }

    async fn nominatim_center(&self, city: &str) -> Result<Option<CityCenter>, MapsError> {
        let response = self
            .nominatim_request(&[
                ("q", format!("{}, India", city)),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
            ])
            .await?;
        let Some(record) = response.into_iter().next() else {
            return Ok(None);
        };
        let (Ok(lat), Ok(lng)) = (record.lat.parse::<f64>(), record.lon.parse::<f64>()) else {
            return Ok(None);
        };
        let bbox = record
            .boundingbox
            .as_deref()
            .and_then(nominatim_bbox)
            .unwrap_or_else(|| BoundingBox::around(lat, lng));
        Ok(Some(CityCenter { lat, lng, bbox }))
    }

    async fn search_places(
        &self,
        queries: &[String],
        city: &str,
        center: &CityCenter,
    ) -> BTreeMap<String, PlaceMatch> {
        let mut out = BTreeMap::new();
        for query in queries {
            let body = json!({
                "textQuery": format!("{}, {}, India", query, city),
                "maxResultCount": 1,
                "locationBias": {
                    "circle": {
                        "center": { "latitude": center.lat, "longitude": center.lng },
                        "radius": BIAS_RADIUS_METERS
                    }
                }
            });
            let field_mask = "places.id,places.displayName,places.location,places.formattedAddress";
            match self.places_request(&body, field_mask).await {
                Ok(Some(data)) => {
                    if let Some(place) = data.places.into_iter().next() {
                        out.insert(query.clone(), place_match(place));
                    }
                }
                Ok(None) => {}
                Err(MapsError::ResponseError { status, .. }) if is_retryable(status) => {
                    tokio::time::sleep(Duration::from_millis(600)).await;
                }
                Err(e) => log::warn!("Places search for '{}' failed: {}", query, e),
            }
        }
        out
    }

    async fn search_nominatim(
        &self,
        queries: &[String],
        city: &str,
        bbox: &BoundingBox,
    ) -> BTreeMap<String, PlaceMatch> {
        let viewbox = format!("{},{},{},{}", bbox.left, bbox.top, bbox.right, bbox.bottom);
        let mut out = BTreeMap::new();
        for query in queries {
            let params = [
                ("q", format!("{}, {}, India", query, city)),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
                ("viewbox", viewbox.clone()),
                ("bounded", "1".to_string()),
            ];
            match self.nominatim_request(&params).await {
                Ok(records) => {
                    if let Some(found) = records.into_iter().next().and_then(nominatim_match) {
                        out.insert(query.clone(), found);
                    }
                }
                Err(MapsError::ResponseError { status, .. }) if is_retryable(status) => {
                    tokio::time::sleep(Duration::from_millis(800)).await;
                }
                Err(e) => log::warn!("Nominatim search for '{}' failed: {}", query, e),
            }
        }
        out
    }

    /// `Ok(None)` for non-retryable error statuses, which count as no match.
    async fn places_request(
        &self,
        body: &Value,
        field_mask: &str,
    ) -> Result<Option<PlacesResponse>, MapsError> {
        let key = self
            .maps_key
            .as_deref()
            .ok_or_else(|| MapsError::NotConfigured("GOOGLE_MAPS_API_KEY is not set".to_string()))?;
        let response = self
            .client
            .post(PLACES_SEARCH_URL)
            .header("X-Goog-Api-Key", key)
            .header("X-Goog-FieldMask", field_mask)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(Some(response.json().await?));
        }
        if is_retryable(status.as_u16()) {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }
        log::debug!("Places search returned {}", status);
        Ok(None)
    }

    async fn nominatim_request(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<NominatimRecord>, MapsError> {
        let response = self
            .client
            .get(NOMINATIM_SEARCH_URL)
            .header("Accept-Language", "en-IN")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json().await?);
        }
        if is_retryable(status.as_u16()) {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(Vec::new())
    }
}

fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 503)
}

fn place_match(place: Place) -> PlaceMatch {
    let location = place.location.as_ref();
    PlaceMatch {
        name: place.display_name.and_then(|name| name.text),
        address: place.formatted_address,
        place_id: place.id,
        lat: location.and_then(|l| l.latitude),
        lon: location.and_then(|l| l.longitude),
        confidence: PLACES_CONFIDENCE,
    }
}

fn nominatim_match(record: NominatimRecord) -> Option<PlaceMatch> {
    let lat = record.lat.parse().ok()?;
    let lon = record.lon.parse().ok()?;
    let place_id = record.osm_id.map(|id| match id {
        Value::String(id) => id,
        other => other.to_string(),
    });
    Some(PlaceMatch {
        name: record.display_name.clone(),
        address: record.display_name,
        place_id,
        lat: Some(lat),
        lon: Some(lon),
        confidence: NOMINATIM_CONFIDENCE,
    })
}

/// Nominatim boxes are `[south, north, west, east]`.
fn nominatim_bbox(raw: &[String]) -> Option<BoundingBox> {
    let values: Vec<f64> = raw.iter().filter_map(|v| v.parse().ok()).collect();
    match values.as_slice() {
        [south, north, west, east] => Some(BoundingBox {
            left: *west,
            bottom: *south,
            right: *east,
            top: *north,
        }),
        _ => None,
    }
}

pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Place names from a bare list, `{locations}`, `{itinerary}` or `{days}`,
/// normalised and de-duplicated in order.
pub fn location_queries(payload: &Value) -> Vec<String> {
    let raw: Vec<String> = match payload {
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::Object(map) => {
            if let Some(locations) = map.get("locations") {
                locations
                    .as_array()
                    .map(|items| items.iter().map(value_text).collect())
                    .unwrap_or_default()
            } else if let Some(itinerary) = map.get("itinerary").filter(|v| v.is_object()) {
                activity_locations(itinerary.get("days"))
            } else if let Some(days) = map.get("days").filter(|v| v.is_array()) {
                activity_locations(Some(days))
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    raw.iter()
        .map(|name| normalize_name(name))
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn activity_locations(days: Option<&Value>) -> Vec<String> {
    days.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|day| day.get("activities").and_then(Value::as_array))
        .flatten()
        .filter_map(|activity| activity.get("location").and_then(Value::as_str))
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_from_bare_list() {
        let payload = json!(["  Hawa   Mahal ", "Hawa Mahal", "", "Amber Fort"]);
        assert_eq!(location_queries(&payload), vec!["Hawa Mahal", "Amber Fort"]);
    }

    #[test]
    fn test_queries_from_itinerary_and_days() {
        let days = json!([
            { "activities": [{ "location": "City Palace" }, { "location": "  " }] },
            { "activities": [{ "location": "Jal Mahal" }, { "title": "no location" }] }
        ]);
        assert_eq!(
            location_queries(&json!({ "itinerary": { "days": days.clone() } })),
            vec!["City Palace", "Jal Mahal"]
        );
        assert_eq!(
            location_queries(&json!({ "days": days })),
            vec!["City Palace", "Jal Mahal"]
        );
        assert!(location_queries(&json!({ "other": 1 })).is_empty());
    }

    #[test]
    fn test_nominatim_bbox_order() {
        let raw: Vec<String> = ["26.7", "27.1", "75.6", "76.0"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        let bbox = nominatim_bbox(&raw).unwrap();
        assert_eq!(bbox.left, 75.6);
        assert_eq!(bbox.bottom, 26.7);
        assert_eq!(bbox.right, 76.0);
        assert_eq!(bbox.top, 27.1);
        assert!(nominatim_bbox(&raw[..3]).is_none());
    }

    #[test]
    fn test_nominatim_match_stringifies_osm_id() {
        let record: NominatimRecord = serde_json::from_value(json!({
            "lat": "26.9239",
            "lon": "75.8267",
            "display_name": "Hawa Mahal, Jaipur",
            "osm_id": 12345
        }))
        .unwrap();
        let found = nominatim_match(record).unwrap();
        assert_eq!(found.place_id.as_deref(), Some("12345"));
        assert_eq!(found.confidence, 0.7);
        assert_eq!(found.lat, Some(26.9239));
    }

    #[actix_rt::test]
    async fn test_empty_payload_skips_lookups() {
        let client = GeocodeClient::new(&AppConfig::default()).unwrap();
        assert!(client.geocode(&json!([]), "Jaipur").await.is_empty());
    }
}
