use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::places::DirectionsRequest;
use crate::services::geocode_service::MapsError;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Thin proxy over the Directions API; the JSON body is passed through untouched.
pub struct DirectionsClient {
    client: Client,
    maps_key: Option<String>,
}

impl DirectionsClient {
    pub fn new(config: &AppConfig) -> Result<Self, MapsError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            maps_key: config.maps_api_key.clone(),
        })
    }

    pub async fn route(&self, request: &DirectionsRequest) -> Result<Value, MapsError> {
        let key = self
            .maps_key
            .as_deref()
            .ok_or_else(|| MapsError::NotConfigured("MAPS_API_KEY is not set".to_string()))?;

        let response = self
            .client
            .get(DIRECTIONS_URL)
            .query(&directions_params(request))
            .query(&[("key", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn directions_params(request: &DirectionsRequest) -> [(&'static str, String); 3] {
    let waypoints = request
        .waypoints
        .iter()
        .map(|point| point.as_param())
        .collect::<Vec<_>>()
        .join("|");
    [
        ("origin", request.origin.as_param()),
        ("destination", request.destination.as_param()),
        ("waypoints", waypoints),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::places::LatLng;

    #[test]
    fn test_waypoints_are_pipe_joined() {
        let request = DirectionsRequest {
            origin: LatLng { lat: 26.9, lng: 75.8 },
            destination: LatLng { lat: 26.98, lng: 75.85 },
            waypoints: vec![LatLng { lat: 26.92, lng: 75.82 }, LatLng { lat: 26.95, lng: 75.84 }],
        };
        let params = directions_params(&request);
        assert_eq!(params[0].1, "26.9,75.8");
        assert_eq!(params[2].1, "26.92,75.82|26.95,75.84");
    }

    #[actix_rt::test]
    async fn test_route_requires_key() {
        let client = DirectionsClient::new(&AppConfig::default()).unwrap();
        let request = DirectionsRequest {
            origin: LatLng { lat: 0.0, lng: 0.0 },
            destination: LatLng { lat: 1.0, lng: 1.0 },
            waypoints: Vec::new(),
        };
        assert!(matches!(
            client.route(&request).await,
            Err(MapsError::NotConfigured(_))
        ));
    }
}
