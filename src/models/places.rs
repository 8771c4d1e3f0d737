use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn as_param(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// `left, bottom, right, top` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    pub fn around(lat: f64, lng: f64) -> Self {
        Self {
            left: lng - 0.4,
            bottom: lat - 0.35,
            right: lng + 0.4,
            top: lat + 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityCenter {
    pub lat: f64,
    pub lng: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlaceMatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub confidence: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DirectionsRequest {
    pub origin: LatLng,
    pub destination: LatLng,
    #[serde(default)]
    pub waypoints: Vec<LatLng>,
}
