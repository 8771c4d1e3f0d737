use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: String,
    pub temp: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub weather: String,
    pub icon: Option<String>,
    pub pop: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather: String,
    pub icon: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub days: Vec<DailyForecast>,
    pub current: CurrentConditions,
    pub generated_at: String,
    pub source: String,
}
