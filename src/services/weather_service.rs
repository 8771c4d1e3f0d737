use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::weather::{CurrentConditions, DailyForecast, WeatherForecast};
use crate::services::geocode_service::{GeocodeClient, MapsError};

const WEATHER_API_BASE: &str = "https://weather.googleapis.com/v1";
pub const DEFAULT_FORECAST_DAYS: u32 = 5;

/// Google Weather API daily forecast and current conditions.
pub struct WeatherClient {
    client: Client,
    maps_key: Option<String>,
    geocoder: Arc<GeocodeClient>,
}

impl WeatherClient {
    pub fn new(config: &AppConfig, geocoder: Arc<GeocodeClient>) -> Result<Self, MapsError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            maps_key: config.maps_api_key.clone(),
            geocoder,
        })
    }

    pub async fn forecast(&self, city: &str, days: u32) -> Result<WeatherForecast, MapsError> {
        let key = self.api_key()?;
        let center = self.geocoder.city_center(city).await;
        let location = [
            ("location.latitude", center.lat.to_string()),
            ("location.longitude", center.lng.to_string()),
            ("languageCode", "en-US".to_string()),
        ];

        let mut forecast_params = location.to_vec();
        forecast_params.push(("days", days.clamp(1, 10).to_string()));
        let raw_days = self.lookup(key, "forecast/days", &forecast_params).await?;
        let raw_current = self.lookup(key, "currentConditions", &location).await?;

        Ok(WeatherForecast {
            city: city.to_string(),
            lat: center.lat,
            lon: center.lng,
            days: parse_daily_forecasts(&raw_days),
            current: parse_current_conditions(&raw_current),
            generated_at: format!("{}Z", Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f")),
            source: "google-weather".to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, MapsError> {
        self.maps_key.as_deref().ok_or_else(|| {
            MapsError::NotConfigured(
                "GOOGLE_MAPS_API_KEY (or MAPS_API_KEY) is required for the Google Weather API."
                    .to_string(),
            )
        })
    }

    async fn lookup(
        &self,
        key: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, MapsError> {
        let url = format!("{}/{}:lookup", WEATHER_API_BASE, endpoint);
        log::info!("Weather API request -> {}", url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn degrees(value: &Value, field: &str) -> Option<f64> {
    value.get(field)?.get("degrees")?.as_f64()
}

fn format_display_date(date: &Value) -> String {
    let part = |field: &str| date.get(field).and_then(Value::as_i64).filter(|v| *v != 0);
    match (part("year"), part("month"), part("day")) {
        (Some(year), Some(month), Some(day)) => format!("{:04}-{:02}-{:02}", year, month, day),
        _ => String::new(),
    }
}

fn condition(source: &Value) -> Option<&Value> {
    let condition = source
        .get("weatherCondition")
        .filter(|c| !c.is_null())
        .or_else(|| source.get("weatherConditions"))?;
    let first = match condition {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    first.filter(|c| c.is_object())
}

pub fn weather_text(source: &Value) -> String {
    if let Some(condition) = condition(source) {
        let description = condition
            .get("description")
            .and_then(|d| d.get("text"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty());
        if let Some(text) = description {
            return text.to_string();
        }
        if let Some(kind) = condition.get("type").and_then(Value::as_str).filter(|t| !t.is_empty()) {
            return kind.to_string();
        }
    }
    ["condition", "weather"]
        .iter()
        .filter_map(|field| source.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

fn icon(source: &Value) -> Option<String> {
    condition(source)?
        .get("iconBaseUri")
        .and_then(Value::as_str)
        .filter(|base| !base.is_empty())
        .map(|base| format!("{}.svg", base))
}

pub fn parse_daily_forecasts(raw: &Value) -> Vec<DailyForecast> {
    let Some(days) = raw.get("forecastDays").and_then(Value::as_array) else {
        return Vec::new();
    };
    days.iter()
        .map(|item| {
            let max = degrees(item, "maxTemperature");
            let min = degrees(item, "minTemperature");
            let part = item
                .get("daytimeForecast")
                .filter(|p| p.is_object())
                .or_else(|| item.get("nighttimeForecast").filter(|p| p.is_object()))
                .cloned()
                .unwrap_or(Value::Null);
            let pop = part
                .get("precipitation")
                .and_then(|p| p.get("probability"))
                .and_then(|p| p.get("percent"))
                .and_then(Value::as_f64)
                .map(|percent| percent / 100.0)
                .unwrap_or(0.0);
            let temp = match (max, min) {
                (Some(max), Some(min)) => Some(round1((max + min) / 2.0)),
                (Some(only), None) | (None, Some(only)) => Some(round1(only)),
                (None, None) => None,
            };

            DailyForecast {
                date: format_display_date(item.get("displayDate").unwrap_or(&Value::Null)),
                temp,
                temp_min: min.map(round1),
                temp_max: max.map(round1),
                weather: weather_text(&part),
                icon: icon(&part),
                pop,
            }
        })
        .collect()
}

pub fn parse_current_conditions(raw: &Value) -> CurrentConditions {
    let payload = raw
        .get("currentConditions")
        .filter(|c| c.is_object())
        .unwrap_or(raw);
    CurrentConditions {
        temperature: degrees(payload, "temperature"),
        feels_like: degrees(payload, "feelsLikeTemperature"),
        humidity: payload.get("relativeHumidity").and_then(Value::as_f64),
        wind_speed: payload
            .get("wind")
            .and_then(|w| w.get("speed"))
            .and_then(|s| s.get("value"))
            .and_then(Value::as_f64),
        weather: weather_text(payload),
        icon: icon(payload),
        updated_at: payload
            .get("currentTime")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}
