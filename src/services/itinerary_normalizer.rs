//! Fill the gaps in a model-produced itinerary before it is typed.
//!
//! The model output is handled as loose JSON first: days and activities may
//! be missing fields, carry costs as strings, or not be objects at all.

use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};

use crate::models::itinerary::{ActivityImage, Itinerary};
use crate::models::lenient::number_from_value;
use crate::models::preferences::TripPreferences;

const DEFAULT_DESCRIPTION: &str = "Curated moment designed for this trip.";
const INCLUDED: &str = "Included";

/// Keys that are always produced server-side and never taken from the model.
const SERVER_KEYS: [&str; 6] = ["id", "themes", "image_urls", "narrations", "insights", "meta"];

/// Force the trip-level fields, normalise days and costs, then type the result.
pub fn into_itinerary(
    mut raw: Map<String, Value>,
    prefs: &TripPreferences,
    created_at: &str,
) -> Result<Itinerary, serde_json::Error> {
    for key in SERVER_KEYS {
        raw.remove(key);
    }
    raw.insert(
        "destination".to_string(),
        json!(format!("{}, India", prefs.destination)),
    );
    raw.insert("budget".to_string(), json!(prefs.budget));
    raw.insert("currency".to_string(), json!("INR"));
    raw.insert("createdAt".to_string(), json!(created_at));

    normalize_days(&mut raw, prefs);
    normalize_cost_breakdown(&mut raw);

    let total = extract_total_cost(&raw);
    raw.insert("totalEstimatedCost".to_string(), json!(total));

    if !raw.get("weatherAdvisory").is_some_and(Value::is_string) {
        raw.remove("weatherAdvisory");
    }

    serde_json::from_value(Value::Object(raw))
}

/// `totalEstimatedCost` when numeric, otherwise the sum of breakdown amounts.
pub fn extract_total_cost(raw: &Map<String, Value>) -> i64 {
    if let Some(total) = raw.get("totalEstimatedCost").and_then(as_integer) {
        return total;
    }
    raw.get("costBreakdown")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("amount").and_then(as_integer))
                .sum()
        })
        .unwrap_or(0)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn normalize_days(raw: &mut Map<String, Value>, prefs: &TripPreferences) {
    let start = prefs.start();
    let days = match raw.remove("days") {
        Some(Value::Array(days)) => days,
        _ => Vec::new(),
    };

    let normalized = days
        .into_iter()
        .enumerate()
        .filter_map(|(index, day)| match day {
            Value::Object(map) => Some(Value::Object(normalize_day(map, index, start, prefs))),
            _ => None,
        })
        .collect();

    raw.insert("days".to_string(), Value::Array(normalized));
}

fn normalize_day(
    mut day: Map<String, Value>,
    index: usize,
    start: Option<NaiveDate>,
    prefs: &TripPreferences,
) -> Map<String, Value> {
    if non_empty_str(day.get("dateLabel")).is_none() {
        day.insert("dateLabel".to_string(), json!(format!("Day {}", index + 1)));
    }

    if non_empty_str(day.get("date")).is_none() {
        match start {
            Some(start) => {
                let date = start + Duration::days(index as i64);
                day.insert("date".to_string(), json!(date.format("%Y-%m-%d").to_string()));
            }
            None => {
                day.remove("date");
            }
        }
    }

    if non_empty_str(day.get("summary")).is_none() {
        let motifs = if prefs.themes.is_empty() {
            "local highlights".to_string()
        } else {
            prefs.themes_label()
        };
        day.insert(
            "summary".to_string(),
            json!(format!(
                "Tailored highlights across {} focusing on {}.",
                prefs.destination, motifs
            )),
        );
    }

    let activities = match day.remove("activities") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(position, activity)| {
                let map = match activity {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                Value::Object(normalize_activity(map, position, prefs))
            })
            .collect(),
        _ => Vec::new(),
    };
    day.insert("activities".to_string(), Value::Array(activities));

    if let Some(Value::Object(stay)) = day.remove("accommodation") {
        if let Some(stay) = normalize_accommodation(stay) {
            day.insert("accommodation".to_string(), Value::Object(stay));
        }
    }

    day
}

fn normalize_activity(
    mut activity: Map<String, Value>,
    position: usize,
    prefs: &TripPreferences,
) -> Map<String, Value> {
    let defaults = [
        ("title", format!("Experience {}", position + 1)),
        ("description", DEFAULT_DESCRIPTION.to_string()),
        ("location", prefs.destination.clone()),
        ("time", slot_time(position)),
        ("source", "ai".to_string()),
    ];
    for (key, default) in defaults {
        let value = non_empty_str(activity.get(key))
            .map(str::to_string)
            .unwrap_or(default);
        activity.insert(key.to_string(), json!(value));
    }

    let cost = normalize_cost(activity.get("cost"));
    activity.insert("cost".to_string(), cost);

    let images: Vec<Value> = match activity.remove("images") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(|item| serde_json::from_value::<ActivityImage>(item.clone()).is_ok())
            .collect(),
        _ => Vec::new(),
    };
    activity.insert("images".to_string(), Value::Array(images));

    activity
}

/// Default start time for the n-th activity of a day, every two hours from 09:00.
pub fn slot_time(position: usize) -> String {
    let hour = (9 + 2 * position as i64).clamp(6, 22);
    format!("{:02}:00", hour)
}

fn normalize_cost(value: Option<&Value>) -> Value {
    match value {
        Some(value @ Value::Number(_)) => as_integer(value).map(|cost| json!(cost)).unwrap_or(json!(INCLUDED)),
        Some(Value::String(text)) => {
            let cleaned = text.trim();
            if cleaned.is_empty() {
                json!(INCLUDED)
            } else if cleaned.chars().all(|c| c.is_ascii_digit()) {
                cleaned
                    .parse::<i64>()
                    .map(|cost| json!(cost))
                    .unwrap_or_else(|_| json!(cleaned))
            } else {
                json!(cleaned)
            }
        }
        _ => json!(INCLUDED),
    }
}

fn normalize_accommodation(stay: Map<String, Value>) -> Option<Map<String, Value>> {
    let name = non_empty_str(stay.get("name"))?.to_string();
    let cost = stay
        .get("cost")
        .and_then(number_from_value)
        .map(|cost| json!(cost as i64))
        .unwrap_or(Value::Null);
    let notes = non_empty_str(stay.get("notes"))
        .map(|notes| json!(notes))
        .unwrap_or(Value::Null);

    let mut normalized = Map::new();
    normalized.insert("name".to_string(), json!(name));
    normalized.insert("cost".to_string(), cost);
    normalized.insert("notes".to_string(), notes);
    Some(normalized)
}

fn normalize_cost_breakdown(raw: &mut Map<String, Value>) {
    let items = match raw.remove("costBreakdown") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let cleaned = items
        .into_iter()
        .filter_map(|item| {
            let category = non_empty_str(item.get("category"))?.to_string();
            let amount = item.get("amount").and_then(number_from_value)? as i64;
            let notes = non_empty_str(item.get("notes"))
                .map(|notes| json!(notes))
                .unwrap_or(Value::Null);
            Some(json!({ "category": category, "amount": amount, "notes": notes }))
        })
        .collect();

    raw.insert("costBreakdown".to_string(), Value::Array(cleaned));
}
