use regex::Regex;
use std::sync::OnceLock;

use crate::models::itinerary::{DayNarration, Itinerary};
use crate::models::preferences::TripPreferences;

const MIN_LENGTH_SECONDS: usize = 18;
const MAX_LENGTH_SECONDS: usize = 45;

fn whitespace() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Collapse whitespace and flatten typographic dashes so scripts read cleanly aloud.
pub fn clean_snippet(text: &str) -> String {
    let flattened = text.replace(['\u{2013}', '\u{2014}'], "-");
    whitespace().replace_all(&flattened, " ").trim().to_string()
}

/// A short spoken script per day, for the itinerary audio tour.
pub fn generate_day_narrations(itinerary: &Itinerary, prefs: &TripPreferences) -> Vec<DayNarration> {
    let destination = if prefs.destination.trim().is_empty() {
        "your destination"
    } else {
        prefs.destination.as_str()
    };
    let advisory = itinerary
        .weather_advisory
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    itinerary
        .days
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let number = index + 1;
            let label = if day.date_label.trim().is_empty() {
                format!("Day {}", number)
            } else {
                day.date_label.clone()
            };

            let summary = clean_snippet(&day.summary);
            let titles: Vec<String> = day
                .activities
                .iter()
                .map(|activity| clean_snippet(&activity.title))
                .filter(|title| !title.is_empty())
                .collect();

            let mut bits = vec![format!(
                "Day {} in {}: {}",
                number,
                destination,
                if summary.is_empty() {
                    "tailored experiences await."
                } else {
                    summary.as_str()
                }
            )];
            match (titles.first(), titles.last()) {
                (Some(first), Some(last)) if first != last => {
                    bits.push(format!("Start with {} and wrap up at {}.", first, last));
                }
                (Some(first), _) => bits.push(format!("Expect {} as a signature moment.", first)),
                _ => {}
            }
            if let Some(advisory) = advisory {
                bits.push(format!("Weather watch: {}", advisory));
            }

            let script = bits.join(" ");
            let words = script.split_whitespace().count();
            DayNarration {
                day: label,
                length_seconds: (words * 2).clamp(MIN_LENGTH_SECONDS, MAX_LENGTH_SECONDS) as u32,
                script,
                mood: "uplifting".to_string(),
            }
        })
        .collect()
}
