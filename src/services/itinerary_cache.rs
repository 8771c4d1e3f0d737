use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::itinerary::Itinerary;
use crate::models::preferences::TripPreferences;

#[derive(Debug, Clone)]
struct CachedItinerary {
    itinerary: Itinerary,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// In-process cache of live itineraries, keyed by normalised preferences.
pub struct ItineraryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedItinerary>>,
}

impl ItineraryCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.max(0)),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    pub fn get(&self, key: &str) -> Option<Itinerary> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Itinerary> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                log::debug!("Itinerary cache hit for {} (cached at {})", key, entry.cached_at);
                Some(entry.itinerary.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, itinerary: Itinerary) {
        self.put_at(key, itinerary, Utc::now());
    }

    fn put_at(&self, key: String, itinerary: Itinerary, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| entry.expires_at > now);
            entries.insert(
                key,
                CachedItinerary {
                    itinerary,
                    cached_at: now,
                    expires_at: now + self.ttl,
                },
            );
        }
    }
}

/// Stable key for a preference set: trimmed, lower-cased, themes sorted.
pub fn cache_key(prefs: &TripPreferences) -> String {
    let mut themes: Vec<String> = prefs
        .themes
        .iter()
        .map(|theme| theme.trim().to_lowercase())
        .filter(|theme| !theme.is_empty())
        .collect();
    themes.sort();
    themes.dedup();

    [
        prefs.origin.trim().to_lowercase(),
        prefs.destination.trim().to_lowercase(),
        prefs.start_date.trim().to_string(),
        prefs.end_date.trim().to_string(),
        prefs.budget.to_string(),
        prefs.travellers.to_string(),
        themes.join(","),
        prefs.language.trim().to_lowercase(),
    ]
    .join("|")
}

/// Whether every part of the plan is about the requested destination.
pub fn matches_destination(itinerary: &Itinerary, prefs: &TripPreferences) -> bool {
    let requested = prefs.destination.trim().to_lowercase();
    if requested.is_empty() || !itinerary.destination.to_lowercase().contains(&requested) {
        return false;
    }
    let city = requested.split(',').next().unwrap_or_default().trim();
    itinerary
        .activities()
        .all(|activity| activity.location.to_lowercase().contains(city))
}
