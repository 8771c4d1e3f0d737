use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_BUDGET: i64 = 1_000;
pub const MAX_BUDGET: i64 = 500_000;
pub const MIN_TRAVELLERS: u32 = 1;
pub const MAX_TRAVELLERS: u32 = 6;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripPreferences {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub budget: i64,
    pub themes: Vec<String>,
    pub travellers: u32,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_live_data")]
    pub enable_live_data: bool,
}

fn default_language() -> String {
    "English".to_string()
}

fn default_live_data() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItineraryRequest {
    pub preferences: TripPreferences,
}

impl TripPreferences {
    /// Check the bounds the planner relies on. Returns the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.destination.trim().is_empty() {
            return Err("Destination is required".to_string());
        }
        if !(MIN_BUDGET..=MAX_BUDGET).contains(&self.budget) {
            return Err(format!(
                "Budget must be between {} and {}",
                MIN_BUDGET, MAX_BUDGET
            ));
        }
        if !(MIN_TRAVELLERS..=MAX_TRAVELLERS).contains(&self.travellers) {
            return Err(format!(
                "Travellers must be between {} and {}",
                MIN_TRAVELLERS, MAX_TRAVELLERS
            ));
        }
        if self.themes.is_empty() {
            return Err("Select at least one theme".to_string());
        }
        self.date_range()?;
        Ok(())
    }

    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), String> {
        let start = parse_iso_date(&self.start_date)
            .ok_or_else(|| format!("Invalid start date: {}", self.start_date))?;
        let end = parse_iso_date(&self.end_date)
            .ok_or_else(|| format!("Invalid end date: {}", self.end_date))?;
        Ok((start, end))
    }

    /// Inclusive number of trip days, never less than one.
    pub fn day_count(&self) -> Result<u32, String> {
        let (start, end) = self.date_range()?;
        let days = (end - start).num_days() + 1;
        Ok(days.max(1) as u32)
    }

    pub fn start(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.start_date)
    }

    pub fn themes_label(&self) -> String {
        self.themes.join(", ")
    }
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> TripPreferences {
        TripPreferences {
            origin: "Delhi".to_string(),
            destination: "Jaipur".to_string(),
            start_date: "2025-03-10".to_string(),
            end_date: "2025-03-12".to_string(),
            budget: 40_000,
            themes: vec!["Heritage".to_string()],
            travellers: 2,
            language: "English".to_string(),
            enable_live_data: true,
        }
    }

    #[test]
    fn test_day_count_is_inclusive() {
        assert_eq!(prefs().day_count().unwrap(), 3);

        let mut same_day = prefs();
        same_day.end_date = same_day.start_date.clone();
        assert_eq!(same_day.day_count().unwrap(), 1);
    }

    #[test]
    fn test_validation_bounds() {
        assert!(prefs().validate().is_ok());

        let mut cheap = prefs();
        cheap.budget = 999;
        assert!(cheap.validate().is_err());

        let mut crowd = prefs();
        crowd.travellers = 7;
        assert!(crowd.validate().is_err());

        let mut no_themes = prefs();
        no_themes.themes.clear();
        assert_eq!(no_themes.validate().unwrap_err(), "Select at least one theme");

        let mut garbled = prefs();
        garbled.end_date = "12/03/2025".to_string();
        assert_eq!(garbled.validate().unwrap_err(), "Invalid end date: 12/03/2025");
    }

    #[test]
    fn test_reversed_dates_plan_a_single_day() {
        let mut reversed = prefs();
        reversed.start_date = "2025-03-12".to_string();
        reversed.end_date = "2025-03-10".to_string();
        assert!(reversed.validate().is_ok());
        assert_eq!(reversed.day_count().unwrap(), 1);
    }

    #[test]
    fn test_defaults_when_deserializing() {
        let parsed: TripPreferences = serde_json::from_value(serde_json::json!({
            "origin": "Mumbai",
            "destination": "Goa",
            "startDate": "2025-01-01",
            "endDate": "2025-01-04",
            "budget": 60000,
            "themes": ["Beaches"],
            "travellers": 3
        }))
        .unwrap();
        assert_eq!(parsed.language, "English");
        assert!(parsed.enable_live_data);
    }
}
