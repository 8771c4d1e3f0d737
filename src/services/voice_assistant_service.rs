//! Slot-filling voice conversation that ends in a generated itinerary.
//!
//! Each session walks a fixed sequence of questions. Answers are parsed
//! per slot; once every slot is filled the collected preferences go to
//! the itinerary generator and the session is marked complete.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use uuid::Uuid;

use crate::models::itinerary::Itinerary;
use crate::models::preferences::{TripPreferences, MAX_BUDGET, MAX_TRAVELLERS, MIN_TRAVELLERS};
use crate::models::voice::{VoiceReply, VoiceSessionStarted};
use crate::services::insights_service::group_thousands;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::speech_service::{decode_audio, SpeechServices};

const SESSION_TIMEOUT_MINUTES: i64 = 20;
const MIN_VOICE_BUDGET: i64 = 10_000;
pub const GREETING: &str =
    "Hey I am Ava, your personalized trip planning assistant. How may I help you today?";
const ALREADY_READY: &str =
    "Your itinerary is already ready. Feel free to ask for another plan whenever you like.";

#[derive(Debug)]
pub enum VoiceError {
    SessionNotFound,
    EmptyMessage,
    EmptyAudio,
    InvalidAudio(String),
    Transcription(String),
    Generation(String),
}

impl fmt::Display for VoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceError::SessionNotFound => write!(f, "Session not found or expired."),
            VoiceError::EmptyMessage => write!(f, "Message cannot be empty."),
            VoiceError::EmptyAudio => write!(f, "No audio payload received."),
            VoiceError::InvalidAudio(msg) => write!(f, "Invalid audio payload: {}", msg),
            VoiceError::Transcription(msg) => write!(f, "Transcription failed: {}", msg),
            VoiceError::Generation(_) => write!(f, "I couldn't generate the itinerary right now."),
        }
    }
}

impl std::error::Error for VoiceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Origin,
    Destination,
    StartDate,
    EndDate,
    Travellers,
    Budget,
    Themes,
}

impl Slot {
    pub const FLOW: [Slot; 7] = [
        Slot::Origin,
        Slot::Destination,
        Slot::StartDate,
        Slot::EndDate,
        Slot::Travellers,
        Slot::Budget,
        Slot::Themes,
    ];

    pub fn question(&self) -> &'static str {
        match self {
            Slot::Origin => "To begin, which city are you travelling from?",
            Slot::Destination => "Lovely. Where would you like to visit?",
            Slot::StartDate => "When does your trip start? Please share the start date.",
            Slot::EndDate => "And when will you return home?",
            Slot::Travellers => "How many travellers are in your party?",
            Slot::Budget => "What overall budget in Indian rupees should I plan within?",
            Slot::Themes => "What kind of experiences excite you? You can mention things like heritage, food, beaches, wellness, and more.",
        }
    }

    fn reprompt(&self) -> &'static str {
        match self {
            Slot::StartDate => {
                "I missed that start date. Could you share it once more, including the month and day?"
            }
            Slot::EndDate => "I didn't quite catch the return date. Could you repeat it?",
            Slot::Travellers => "Could you tell me how many travellers are going?",
            Slot::Budget => "What total trip budget should I plan within in Indian rupees?",
            _ => "Could you repeat that for me?",
        }
    }

    fn acknowledge(&self, value: &SlotValue) -> String {
        match (self, value) {
            (Slot::Origin, SlotValue::Text(city)) => format!("Perfect, we'll start right from {}.", city),
            (Slot::Destination, SlotValue::Text(city)) => {
                format!("Wonderful choice\u{2014}{} it is.", city)
            }
            (Slot::StartDate, SlotValue::Date(date)) => {
                format!("Got it. We'll kick things off on {}.", date.format("%Y-%m-%d"))
            }
            (Slot::EndDate, SlotValue::Date(date)) => {
                format!("Great, wrapping things up on {}.", date.format("%Y-%m-%d"))
            }
            (Slot::Travellers, SlotValue::Number(count)) => format!(
                "Noted. Planning for {} traveller{}.",
                count,
                if *count != 1 { "s" } else { "" }
            ),
            (Slot::Budget, SlotValue::Number(amount)) => format!(
                "Thanks. I'll keep the trip within \u{20b9}{}.",
                group_thousands(*amount)
            ),
            (Slot::Themes, SlotValue::Text(themes)) => format!("Absolutely. I'll focus on {}.", themes),
            _ => "Great.".to_string(),
        }
    }

    pub fn parse(&self, utterance: &str, today: NaiveDate) -> Option<SlotValue> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return None;
        }
        match self {
            Slot::Origin | Slot::Destination => Some(SlotValue::Text(title_case(utterance))),
            Slot::StartDate | Slot::EndDate => parse_spoken_date(utterance, today).map(SlotValue::Date),
            Slot::Travellers => parse_travellers(utterance).map(SlotValue::Number),
            Slot::Budget => parse_budget(utterance).map(SlotValue::Number),
            Slot::Themes => parse_themes(utterance).map(SlotValue::Text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Text(String),
    Date(NaiveDate),
    Number(i64),
}

#[derive(Debug, Clone)]
struct VoiceSession {
    created_at: DateTime<Utc>,
    current_index: usize,
    slots: HashMap<Slot, SlotValue>,
    complete: bool,
    itinerary: Option<Itinerary>,
    preferences: Option<TripPreferences>,
}

impl VoiceSession {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            current_index: 0,
            slots: HashMap::new(),
            complete: false,
            itinerary: None,
            preferences: None,
        }
    }

    fn current_slot(&self) -> Option<Slot> {
        Slot::FLOW.get(self.current_index).copied()
    }

    fn text(&self, slot: Slot) -> String {
        match self.slots.get(&slot) {
            Some(SlotValue::Text(text)) => text.clone(),
            Some(SlotValue::Date(date)) => date.format("%Y-%m-%d").to_string(),
            Some(SlotValue::Number(number)) => number.to_string(),
            None => String::new(),
        }
    }

    fn number(&self, slot: Slot) -> i64 {
        match self.slots.get(&slot) {
            Some(SlotValue::Number(number)) => *number,
            _ => 0,
        }
    }

    /// Preferences from the filled slots, clamped to what the planner accepts.
    fn preferences(&self) -> TripPreferences {
        let mut themes: Vec<String> = self
            .text(Slot::Themes)
            .split(',')
            .map(str::trim)
            .filter(|theme| !theme.is_empty())
            .map(title_case)
            .collect();
        if themes.is_empty() {
            themes.push("Highlights".to_string());
        }
        let travellers = self
            .number(Slot::Travellers)
            .clamp(i64::from(MIN_TRAVELLERS), i64::from(MAX_TRAVELLERS));

        TripPreferences {
            origin: self.text(Slot::Origin),
            destination: self.text(Slot::Destination),
            start_date: self.text(Slot::StartDate),
            end_date: self.text(Slot::EndDate),
            budget: self.number(Slot::Budget).clamp(MIN_VOICE_BUDGET, MAX_BUDGET),
            themes,
            travellers: travellers as u32,
            language: "English".to_string(),
            enable_live_data: true,
        }
    }
}

/// What a message did to the session, decided while the lock is held.
enum Step {
    AlreadyComplete(Option<Itinerary>, Option<TripPreferences>),
    Reprompt(&'static str),
    Next(String),
    Finalize(TripPreferences),
}

pub struct VoiceAssistant {
    speech: Arc<dyn SpeechServices>,
    generator: Arc<ItineraryGenerator>,
    sessions: Mutex<HashMap<String, VoiceSession>>,
}

impl VoiceAssistant {
    pub fn new(speech: Arc<dyn SpeechServices>, generator: Arc<ItineraryGenerator>) -> Self {
        Self {
            speech,
            generator,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn start_session(&self) -> VoiceSessionStarted {
        let now = Utc::now();
        let session_id = Uuid::new_v4().simple().to_string();
        if let Ok(mut sessions) = self.sessions.lock() {
            let timeout = Duration::minutes(SESSION_TIMEOUT_MINUTES);
            sessions.retain(|_, session| now - session.created_at <= timeout);
            sessions.insert(session_id.clone(), VoiceSession::new(now));
        }

        let text = format!("{} {}", GREETING, Slot::FLOW[0].question());
        let (audio, warnings) = self
            .speak(
                &text,
                "Voice playback is unavailable right now, but we can continue via text prompts.",
            )
            .await;
        VoiceSessionStarted {
            session_id,
            text,
            audio,
            warnings,
        }
    }

    pub async fn transcribe(&self, session_id: &str, audio: Option<&str>) -> Result<String, VoiceError> {
        self.ensure_session(session_id)?;
        let audio = audio.map(str::trim).unwrap_or_default();
        if audio.is_empty() {
            return Err(VoiceError::EmptyAudio);
        }
        let bytes = decode_audio(audio).map_err(|e| VoiceError::InvalidAudio(e.to_string()))?;
        self.speech
            .transcribe(&bytes)
            .await
            .map_err(|e| VoiceError::Transcription(e.to_string()))
    }

    pub async fn handle_message(
        &self,
        session_id: &str,
        message: Option<&str>,
    ) -> Result<VoiceReply, VoiceError> {
        let step = self.advance(session_id, message)?;
        match step {
            Step::AlreadyComplete(itinerary, preferences) => Ok(VoiceReply {
                reply: ALREADY_READY.to_string(),
                audio: None,
                complete: true,
                itinerary,
                preferences,
                warnings: None,
            }),
            Step::Reprompt(prompt) => {
                let (audio, warnings) = self
                    .speak(prompt, "Voice playback is unavailable right now, continuing in text.")
                    .await;
                Ok(reply(prompt.to_string(), audio, warnings, false))
            }
            Step::Next(text) => {
                let (audio, warnings) = self
                    .speak(&text, "Voice playback is unavailable right now, continuing in text.")
                    .await;
                Ok(reply(text, audio, warnings, false))
            }
            Step::Finalize(preferences) => self.finalize(session_id, preferences).await,
        }
    }

    fn ensure_session(&self, session_id: &str) -> Result<(), VoiceError> {
        let sessions = self.sessions.lock().map_err(|_| VoiceError::SessionNotFound)?;
        if sessions.contains_key(session_id) {
            Ok(())
        } else {
            Err(VoiceError::SessionNotFound)
        }
    }

    fn advance(&self, session_id: &str, message: Option<&str>) -> Result<Step, VoiceError> {
        let mut sessions = self.sessions.lock().map_err(|_| VoiceError::SessionNotFound)?;
        let session = sessions
            .get_mut(session_id)
            .ok_or(VoiceError::SessionNotFound)?;

        if session.complete {
            return Ok(Step::AlreadyComplete(
                session.itinerary.clone(),
                session.preferences.clone(),
            ));
        }

        let message = message.map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return Err(VoiceError::EmptyMessage);
        }

        let Some(slot) = session.current_slot() else {
            return Ok(Step::Finalize(session.preferences()));
        };
        let Some(value) = slot.parse(message, Local::now().date_naive()) else {
            return Ok(Step::Reprompt(slot.reprompt()));
        };

        let ack = slot.acknowledge(&value);
        session.slots.insert(slot, value);
        session.current_index += 1;

        Ok(match session.current_slot() {
            Some(next) => Step::Next(format!("{} {}", ack, next.question())),
            None => Step::Finalize(session.preferences()),
        })
    }

    async fn finalize(
        &self,
        session_id: &str,
        preferences: TripPreferences,
    ) -> Result<VoiceReply, VoiceError> {
        log::info!(
            "Voice session {} complete, generating itinerary for {}",
            session_id,
            preferences.destination
        );
        let itinerary = self.generator.generate(&preferences).await.map_err(|e| {
            log::error!("Voice itinerary generation failed: {}", e);
            VoiceError::Generation(e.to_string())
        })?;

        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.get_mut(session_id) {
                session.complete = true;
                session.itinerary = Some(itinerary.clone());
                session.preferences = Some(preferences.clone());
            }
        }

        let summary = format!(
            "All set. I've drafted a tailored itinerary from {} to {} for your {} getaway. The full plan is ready for you.",
            preferences.start_date, preferences.end_date, preferences.destination
        );
        let (audio, warnings) = self
            .speak(
                &summary,
                "Voice playback is unavailable right now, but your itinerary is ready in the planner.",
            )
            .await;
        Ok(VoiceReply {
            reply: summary,
            audio,
            complete: true,
            itinerary: Some(itinerary),
            preferences: Some(preferences),
            warnings,
        })
    }

    /// Synthesised audio, or a warning when speech is unavailable.
    async fn speak(&self, text: &str, warning: &str) -> (Option<String>, Option<Vec<String>>) {
        match self.speech.synthesize(text).await {
            Ok(audio) => (Some(audio), None),
            Err(e) => {
                log::error!("Text-to-Speech synthesis failed: {}", e);
                (None, Some(vec![warning.to_string()]))
            }
        }
    }
}

fn reply(text: String, audio: Option<String>, warnings: Option<Vec<String>>, complete: bool) -> VoiceReply {
    VoiceReply {
        reply: text,
        audio,
        complete,
        itinerary: None,
        preferences: None,
        warnings,
    }
}

/// Upper-case the first letter of every word, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }
    out
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("valid digits pattern"))
}

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(lakhs?|lacs?|thousand|k)\b").expect("valid amount pattern")
    })
}

fn theme_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[,&]| and ").expect("valid theme separator"))
}

pub fn parse_travellers(utterance: &str) -> Option<i64> {
    let lower = utterance.to_lowercase();
    if let Some(found) = digits_pattern().find(&lower) {
        return found.as_str().parse::<i64>().ok().map(|count| count.max(1));
    }
    [("one", 1), ("two", 2), ("three", 3), ("four", 4), ("five", 5), ("six", 6)]
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, count)| *count)
}

/// Rupee budget; small spoken numbers are read as hundreds, with a floor.
pub fn parse_budget(utterance: &str) -> Option<i64> {
    let lower = utterance.to_lowercase().replace(',', "");
    let amount = if let Some(caps) = amount_pattern().captures(&lower) {
        let value: f64 = caps[1].parse().ok()?;
        let multiplier = if caps[2].starts_with('l') { 100_000.0 } else { 1_000.0 };
        (value * multiplier).round() as i64
    } else {
        let digits: String = digits_pattern()
            .find_iter(&lower)
            .map(|m| m.as_str())
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse::<i64>().ok()?
    };
    let amount = if amount < 5_000 { amount * 100 } else { amount };
    Some(amount.max(MIN_VOICE_BUDGET))
}

pub fn parse_themes(utterance: &str) -> Option<String> {
    let lower = utterance.to_lowercase();
    let themes: Vec<String> = theme_separator()
        .split(&lower)
        .map(str::trim)
        .filter(|theme| !theme.is_empty())
        .map(title_case)
        .collect();
    (!themes.is_empty()).then(|| themes.join(", "))
}

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").expect("valid iso date"))
}

fn numeric_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})(?:[/.-](\d{2,4}))?\b").expect("valid numeric date")
    })
}

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
        )
        .expect("valid month pattern")
    })
}

fn day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b").expect("valid day pattern"))
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("valid year pattern"))
}

fn month_number(name: &str) -> Option<u32> {
    let months = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
    months
        .iter()
        .position(|month| name.starts_with(month))
        .map(|index| index as u32 + 1)
}

/// Dates as people say them: ISO, `10/03/2025`, `March 10th`, `10 march 2025`,
/// `today`, `tomorrow`. Month-first for ambiguous numeric dates, and the
/// current year when none is given.
pub fn parse_spoken_date(utterance: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = utterance.to_lowercase();

    if lower.contains("day after tomorrow") {
        return today.checked_add_days(chrono::Days::new(2));
    }
    if lower.contains("tomorrow") {
        return today.checked_add_days(chrono::Days::new(1));
    }
    if lower.contains("today") {
        return Some(today);
    }

    if let Some(caps) = iso_date_pattern().captures(&lower) {
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
    }

    if let Some(caps) = numeric_date_pattern().captures(&lower) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = match caps.get(3) {
            Some(year) => {
                let year: i32 = year.as_str().parse().ok()?;
                if year < 100 {
                    2000 + year
                } else {
                    year
                }
            }
            None => today.year(),
        };
        let (month, day) = if first > 12 { (second, first) } else { (first, second) };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let month = month_pattern()
        .find(&lower)
        .and_then(|found| month_number(found.as_str()))?;
    let day: u32 = day_pattern()
        .captures_iter(&lower)
        .filter_map(|caps| caps[1].parse().ok())
        .find(|day| (1..=31).contains(day))?;
    let year = year_pattern()
        .captures(&lower)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(today.year());
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 20).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new delhi"), "New Delhi");
        assert_eq!(title_case("NAVI-MUMBAI"), "Navi-Mumbai");
    }

    #[test]
    fn test_spoken_dates() {
        let today = today();
        assert_eq!(parse_spoken_date("2025-03-10", today), Some(date(2025, 3, 10)));
        assert_eq!(parse_spoken_date("2026/03/10", today), Some(date(2026, 3, 10)));
        assert_eq!(parse_spoken_date("2026.4.2", today), Some(date(2026, 4, 2)));
        assert_eq!(parse_spoken_date("on march 10th", today), Some(date(2025, 3, 10)));
        assert_eq!(parse_spoken_date("the 5th of April 2026", today), Some(date(2026, 4, 5)));
        assert_eq!(parse_spoken_date("3/10/2025", today), Some(date(2025, 3, 10)));
        assert_eq!(parse_spoken_date("25/12/25", today), Some(date(2025, 12, 25)));
        assert_eq!(parse_spoken_date("tomorrow please", today), Some(date(2025, 2, 21)));
        assert_eq!(parse_spoken_date("sometime soon", today), None);
        assert_eq!(parse_spoken_date("february 30", today), None);
    }

    #[test]
    fn test_travellers() {
        assert_eq!(parse_travellers("we are 4 people"), Some(4));
        assert_eq!(parse_travellers("0"), Some(1));
        assert_eq!(parse_travellers("three of us"), Some(3));
        assert_eq!(parse_travellers("a few"), None);
    }

    #[test]
    fn test_budget_rules() {
        assert_eq!(parse_budget("50,000 rupees"), Some(50_000));
        assert_eq!(parse_budget("about 450"), Some(45_000));
        assert_eq!(parse_budget("20"), Some(10_000));
        assert_eq!(parse_budget("1.5 lakh"), Some(150_000));
        assert_eq!(parse_budget("80k"), Some(80_000));
        assert_eq!(parse_budget("not sure"), None);
    }

    #[test]
    fn test_themes_split() {
        assert_eq!(
            parse_themes("heritage, street food and beaches & nightlife"),
            Some("Heritage, Street Food, Beaches, Nightlife".to_string())
        );
        assert_eq!(parse_themes(" , "), None);
    }

    #[test]
    fn test_acknowledgements() {
        assert_eq!(
            Slot::Budget.acknowledge(&SlotValue::Number(75_000)),
            "Thanks. I'll keep the trip within \u{20b9}75,000."
        );
        assert_eq!(
            Slot::Travellers.acknowledge(&SlotValue::Number(1)),
            "Noted. Planning for 1 traveller."
        );
        assert_eq!(
            Slot::StartDate.acknowledge(&SlotValue::Date(date(2025, 3, 10))),
            "Got it. We'll kick things off on 2025-03-10."
        );
    }

    #[test]
    fn test_preferences_are_clamped() {
        let mut session = VoiceSession::new(Utc::now());
        session.slots.insert(Slot::Origin, SlotValue::Text("Delhi".to_string()));
        session.slots.insert(Slot::Destination, SlotValue::Text("Jaipur".to_string()));
        session.slots.insert(Slot::StartDate, SlotValue::Date(date(2025, 3, 10)));
        session.slots.insert(Slot::EndDate, SlotValue::Date(date(2025, 3, 12)));
        session.slots.insert(Slot::Travellers, SlotValue::Number(9));
        session.slots.insert(Slot::Budget, SlotValue::Number(900_000));

        let prefs = session.preferences();
        assert_eq!(prefs.travellers, 6);
        assert_eq!(prefs.budget, 500_000);
        assert_eq!(prefs.themes, vec!["Highlights".to_string()]);
        assert_eq!(prefs.start_date, "2025-03-10");
        assert!(prefs.validate().is_ok());
    }
}
