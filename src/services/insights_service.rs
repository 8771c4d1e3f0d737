//! Heuristic quality scores for a generated itinerary.
//!
//! Five axes are scored 0-100: budget fit, logistics flow, weather
//! resilience, sustainability and experience fit. Each axis may add alerts
//! or suggested actions that the front end surfaces next to the plan.

use chrono::Utc;

use crate::models::itinerary::{AxisStatus, InsightAxis, Itinerary, TripInsights};
use crate::models::preferences::TripPreferences;
use crate::services::narration_service::clean_snippet;

const GREEN_KEYWORDS: [&str; 6] = ["walk", "walking", "cycle", "public", "metro", "local market"];
const CARBON_KEYWORDS: [&str; 5] = ["taxi", "cab", "private", "drive", "suv"];
const SEVERE_WEATHER: [&str; 4] = ["storm", "cyclone", "heavy", "extreme"];

/// Minutes since midnight for `HH:MM`.
pub fn parse_minutes(value: &str) -> Option<i64> {
    let (hour, minute) = value.split_once(':')?;
    let hour: i64 = hour.trim().parse().ok()?;
    let minute: i64 = minute.trim().parse().ok()?;
    Some(hour * 60 + minute)
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

struct Findings {
    alerts: Vec<String>,
    actions: Vec<String>,
}

impl Findings {
    fn alert(&mut self, text: impl Into<String>) {
        self.alerts.push(text.into());
    }

    fn action(&mut self, text: &str) {
        self.actions.push(text.to_string());
    }
}

pub fn compute_trip_insights(itinerary: &Itinerary, prefs: &TripPreferences) -> TripInsights {
    let budget = prefs.budget.max(0);
    let mut total_cost = itinerary.total_estimated_cost;
    if total_cost == 0 {
        total_cost = if budget > 0 { budget } else { 1 };
    }

    let mut findings = Findings {
        alerts: Vec::new(),
        actions: Vec::new(),
    };

    let activities_blob = itinerary
        .activities()
        .map(|activity| {
            format!(
                "{} {}",
                clean_snippet(&activity.title),
                clean_snippet(&activity.description)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let budget_score = score_budget(budget, total_cost, &mut findings);
    let logistics_score = score_logistics(itinerary, &mut findings);
    let weather_score = score_weather(itinerary.weather_advisory.as_deref(), &mut findings);
    let impact_score = score_sustainability(itinerary, &activities_blob, total_cost, &mut findings);
    let experience_score = score_experience(itinerary, prefs, &activities_blob, &mut findings);

    let axes = vec![
        axis(
            "budget",
            "Budget Fit",
            budget_score,
            "Compares projected spend against your stated budget.",
        ),
        axis(
            "logistics",
            "Logistics Flow",
            logistics_score,
            "Looks at activity density and travel day stretch.",
        ),
        axis(
            "weather",
            "Weather Resilience",
            weather_score,
            "Reflects risk from current advisory notes.",
        ),
        axis(
            "impact",
            "Sustainability",
            impact_score,
            "Balances low-carbon modes and community-first picks.",
        ),
        axis(
            "experience",
            "Experience Fit",
            experience_score,
            "Measures alignment between themes and planned highlights.",
        ),
    ];

    let mean = axes.iter().map(|axis| axis.score).sum::<i64>() as f64 / axes.len() as f64;
    let overall_score = mean.round_ties_even() as i64;
    let badge = if overall_score >= 80 {
        "Launch-ready"
    } else if overall_score >= 65 {
        "Tune & shine"
    } else {
        "Needs attention"
    };

    TripInsights {
        overall_score,
        badge: badge.to_string(),
        axes,
        alerts: findings.alerts,
        suggested_actions: findings.actions,
        generated_at: Utc::now().to_rfc3339(),
    }
}

fn axis(id: &str, label: &str, score: i64, explanation: &str) -> InsightAxis {
    InsightAxis {
        id: id.to_string(),
        label: label.to_string(),
        score,
        status: AxisStatus::from_score(score),
        explanation: explanation.to_string(),
    }
}

fn score_budget(budget: i64, total_cost: i64, findings: &mut Findings) -> i64 {
    if budget <= 0 {
        return 75;
    }
    if total_cost <= budget {
        let cushion = budget - total_cost;
        let ratio = cushion as f64 / budget as f64;
        if cushion as f64 > 0.15 * budget as f64 {
            findings.action("Reinvest budget buffer into a signature local experience.");
        }
        ((82.0 + ratio * 25.0) as i64).min(100)
    } else {
        let overshoot = total_cost - budget;
        let ratio = overshoot as f64 / budget as f64;
        findings.alert(format!(
            "Projected spend exceeds budget by \u{20b9}{}.",
            group_thousands(overshoot)
        ));
        findings.action("Enable budget guardrails to auto-swap premium slots with value picks.");
        ((82.0 - ratio * 90.0) as i64).max(30)
    }
}

fn score_logistics(itinerary: &Itinerary, findings: &mut Findings) -> i64 {
    let mut spans = Vec::new();
    let mut counts = Vec::new();
    for day in &itinerary.days {
        counts.push(day.activities.len());
        let minutes: Vec<i64> = day
            .activities
            .iter()
            .filter_map(|activity| parse_minutes(&activity.time))
            .collect();
        if let (Some(min), Some(max)) = (minutes.iter().min(), minutes.iter().max()) {
            spans.push(max - min);
        }
    }

    let mut score = 82;
    if !spans.is_empty() {
        let average = spans.iter().sum::<i64>() as f64 / spans.len() as f64;
        if average > 720.0 {
            score -= 12;
        }
        if spans.iter().any(|span| *span > 840) {
            score -= 10;
        }
    }
    if !counts.is_empty() {
        let average = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        if average > 4.2 {
            score -= 8;
            findings.action("Trim one activity from the busiest day to reduce rush between stops.");
        }
    }
    score.clamp(35, 100)
}

fn score_weather(advisory: Option<&str>, findings: &mut Findings) -> i64 {
    let Some(advisory) = advisory.map(str::trim).filter(|text| !text.is_empty()) else {
        return 90;
    };
    let text = advisory.to_lowercase();
    if SEVERE_WEATHER.iter().any(|token| text.contains(token)) {
        findings.alert("Severe weather flagged. Prepare plan B indoor experiences.");
        findings.action("Shift exposed activities indoors on risky days to stay comfortable.");
        55
    } else if text.contains("rain") || text.contains("shower") {
        findings.action("Pack light rain gear and shift open-air slots earlier in the day.");
        70
    } else if text.contains("heat") {
        68
    } else {
        78
    }
}

fn score_sustainability(
    itinerary: &Itinerary,
    activities_blob: &str,
    total_cost: i64,
    findings: &mut Findings,
) -> i64 {
    let green_hits = GREEN_KEYWORDS
        .iter()
        .filter(|keyword| activities_blob.contains(*keyword))
        .count() as i64;
    let carbon_hits = CARBON_KEYWORDS
        .iter()
        .filter(|keyword| activities_blob.contains(*keyword))
        .count() as i64;
    let mut score = 74 + green_hits * 4 - carbon_hits * 5;

    let transport_cost: i64 = itinerary
        .cost_breakdown
        .iter()
        .filter(|item| item.category.to_lowercase().contains("transport"))
        .map(|item| item.amount)
        .sum();
    if total_cost != 0 {
        let share = transport_cost as f64 / total_cost as f64;
        if share > 0.35 {
            score -= 12;
            findings.action("Swap at least one cab ride for a curated walking or metro experience.");
        } else if share < 0.15 {
            score += 6;
        }
    }
    score.clamp(25, 100)
}

fn score_experience(
    itinerary: &Itinerary,
    prefs: &TripPreferences,
    activities_blob: &str,
    findings: &mut Findings,
) -> i64 {
    let keywords: Vec<String> = prefs.themes.iter().map(|theme| theme.to_lowercase()).collect();
    let summaries = itinerary
        .days
        .iter()
        .map(|day| clean_snippet(&day.summary))
        .collect::<Vec<_>>()
        .join(" ");
    let text_blob = format!("{} {}", activities_blob, summaries).to_lowercase();

    let coverage = if keywords.is_empty() {
        1.0
    } else {
        let matches = keywords
            .iter()
            .filter(|keyword| !keyword.is_empty() && text_blob.contains(keyword.as_str()))
            .count();
        matches as f64 / keywords.len() as f64
    };
    if coverage < 0.5 && !keywords.is_empty() {
        findings.action("Infuse more of the selected themes into late-day slots for balance.");
    }
    ((68.0 + coverage * 30.0) as i64).clamp(35, 100)
}
