//! Keyword intent classification and city extraction for location queries.

use regex::Regex;

const WEATHER_KEYWORDS: &[&str] = &["clima", "tempo", "temperatura", "previsão", "chuva", "sol"];

const DATETIME_KEYWORDS: &[&str] = &[
    "horas",
    "hora",
    "horário",
    "data",
    "dia",
    "que horas",
    "que dia",
    "qual horário",
    "qual data",
    "que dia é hoje",
    "que horas são",
    "data atual",
    "horário atual",
];

/// Longest reply still accepted as a bare city name in strict mode.
const STRICT_MAX_CITY_CHARS: usize = 50;
const STRICT_MAX_CITY_WORDS: usize = 3;

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Weather,
    DateTime,
    General,
}

/// Classify an utterance by keyword. Weather wins when both sets match.
pub fn classify(utterance: &str) -> Intent {
    let lower = utterance.to_lowercase();

    if WEATHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Intent::Weather
    } else if DATETIME_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Intent::DateTime
    } else {
        Intent::General
    }
}

/// Pulls a city name out of an utterance using ordered pattern rules.
pub struct CityExtractor {
    rules: Vec<Regex>,
    bare_city: Regex,
    strict: bool,
}

impl Default for CityExtractor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CityExtractor {
    /// With `strict` set, the bare-city fallback only accepts short replies.
    pub fn new(strict: bool) -> Self {
        let rules = [
            r"(?i)(?:horas|hora|horário|data|dia|tempo|clima|temperatura) (?:em|de|na|no|para) ([^,.!?]+)",
            r"(?i)(?:que horas|que dia|qual horário|qual data) (?:em|de|na|no|para) ([^,.!?]+)",
            r"(?i)(?:clima|tempo|temperatura) (?:em|de|na|no|para) ([^,.!?]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Invalid city regex"))
        .collect();

        Self {
            rules,
            bare_city: Regex::new(r"^([^,.!?]+)$").expect("Invalid bare city regex"),
            strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns the first non-empty capture, trimmed.
    pub fn extract_city(&self, utterance: &str) -> Option<String> {
        for rule in &self.rules {
            if let Some(city) = capture(rule, utterance) {
                return Some(city);
            }
        }

        let city = capture(&self.bare_city, utterance)?;
        if self.strict && !looks_like_bare_city(&city) {
            return None;
        }
        Some(city)
    }
}

fn capture(rule: &Regex, utterance: &str) -> Option<String> {
    let city = rule.captures(utterance)?.get(1)?.as_str().trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

fn looks_like_bare_city(candidate: &str) -> bool {
    candidate.chars().count() < STRICT_MAX_CITY_CHARS
        && candidate.split_whitespace().count() <= STRICT_MAX_CITY_WORDS
}
