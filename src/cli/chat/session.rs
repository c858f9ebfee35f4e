//! Cross-turn dialogue state: the pending city question and the remembered city.
//!
//! Transitions are pure. `SessionContext::route` takes the current context and
//! an utterance and returns the next context together with the step the
//! orchestrator has to perform. Nothing here does I/O.

use super::intent::{classify, CityExtractor, Intent};

/// Which lookup a city is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPurpose {
    Weather,
    DateTime,
}

impl LookupPurpose {
    /// The question asked when no city is known yet.
    pub fn clarifying_question(&self) -> &'static str {
        match self {
            LookupPurpose::Weather => {
                "Para te informar sobre o clima, preciso saber em qual cidade você mora. Pode me dizer?"
            }
            LookupPurpose::DateTime => {
                "Para te informar a hora correta, preciso saber em qual cidade você mora. Pode me dizer?"
            }
        }
    }

    /// What a failed lookup could not fetch, as shown in the error line.
    pub fn subject(&self) -> &'static str {
        match self {
            LookupPurpose::Weather => "informações do clima",
            LookupPurpose::DateTime => "a data e hora",
        }
    }

    fn from_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::Weather => Some(LookupPurpose::Weather),
            Intent::DateTime => Some(LookupPurpose::DateTime),
            Intent::General => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingQuery {
    #[default]
    Idle,
    AwaitingCity(LookupPurpose),
}

/// What the orchestrator should do with the current utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Reply with the clarifying question; no adapter is called.
    AskForCity(LookupPurpose),
    /// Run the location lookup for `city`.
    Lookup { purpose: LookupPurpose, city: String },
    /// Hand the utterance to the language model.
    Converse,
}

/// Volatile per-session dialogue state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pending: PendingQuery,
    city: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> PendingQuery {
        self.pending
    }

    #[cfg(test)]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Decide the step for `utterance`.
    ///
    /// With `location_enabled` unset, weather and date/time questions go to the
    /// language model and the context never leaves `Idle`.
    pub fn route(
        self,
        utterance: &str,
        extractor: &CityExtractor,
        location_enabled: bool,
    ) -> (SessionContext, Step) {
        if let PendingQuery::AwaitingCity(purpose) = self.pending {
            match answer_city(utterance, extractor) {
                Some(city) => {
                    let next = SessionContext {
                        pending: PendingQuery::Idle,
                        city: Some(city.clone()),
                    };
                    return (next, Step::Lookup { purpose, city });
                }
                // Only reachable in strict mode: the reply did not look like a
                // city, so drop the question and treat it as a new utterance.
                None => {
                    let released = SessionContext {
                        pending: PendingQuery::Idle,
                        ..self
                    };
                    return released.route(utterance, extractor, location_enabled);
                }
            }
        }

        if !location_enabled {
            return (self, Step::Converse);
        }

        match LookupPurpose::from_intent(classify(utterance)) {
            Some(purpose) => match self.city.clone() {
                Some(city) => (self, Step::Lookup { purpose, city }),
                None => {
                    let next = SessionContext {
                        pending: PendingQuery::AwaitingCity(purpose),
                        city: None,
                    };
                    (next, Step::AskForCity(purpose))
                }
            },
            None => (self, Step::Converse),
        }
    }

    /// A lookup using the remembered city failed: forget it and go idle.
    pub fn lookup_failed(self) -> SessionContext {
        SessionContext::default()
    }
}

fn answer_city(utterance: &str, extractor: &CityExtractor) -> Option<String> {
    if let Some(city) = extractor.extract_city(utterance) {
        return Some(city);
    }
    if extractor.is_strict() {
        return None;
    }
    let raw = utterance.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
