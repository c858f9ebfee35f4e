use thiserror::Error;

use super::session::LookupPurpose;

/// Shown when the language model replies with something we cannot read.
pub const MODEL_REQUEST_FALLBACK: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente mais tarde.";

/// Errors surfaced to the user as the single visible error line.
///
/// None of these are ever appended to the conversation history.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("A mensagem não pode estar vazia.")]
    EmptyMessage,

    #[error("Parece que você está offline. Verifique sua conexão e tente novamente.")]
    Offline,

    #[error("Não foi possível encontrar a cidade {city}. Verifique se o nome da cidade está correto.")]
    CityNotFound { city: String },

    #[error(
        "Não foi possível obter {} para {}. Verifique se o nome da cidade está correto.",
        .purpose.subject(),
        .city
    )]
    Lookup { purpose: LookupPurpose, city: String },

    #[error("API Gemini não inicializada corretamente.")]
    ModelUnavailable,

    #[error("{0}")]
    ModelRequest(String),
}

impl ChatError {
    pub fn model_request(detail: impl std::fmt::Display) -> Self {
        tracing::error!("Language model request failed: {}", detail);
        Self::ModelRequest(MODEL_REQUEST_FALLBACK.to_string())
    }

    /// Location lookups that failed after the user named a city.
    ///
    /// These reset the remembered city and the pending query.
    pub fn invalidates_city(&self) -> bool {
        matches!(self, Self::CityNotFound { .. } | Self::Lookup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_carry_city_name() {
        let err = ChatError::CityNotFound { city: "Atlantis".to_string() };
        assert!(err.to_string().contains("Atlantis"));

        let err = ChatError::Lookup {
            purpose: LookupPurpose::Weather,
            city: "Curitiba".to_string(),
        };
        assert!(err.to_string().contains("Curitiba"));
    }

    #[test]
    fn test_lookup_message_names_what_failed() {
        let weather = ChatError::Lookup {
            purpose: LookupPurpose::Weather,
            city: "Recife".to_string(),
        };
        assert_eq!(
            weather.to_string(),
            "Não foi possível obter informações do clima para Recife. Verifique se o nome da cidade está correto."
        );

        let time = ChatError::Lookup {
            purpose: LookupPurpose::DateTime,
            city: "Recife".to_string(),
        };
        assert_eq!(
            time.to_string(),
            "Não foi possível obter a data e hora para Recife. Verifique se o nome da cidade está correto."
        );
    }

    #[test]
    fn test_offline_message_is_fixed() {
        assert_eq!(
            ChatError::Offline.to_string(),
            "Parece que você está offline. Verifique sua conexão e tente novamente."
        );
    }

    #[test]
    fn test_model_request_hides_detail() {
        let err = ChatError::model_request("HTTP 500: upstream exploded");
        assert_eq!(err.to_string(), MODEL_REQUEST_FALLBACK);
    }

    #[test]
    fn test_only_location_errors_invalidate_city() {
        assert!(ChatError::CityNotFound { city: "x".into() }.invalidates_city());
        let lookup = ChatError::Lookup {
            purpose: LookupPurpose::DateTime,
            city: "x".into(),
        };
        assert!(lookup.invalidates_city());
        assert!(!ChatError::Offline.invalidates_city());
        assert!(!ChatError::ModelUnavailable.invalidates_city());
        assert!(!ChatError::ModelRequest("x".into()).invalidates_city());
    }
}
