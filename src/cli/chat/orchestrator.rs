//! Routes each utterance to the clarifying question, a location lookup or the
//! language model, and records the turn.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::ContextManager;
use super::conversation_state::{ConversationState, Message, MAX_HISTORY};
use super::error::ChatError;
use super::intent::CityExtractor;
use super::lookups::LocationServices;
use super::services::{LanguageModel, NetworkCheck};
use super::session::{SessionContext, Step};

pub struct DialogueOrchestrator {
    conversation_state: ConversationState,
    session: SessionContext,
    context_manager: ContextManager,
    city_extractor: CityExtractor,
    language_model: Option<Arc<dyn LanguageModel>>,
    location: Option<LocationServices>,
    network: Arc<dyn NetworkCheck>,
    last_error: Option<String>,
}

impl DialogueOrchestrator {
    pub fn new(conversation_state: ConversationState, network: Arc<dyn NetworkCheck>) -> Self {
        Self {
            conversation_state,
            session: SessionContext::new(),
            context_manager: ContextManager::default(),
            city_extractor: CityExtractor::default(),
            language_model: None,
            location: None,
            network,
            last_error: None,
        }
    }

    pub fn with_language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Enables weather and date/time answers.
    pub fn with_location(mut self, location: LocationServices) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_city_extractor(mut self, extractor: CityExtractor) -> Self {
        self.city_extractor = extractor;
        self
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation_state.get_messages()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The error from the last submission, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[cfg(test)]
    pub fn conversation_state(&self) -> &ConversationState {
        &self.conversation_state
    }

    /// Clears the conversation in memory and in storage.
    pub fn clear(&mut self) {
        info!("Clearing conversation");
        self.conversation_state.clear();
        self.last_error = None;
    }

    /// Handles one user turn and returns the assistant reply.
    ///
    /// The utterance is always recorded. The reply is recorded only on
    /// success; errors are kept as `last_error` instead.
    pub async fn handle_user_message(&mut self, text: &str) -> Result<String, ChatError> {
        self.last_error = None;

        let utterance = text.trim();
        if utterance.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let window = self.conversation_state.windowed(MAX_HISTORY).to_vec();
        self.conversation_state.add_user_message(utterance);

        let result = self.respond(utterance, &window).await;
        match &result {
            Ok(reply) => self.conversation_state.add_assistant_message(reply),
            Err(e) => {
                warn!("Turn failed: {:?}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }

    async fn respond(&mut self, utterance: &str, window: &[Message]) -> Result<String, ChatError> {
        if !self.network.is_online().await {
            return Err(ChatError::Offline);
        }

        let (session, step) = std::mem::take(&mut self.session).route(
            utterance,
            &self.city_extractor,
            self.location.is_some(),
        );
        self.session = session;
        debug!("Routing step: {:?}, session: {:?}", step, self.session);

        match step {
            Step::AskForCity(purpose) => Ok(purpose.clarifying_question().to_string()),
            Step::Lookup { purpose, city } => match self.location.clone() {
                Some(location) => {
                    let result = location.lookup(purpose, &city).await;
                    if let Err(e) = &result {
                        if e.invalidates_city() {
                            self.session = std::mem::take(&mut self.session).lookup_failed();
                        }
                    }
                    result
                }
                None => self.converse(utterance, window).await,
            },
            Step::Converse => self.converse(utterance, window).await,
        }
    }

    async fn converse(&self, utterance: &str, window: &[Message]) -> Result<String, ChatError> {
        let model = self.language_model.as_ref().ok_or(ChatError::ModelUnavailable)?;
        let prompt = self.context_manager.build_prompt(window, utterance);
        model.complete(&prompt).await.map_err(ChatError::model_request)
    }
}
