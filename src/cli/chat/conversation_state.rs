use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::history_storage::HistoryStorage;

/// Number of messages handed to the language model as context.
pub const MAX_HISTORY: usize = 10;

/// A single chat message. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_user: true }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_user: false }
    }

    /// Label used when the message is rendered into a prompt transcript.
    pub fn role_label(&self) -> &'static str {
        if self.is_user { "Usuário" } else { "Assistente" }
    }
}

/// Ordered message log, written through to durable storage on every change.
pub struct ConversationState {
    messages: Vec<Message>,
    storage: Box<dyn HistoryStorage>,
}

impl ConversationState {
    /// Restores the conversation from `storage`.
    ///
    /// Unreadable or corrupted contents are discarded and the conversation
    /// starts empty.
    pub fn load(storage: Box<dyn HistoryStorage>) -> Self {
        let messages = match storage.read() {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<Message>>(&contents) {
                Ok(messages) => messages,
                Err(e) => {
                    warn!("Discarding corrupted conversation history: {}", e);
                    if let Err(e) = storage.remove() {
                        warn!("Failed to remove corrupted conversation history: {}", e);
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read conversation history: {}", e);
                Vec::new()
            }
        };

        debug!("Loaded {} messages from history", messages.len());

        Self { messages, storage }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.append(Message::user(message));
    }

    pub fn add_assistant_message(&mut self, message: &str) {
        self.append(Message::assistant(message));
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.save();
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages in conversation order.
    pub fn windowed(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Empties the conversation and erases it from storage.
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Err(e) = self.storage.remove() {
            warn!("Failed to erase conversation history: {}", e);
        }
    }

    pub fn save(&self) {
        let contents = match serde_json::to_string(&self.messages) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to serialize conversation history: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.write(&contents) {
            warn!("Failed to persist conversation history: {}", e);
        }
    }

    #[cfg(test)]
    pub fn storage(&self) -> &dyn HistoryStorage {
        self.storage.as_ref()
    }

    #[cfg(test)]
    pub fn into_storage(self) -> Box<dyn HistoryStorage> {
        self.storage
    }
}
