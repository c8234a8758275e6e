use serde::{Deserialize, Serialize};
use crate::message::Message;

pub const DEFAULT_TITLE: &str = "New Conversation";

/// A titled, ordered sequence of messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub pinned_message_id: Option<String>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            pinned: false,
            pinned_message_id: None,
        }
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The pinned message, if the pin still refers to a message in this conversation.
    pub fn pinned_message(&self) -> Option<&Message> {
        self.pinned_message_id
            .as_deref()
            .and_then(|id| self.message(id))
    }

    pub fn is_message_pinned(&self, id: &str) -> bool {
        self.pinned_message_id.as_deref() == Some(id)
    }
}
