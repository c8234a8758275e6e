use serde::{Deserialize, Serialize};

/// Id prefix of optimistic messages shown before the server confirms a send.
pub const PLACEHOLDER_PREFIX: &str = "pending-";
/// Id prefix of client-only notices (e.g. a failed send).
pub const LOCAL_PREFIX: &str = "local-";

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message.
///
/// Server-issued messages are immutable once received; pinning is recorded
/// on the owning [`Conversation`](crate::conversation::Conversation), never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub author_ref: String,
    #[serde(alias = "content")]
    pub text: String,
    #[serde(default, alias = "timestamp")]
    pub created_at_epoch_ms: i64,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        role: Role,
        author_ref: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            author_ref: author_ref.into(),
            text: text.into(),
            created_at_epoch_ms: now_epoch_ms(),
        }
    }

    pub fn user(id: impl Into<String>, author_ref: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, Role::User, author_ref, text)
    }

    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, "assistant", text)
    }

    /// Optimistic message with a fresh `pending-` id.
    pub fn placeholder(role: Role, author_ref: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            format!("{}{}", PLACEHOLDER_PREFIX, uuid::Uuid::new_v4()),
            role,
            author_ref,
            text,
        )
    }

    /// Client-only assistant notice, never sent to or confirmed by the server.
    pub fn local_notice(text: impl Into<String>) -> Self {
        Self::new(
            format!("{}{}", LOCAL_PREFIX, uuid::Uuid::new_v4()),
            Role::Assistant,
            "assistant",
            text,
        )
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_PREFIX)
    }

    /// True when the message carries a server-issued id.
    pub fn is_confirmed(&self) -> bool {
        !self.is_placeholder() && !self.is_local()
    }
}

pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
