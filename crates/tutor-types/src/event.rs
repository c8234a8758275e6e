use serde::{Deserialize, Serialize};
use crate::conversation::Conversation;

/// Events emitted by the chat session for mode-specific page logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A conversation was created on the server and is now active
    NewConversationCreated { conversation: Conversation },
    /// A conversation was deleted; carries how many remain
    ConversationDeleted { remaining_count: usize },
    /// Chrome outside the message list should be refreshed
    UiRefreshRequested,
    /// The user flagged an assistant message for review
    MessageFlagged { conversation_id: String, message_id: String },
    /// A user-initiated operation failed on the server
    OperationFailed { operation: String, error: String },
}
