//! In-memory conversation store.
//!
//! Sole owner of conversation and message data. Every operation is
//! synchronous and infallible: unknown ids are ignored, and callers are
//! expected to check existence first (see [`ConversationStore::active`]).

use tutor_types::{conversation::Conversation, message::Message};

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    /// Conversation ids in the order they were pinned, oldest first
    pin_order: Vec<String>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list (initial load). Active is cleared.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.pin_order = conversations
            .iter()
            .filter(|c| c.pinned)
            .map(|c| c.id.clone())
            .collect();
        self.conversations = conversations;
        self.active_id = None;
    }

    /// Conversations in insertion order.
    pub fn list_conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Pinned first, otherwise insertion order. Store order is not touched.
    pub fn sorted_for_display(&self) -> Vec<&Conversation> {
        let mut sorted: Vec<&Conversation> = self.conversations.iter().collect();
        sorted.sort_by_key(|c| !c.pinned);
        sorted
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Make `id` active. Unknown ids clear the active pointer.
    pub fn set_active(&mut self, id: &str) {
        self.active_id = self.get(id).map(|c| c.id.clone());
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Append-only; no-op if the conversation is unknown.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) {
        if let Some(c) = self.get_mut(conversation_id) {
            c.messages.push(message);
        }
    }

    /// Pop the tail message.
    pub fn remove_last_message(&mut self, conversation_id: &str) -> Option<Message> {
        self.get_mut(conversation_id).and_then(|c| c.messages.pop())
    }

    /// Remove a message by id. Used to retract placeholders by their captured
    /// ids, so an out-of-order response can never retract the wrong pair.
    pub fn remove_message(&mut self, conversation_id: &str, message_id: &str) -> Option<Message> {
        let c = self.get_mut(conversation_id)?;
        let pos = c.messages.iter().position(|m| m.id == message_id)?;
        if c.pinned_message_id.as_deref() == Some(message_id) {
            c.pinned_message_id = None;
        }
        Some(c.messages.remove(pos))
    }

    /// At most one pinned message per conversation; setting replaces.
    pub fn set_pinned_message(&mut self, conversation_id: &str, message_id: Option<&str>) {
        if let Some(c) = self.get_mut(conversation_id) {
            c.pinned_message_id = message_id.map(str::to_string);
        }
    }

    /// Flip the conversation's pin. Returns the new state.
    pub fn toggle_pin(&mut self, conversation_id: &str) -> Option<bool> {
        let c = self.get_mut(conversation_id)?;
        c.pinned = !c.pinned;
        let pinned = c.pinned;
        self.pin_order.retain(|id| id != conversation_id);
        if pinned {
            self.pin_order.push(conversation_id.to_string());
        }
        Some(pinned)
    }

    /// Insert a server-created conversation at the end of the list.
    pub fn create_conversation(&mut self, seed: Conversation) {
        if self.get(&seed.id).is_some() {
            return;
        }
        if seed.pinned {
            self.pin_order.push(seed.id.clone());
        }
        self.conversations.push(seed);
    }

    /// Remove a conversation. If it was active, the most recently pinned
    /// remaining conversation becomes active, else the first remaining, else none.
    pub fn delete_conversation(&mut self, id: &str) -> Option<Conversation> {
        let pos = self.conversations.iter().position(|c| c.id == id)?;
        let removed = self.conversations.remove(pos);
        self.pin_order.retain(|p| p != id);

        if self.active_id.as_deref() == Some(id) {
            let next = self
                .pin_order
                .iter()
                .rev()
                .find(|p| self.get(p).is_some_and(|c| c.pinned))
                .cloned()
                .or_else(|| self.conversations.first().map(|c| c.id.clone()));
            self.active_id = next;
        }
        Some(removed)
    }
}
