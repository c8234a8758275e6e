//! Chat session: the orchestrating controller.
//!
//! Owns the store and the reconciler, talks to the gateway, and applies
//! [`UiAction`]s posted by DOM handlers and observers. A send follows a fixed
//! order:
//!
//! 1. append the user + "thinking" placeholders, render
//! 2. await the gateway (the only suspension point)
//! 3. retract both placeholders by their captured ids
//! 4. append the server messages (or a local error notice), render
//!
//! A second send on a conversation with a request outstanding is refused,
//! and a response for a conversation that is no longer active updates the
//! store without rendering.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use tutor_types::{
    Result, TutorError,
    config::TutorConfig,
    conversation::Conversation,
    event::ChatEvent,
    message::{Message, Role},
};
use crate::artefact::ArtefactExtractor;
use crate::event_bus::EventBus;
use crate::ports::{ConversationGateway, RenderTarget};
use crate::reconciler::MessageReconciler;
use crate::store::ConversationStore;

/// Something the user (or a page observer) asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Send { text: String },
    NewConversation,
    DeleteActive,
    TogglePinActive,
    SelectConversation { conversation_id: String },
    TogglePinMessage { conversation_id: String, message_id: String },
    FlagMessage { conversation_id: String, message_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent,
    Empty,
    NoActiveConversation,
    /// A request for this conversation is still outstanding
    Busy,
    /// The round trip failed; `text` is the user's input, for restoring the draft
    Failed { text: String, error: TutorError },
}

/// Ids of the two optimistic messages of one outstanding send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderBatch {
    pub conversation_id: String,
    pub user_id: String,
    pub assistant_id: String,
}

pub struct ChatSession<D: RenderTarget> {
    config: TutorConfig,
    store: RefCell<ConversationStore>,
    reconciler: RefCell<MessageReconciler<D>>,
    gateway: Rc<dyn ConversationGateway>,
    event_bus: EventBus,
    in_flight: RefCell<HashSet<String>>,
    actions_tx: UnboundedSender<UiAction>,
    actions_rx: RefCell<Option<UnboundedReceiver<UiAction>>>,
}

impl<D: RenderTarget> ChatSession<D> {
    pub fn new(
        config: TutorConfig,
        dom: Rc<D>,
        gateway: Rc<dyn ConversationGateway>,
        event_bus: EventBus,
    ) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded();
        let reconciler = MessageReconciler::new(
            dom,
            config.anchors.clone(),
            ArtefactExtractor::new(config.artefact.clone()),
            actions_tx.clone(),
        );
        Self {
            config,
            store: RefCell::new(ConversationStore::new()),
            reconciler: RefCell::new(reconciler),
            gateway,
            event_bus,
            in_flight: RefCell::new(HashSet::new()),
            actions_tx,
            actions_rx: RefCell::new(Some(actions_rx)),
        }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn store(&self) -> Ref<'_, ConversationStore> {
        self.store.borrow()
    }

    pub fn reconciler(&self) -> Ref<'_, MessageReconciler<D>> {
        self.reconciler.borrow()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Sender for posting actions into the session
    pub fn actions(&self) -> UnboundedSender<UiAction> {
        self.actions_tx.clone()
    }

    pub fn is_busy(&self, conversation_id: &str) -> bool {
        self.in_flight.borrow().contains(conversation_id)
    }

    // ─── Action loop ─────────────────────────────────────────

    /// Apply posted actions until every sender is gone.
    ///
    /// Actions run concurrently so a pending send never blocks a switch or
    /// delete; they only interleave at gateway awaits.
    pub async fn run_actions(&self) {
        let Some(rx) = self.actions_rx.borrow_mut().take() else {
            log::warn!("action loop already running");
            return;
        };
        rx.for_each_concurrent(None, |action| self.handle_action(action)).await;
    }

    pub async fn handle_action(&self, action: UiAction) {
        log::debug!("action: {:?}", action);
        match action {
            UiAction::Send { text } => match self.send_message(&text).await {
                SendOutcome::Failed { text, .. } => self.reconciler.borrow().restore_draft(&text),
                // The input was cleared on submit; nothing was sent, so give it back
                SendOutcome::Busy | SendOutcome::NoActiveConversation => {
                    self.reconciler.borrow().restore_draft(&text);
                }
                SendOutcome::Sent | SendOutcome::Empty => {}
            },
            UiAction::NewConversation => {
                let result = self.create_conversation().await.map(|_| ());
                self.report("create conversation", result);
            }
            UiAction::DeleteActive => {
                let active = self.store.borrow().active_id().map(str::to_string);
                if let Some(id) = active {
                    let result = self.delete_conversation(&id).await;
                    self.report("delete conversation", result);
                }
            }
            UiAction::TogglePinActive => {
                let active = self.store.borrow().active_id().map(str::to_string);
                if let Some(id) = active {
                    self.toggle_pin(&id).await;
                }
            }
            UiAction::SelectConversation { conversation_id } => {
                self.switch_conversation(&conversation_id);
            }
            UiAction::TogglePinMessage { conversation_id, message_id } => {
                self.toggle_message_pin(&conversation_id, &message_id).await;
            }
            UiAction::FlagMessage { conversation_id, message_id } => {
                self.flag_message(&conversation_id, &message_id);
            }
        }
    }

    // ─── Operations ──────────────────────────────────────────

    /// Fetch the user's conversations and render the first (pinned preferred).
    pub async fn load(&self) -> Result<()> {
        let conversations = self
            .gateway
            .list_conversations(&self.config.user_ref, &self.config.course_ref)
            .await
            .inspect_err(|e| log::error!("Failed to load conversations: {}", e))?;

        {
            let mut store = self.store.borrow_mut();
            store.replace_all(conversations);
            let first = store.sorted_for_display().first().map(|c| c.id.clone());
            if let Some(id) = first {
                store.set_active(&id);
            }
            log::info!("Loaded {} conversations", store.len());
        }

        self.render_full();
        self.event_bus.emit(ChatEvent::UiRefreshRequested);
        Ok(())
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Empty;
        }
        let Some(conversation_id) = self.store.borrow().active_id().map(str::to_string) else {
            return SendOutcome::NoActiveConversation;
        };
        if !self.in_flight.borrow_mut().insert(conversation_id.clone()) {
            log::warn!("send refused: request outstanding for {}", conversation_id);
            return SendOutcome::Busy;
        }

        let batch = self.append_placeholders(&conversation_id, text);
        self.refresh_send_control();
        self.render_incremental();

        let result = self.gateway.post_message(&conversation_id, text).await;

        self.in_flight.borrow_mut().remove(&conversation_id);
        {
            let mut store = self.store.borrow_mut();
            store.remove_message(&batch.conversation_id, &batch.assistant_id);
            store.remove_message(&batch.conversation_id, &batch.user_id);
            match &result {
                Ok(exchange) => {
                    store.append_message(&conversation_id, exchange.user_message.clone());
                    store.append_message(&conversation_id, exchange.assistant_message.clone());
                }
                Err(e) => {
                    store.append_message(&conversation_id, Message::local_notice(format!("Error: {}", e)));
                }
            }
        }

        let still_active = self.store.borrow().active_id() == Some(conversation_id.as_str());
        if still_active {
            self.render_incremental();
        } else {
            log::debug!("response for inactive conversation {}; render skipped", conversation_id);
        }
        self.refresh_send_control();

        match result {
            Ok(_) => SendOutcome::Sent,
            Err(error) => {
                log::error!("Send failed for {}: {}", conversation_id, error);
                SendOutcome::Failed { text: text.to_string(), error }
            }
        }
    }

    /// Create a conversation on the server and make it active.
    pub async fn create_conversation(&self) -> Result<Conversation> {
        let conversation = self
            .gateway
            .create_conversation(&self.config.course_ref)
            .await
            .inspect_err(|e| log::error!("Failed to create conversation: {}", e))?;

        {
            let mut store = self.store.borrow_mut();
            store.create_conversation(conversation.clone());
            store.set_active(&conversation.id);
        }
        log::info!("Created conversation {}", conversation.id);

        self.render_full();
        self.event_bus.emit(ChatEvent::NewConversationCreated {
            conversation: conversation.clone(),
        });
        Ok(conversation)
    }

    /// Delete on the server first; local state changes only on success.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        if self.store.borrow().get(conversation_id).is_none() {
            return Err(TutorError::NotFound(conversation_id.to_string()));
        }
        self.gateway
            .delete_conversation(conversation_id)
            .await
            .inspect_err(|e| log::error!("Failed to delete {}: {}", conversation_id, e))?;

        let remaining_count = {
            let mut store = self.store.borrow_mut();
            store.delete_conversation(conversation_id);
            store.len()
        };
        log::info!("Deleted conversation {} ({} remaining)", conversation_id, remaining_count);

        self.render_incremental();
        self.render_conversation_list();
        self.refresh_send_control();
        self.event_bus.emit(ChatEvent::ConversationDeleted { remaining_count });
        Ok(())
    }

    /// Flip the conversation pin locally, then tell the server without
    /// waiting on it for anything but a log line.
    pub async fn toggle_pin(&self, conversation_id: &str) {
        let Some(pinned) = self.store.borrow_mut().toggle_pin(conversation_id) else {
            return;
        };
        self.render_incremental();
        self.render_conversation_list();

        if let Err(e) = self.gateway.set_pin_status(conversation_id, pinned).await {
            log::warn!("Failed to persist pin for {}: {}", conversation_id, e);
        }
    }

    /// Switch the active conversation and rebuild the message list.
    pub fn switch_conversation(&self, conversation_id: &str) {
        {
            let mut store = self.store.borrow_mut();
            if store.get(conversation_id).is_none() || store.active_id() == Some(conversation_id) {
                return;
            }
            store.set_active(conversation_id);
        }
        log::info!("Switched to conversation {}", conversation_id);
        self.render_full();
        self.event_bus.emit(ChatEvent::UiRefreshRequested);
    }

    /// Pin `message_id`, or unpin it if it is already the pinned message.
    pub async fn toggle_message_pin(&self, conversation_id: &str, message_id: &str) {
        let target = {
            let mut store = self.store.borrow_mut();
            let Some(conversation) = store.get(conversation_id) else {
                return;
            };
            let target = if conversation.is_message_pinned(message_id) {
                None
            } else {
                Some(message_id.to_string())
            };
            store.set_pinned_message(conversation_id, target.as_deref());
            target
        };

        if self.store.borrow().active_id() == Some(conversation_id) {
            self.render_incremental();
        }

        if let Err(e) = self
            .gateway
            .set_pinned_message(conversation_id, target.as_deref())
            .await
        {
            log::warn!("Failed to persist pinned message for {}: {}", conversation_id, e);
        }
    }

    /// Hand an assistant message over to the reporting flow.
    pub fn flag_message(&self, conversation_id: &str, message_id: &str) {
        log::info!("Flagged message {} in {}", message_id, conversation_id);
        self.event_bus.emit(ChatEvent::MessageFlagged {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
        });
    }

    // ─── Helpers ─────────────────────────────────────────────

    /// Surface the outcome of a user-initiated operation on the page.
    fn report(&self, operation: &str, result: Result<()>) {
        match result {
            Ok(()) => self.reconciler.borrow().show_status(None),
            Err(error) => {
                self.reconciler
                    .borrow()
                    .show_status(Some(&format!("Could not {}: {}", operation, error)));
                self.event_bus.emit(ChatEvent::OperationFailed {
                    operation: operation.to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    fn append_placeholders(&self, conversation_id: &str, text: &str) -> PlaceholderBatch {
        let user = Message::placeholder(Role::User, self.config.user_ref.clone(), text);
        let assistant = Message::placeholder(
            Role::Assistant,
            "assistant",
            self.config.placeholder_text.clone(),
        );
        let batch = PlaceholderBatch {
            conversation_id: conversation_id.to_string(),
            user_id: user.id.clone(),
            assistant_id: assistant.id.clone(),
        };
        let mut store = self.store.borrow_mut();
        store.append_message(conversation_id, user);
        store.append_message(conversation_id, assistant);
        batch
    }

    fn render_full(&self) {
        let store = self.store.borrow();
        let mut reconciler = self.reconciler.borrow_mut();
        reconciler.render_full(&store);
        reconciler.render_conversation_list(&store);
        drop(reconciler);
        drop(store);
        self.refresh_send_control();
    }

    fn render_incremental(&self) {
        let store = self.store.borrow();
        self.reconciler.borrow_mut().render_incremental(&store);
    }

    fn render_conversation_list(&self) {
        let store = self.store.borrow();
        self.reconciler.borrow().render_conversation_list(&store);
    }

    fn refresh_send_control(&self) {
        let enabled = match self.store.borrow().active_id() {
            Some(id) => !self.is_busy(id),
            None => false,
        };
        self.reconciler.borrow().set_send_enabled(enabled);
    }
}
