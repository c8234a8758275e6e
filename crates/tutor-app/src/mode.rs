//! Page-specific reactions to chat events.

use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;

use tutor_core::event_bus::ChatObserver;
use tutor_core::ports::DomPort;
use tutor_core::session::UiAction;
use tutor_types::event::ChatEvent;

/// Student page: a student always has a conversation to type into.
pub struct StudentObserver {
    actions: UnboundedSender<UiAction>,
}

impl StudentObserver {
    pub fn new(actions: UnboundedSender<UiAction>) -> Self {
        Self { actions }
    }

    /// Start a fresh conversation if the student has none.
    pub fn ensure_conversation(&self, conversation_count: usize) {
        if conversation_count > 0 {
            return;
        }
        log::info!("No conversations left, starting a new one");
        if self.actions.unbounded_send(UiAction::NewConversation).is_err() {
            log::warn!("Action loop closed, cannot create conversation");
        }
    }
}

impl ChatObserver for StudentObserver {
    fn on_event(&self, event: &ChatEvent) {
        if let ChatEvent::ConversationDeleted { remaining_count } = event {
            self.ensure_conversation(*remaining_count);
        }
    }
}

/// Instructor page: shows an empty-state panel while there is nothing to review.
pub struct InstructorObserver<D: DomPort> {
    dom: Rc<D>,
    empty_state_id: String,
}

impl<D: DomPort> InstructorObserver<D> {
    pub fn new(dom: Rc<D>, empty_state_id: impl Into<String>) -> Self {
        Self {
            dom,
            empty_state_id: empty_state_id.into(),
        }
    }

    pub fn show_empty_state(&self, empty: bool) {
        match self.dom.element_by_id(&self.empty_state_id) {
            Some(panel) => self.dom.set_hidden(&panel, !empty),
            None => log::debug!("#{} not on page", self.empty_state_id),
        }
    }
}

impl<D: DomPort> ChatObserver for InstructorObserver<D> {
    fn on_event(&self, event: &ChatEvent) {
        match event {
            ChatEvent::ConversationDeleted { remaining_count } => {
                self.show_empty_state(*remaining_count == 0);
            }
            ChatEvent::NewConversationCreated { .. } => self.show_empty_state(false),
            ChatEvent::MessageFlagged { conversation_id, message_id } => {
                log::info!("Instructor flagged {} in {}", message_id, conversation_id);
            }
            ChatEvent::OperationFailed { .. } | ChatEvent::UiRefreshRequested => {}
        }
    }
}
