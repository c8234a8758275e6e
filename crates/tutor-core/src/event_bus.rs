//! Event bus between the chat session and mode-specific page logic.
//!
//! The bus is single-threaded (WASM constraint) and uses interior mutability
//! via RefCell. Subscribed observers are notified synchronously on emit.
//! While nobody is subscribed, events are buffered and can be drained later.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tutor_types::event::ChatEvent;

/// Receives chat events as they happen.
pub trait ChatObserver {
    fn on_event(&self, event: &ChatEvent);
}

/// Shared event bus: clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<ChatEvent>>>,
    observers: Rc<RefCell<Vec<Rc<dyn ChatObserver>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            observers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn subscribe(&self, observer: Rc<dyn ChatObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Publish an event to every observer, or buffer it if there are none.
    pub fn emit(&self, event: ChatEvent) {
        // Snapshot so an observer may subscribe another without a double borrow
        let observers: Vec<Rc<dyn ChatObserver>> = self.observers.borrow().clone();
        if observers.is_empty() {
            self.queue.borrow_mut().push_back(event);
            return;
        }
        for observer in &observers {
            observer.on_event(&event);
        }
    }

    /// Drain all buffered events.
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
