//! WASM-target tests for tutor-app (Node.js runtime).
//!
//! Exercises the mode observers via `wasm-pack test --node`; the DOM
//! wiring itself needs a browser page and is covered by tutor-platform.

use futures::channel::mpsc;
use wasm_bindgen_test::*;

use tutor_app::mode::StudentObserver;
use tutor_core::event_bus::{ChatObserver, EventBus};
use tutor_core::session::UiAction;
use tutor_types::event::ChatEvent;
use std::rc::Rc;

#[wasm_bindgen_test]
fn student_observer_on_bus() {
    let (tx, mut rx) = mpsc::unbounded();
    let bus = EventBus::new();
    bus.subscribe(Rc::new(StudentObserver::new(tx)));
    bus.emit(ChatEvent::ConversationDeleted { remaining_count: 0 });
    assert_eq!(rx.try_next().unwrap(), Some(UiAction::NewConversation));
}

#[wasm_bindgen_test]
fn student_observer_direct() {
    let (tx, mut rx) = mpsc::unbounded();
    let observer = StudentObserver::new(tx);
    observer.on_event(&ChatEvent::ConversationDeleted { remaining_count: 1 });
    assert!(rx.try_next().is_err());
}
