//! WASM-target tests for tutor-types.
//!
//! Mirrors the native unit tests but runs under wasm32-unknown-unknown
//! via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use tutor_types::message::*;
use tutor_types::conversation::*;
use tutor_types::config::*;
use tutor_types::error::*;

#[wasm_bindgen_test]
fn placeholder_ids_differ() {
    let a = Message::placeholder(Role::Assistant, "assistant", "Thinking...");
    let b = Message::placeholder(Role::Assistant, "assistant", "Thinking...");
    assert!(a.is_placeholder());
    assert_ne!(a.id, b.id);
}

#[wasm_bindgen_test]
fn message_timestamp_uses_js_clock() {
    let msg = Message::user("m1", "u1", "hi");
    assert!(msg.created_at_epoch_ms > 1_600_000_000_000);
}

#[wasm_bindgen_test]
fn conversation_roundtrip_keeps_pin() {
    let mut c = Conversation::new("c1", "t");
    c.messages.push(Message::assistant("m1", "a"));
    c.pinned_message_id = Some("m1".to_string());
    let json = serde_json::to_string(&c).unwrap();
    let back: Conversation = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pinned_message().unwrap().id, "m1");
}

#[wasm_bindgen_test]
fn config_overlay() {
    let config = TutorConfig::from_json(r#"{"placeholderText":"Hmm..."}"#).unwrap();
    assert_eq!(config.placeholder_text, "Hmm...");
    assert_eq!(config.mode, ChatMode::Student);
}

#[wasm_bindgen_test]
fn config_error_kind() {
    let err = TutorConfig::from_json(r#"{"artefact":{"open":"x","close":"x"}}"#).unwrap_err();
    assert!(matches!(err, TutorError::Config(_)));
}
