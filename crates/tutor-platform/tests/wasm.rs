//! WASM-target tests for tutor-platform (Node.js runtime).
//!
//! Covers envelope decoding and page-config parsing under
//! wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! WebDom tests require a browser and live in browser.rs.

use wasm_bindgen_test::*;

use tutor_platform::gateway::wire;
use tutor_platform::page_config::parse_page_config;
use tutor_platform::HttpConversationGateway;
use tutor_types::config::TutorConfig;
use tutor_types::TutorError;

// ─── Wire Tests ──────────────────────────────────────────

#[wasm_bindgen_test]
fn wire_listing_decodes() {
    let body = r#"{"success":true,"conversations":[{"_id":"c1","title":"Loops","messages":[]}]}"#;
    let conversations = wire::decode_conversations(body).unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].title, "Loops");
}

#[wasm_bindgen_test]
fn wire_failure_envelope() {
    let err = wire::decode_ack(r#"{"success":false,"error":"nope"}"#).unwrap_err();
    assert_eq!(err, TutorError::Server("nope".to_string()));
}

#[wasm_bindgen_test]
fn wire_exchange_requires_both_messages() {
    let err = wire::decode_exchange(r#"{"success":true}"#).unwrap_err();
    assert_eq!(err, TutorError::Server("response missing userMessage".to_string()));
}

// ─── Config Tests ────────────────────────────────────────

#[wasm_bindgen_test]
fn page_config_overlay() {
    let config = parse_page_config(r#"{"apiBase":"https://tutor.example/api/"}"#);
    assert_eq!(config.api_base_trimmed(), "https://tutor.example/api");
    assert_eq!(config.placeholder_text, "Thinking...");
}

#[wasm_bindgen_test]
fn gateway_builds_from_config() {
    let _gateway = HttpConversationGateway::new(&TutorConfig::default());
}
