//! WASM-target tests for tutor-core.
//!
//! Runs EventBus, ConversationStore and ArtefactExtractor tests under
//! wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use tutor_core::artefact::{ArtefactExtractor, ArtefactSegment, Span};
use tutor_core::event_bus::EventBus;
use tutor_core::ports::DiagramRenderer;
use tutor_core::store::ConversationStore;
use tutor_types::conversation::Conversation;
use tutor_types::event::ChatEvent;
use tutor_types::message::*;

struct IdRenderer;

impl DiagramRenderer for IdRenderer {
    type Element = String;

    fn render_diagram(&self, element_id: &str, _source: &str) -> String {
        element_id.to_string()
    }
}

// ─── EventBus Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn event_bus_buffers_and_drains() {
    let bus = EventBus::new();
    bus.emit(ChatEvent::ConversationDeleted { remaining_count: 0 });
    assert!(bus.has_pending());
    assert_eq!(bus.drain(), vec![ChatEvent::ConversationDeleted { remaining_count: 0 }]);
    assert!(!bus.has_pending());
}

// ─── ConversationStore Tests ─────────────────────────────

#[wasm_bindgen_test]
fn store_placeholder_retract_by_id() {
    let mut store = ConversationStore::new();
    store.create_conversation(Conversation::new("c1", "t"));
    let user = Message::placeholder(Role::User, "u1", "hi");
    let thinking = Message::placeholder(Role::Assistant, "assistant", "Thinking...");
    let (uid, tid) = (user.id.clone(), thinking.id.clone());
    store.append_message("c1", user);
    store.append_message("c1", thinking);
    store.append_message("c1", Message::user("later", "u1", "racing send"));

    store.remove_message("c1", &tid);
    store.remove_message("c1", &uid);
    let ids: Vec<&str> = store.get("c1").unwrap().messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["later"]);
}

#[wasm_bindgen_test]
fn store_delete_tie_break() {
    let mut store = ConversationStore::new();
    let mut a = Conversation::new("A", "A");
    a.pinned = true;
    store.replace_all(vec![a, Conversation::new("B", "B"), Conversation::new("C", "C")]);
    store.set_active("B");
    store.delete_conversation("B");
    assert_eq!(store.active_id(), Some("A"));
}

#[wasm_bindgen_test]
fn store_single_pinned_message() {
    let mut store = ConversationStore::new();
    store.create_conversation(Conversation::new("c1", "t"));
    store.set_pinned_message("c1", Some("m1"));
    store.set_pinned_message("c1", Some("m2"));
    assert_eq!(store.get("c1").unwrap().pinned_message_id.as_deref(), Some("m2"));
}

// ─── ArtefactExtractor Tests ─────────────────────────────

#[wasm_bindgen_test]
fn extract_literal_example() {
    let extractor = ArtefactExtractor::default();
    let segments = extractor.extract("before <mermaid>DIAGRAM_SRC</mermaid> after", "m1", &IdRenderer);
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], ArtefactSegment::Text("before ".to_string()));
    assert!(matches!(
        &segments[1],
        ArtefactSegment::Artefact { source, .. } if source == "DIAGRAM_SRC"
    ));
    assert_eq!(segments[2], ArtefactSegment::Text(" after".to_string()));
}

#[wasm_bindgen_test]
fn extract_unterminated_is_text() {
    let extractor = ArtefactExtractor::default();
    assert_eq!(extractor.scan("x <mermaid>y"), vec![Span::Text("x <mermaid>y")]);
}

#[wasm_bindgen_test]
fn extract_ids_are_deterministic() {
    let extractor = ArtefactExtractor::default();
    let text = "<mermaid>a</mermaid><mermaid>b</mermaid>";
    assert_eq!(
        extractor.extract(text, "m5", &IdRenderer),
        extractor.extract(text, "m5", &IdRenderer)
    );
    assert_eq!(ArtefactExtractor::element_id("m5", 1), "artefact-m5-1");
}
