//! Message reconciler: keeps the message-list DOM in sync with the store.
//!
//! Two modes:
//! - **Full**: on conversation switch or first load. Clears the container and
//!   the identity index and rebuilds every message in store order.
//! - **Incremental**: after a mutation inside the same conversation. Diffs the
//!   identity index against the store's message ids, removes stale nodes, then
//!   inserts missing ones in store order. Untouched nodes keep their identity.
//!
//! The index maps message id → DOM handles and is the only record of what is
//! on screen. Message content always comes from the store.
//!
//! Missing anchors are not errors: every render is a no-op until the page
//! has mounted its containers.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;
use tutor_types::{
    config::DomAnchors,
    conversation::Conversation,
    message::{Message, Role},
};
use crate::artefact::{ArtefactExtractor, ArtefactSegment};
use crate::ports::{DomPort, RenderTarget};
use crate::session::UiAction;
use crate::store::ConversationStore;

type Element<D> = <D as DomPort>::Element;

/// DOM handles for one rendered message
struct RenderedMessage<E> {
    root: E,
    pin_toggle: Option<E>,
}

/// What a render pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub full: bool,
    pub inserted: usize,
    pub removed: usize,
}

pub struct MessageReconciler<D: RenderTarget> {
    dom: Rc<D>,
    anchors: DomAnchors,
    extractor: ArtefactExtractor,
    actions: UnboundedSender<UiAction>,
    index: HashMap<String, RenderedMessage<Element<D>>>,
    rendered_conversation: Option<String>,
    last_known_count: usize,
}

impl<D: RenderTarget> MessageReconciler<D> {
    pub fn new(
        dom: Rc<D>,
        anchors: DomAnchors,
        extractor: ArtefactExtractor,
        actions: UnboundedSender<UiAction>,
    ) -> Self {
        Self {
            dom,
            anchors,
            extractor,
            actions,
            index: HashMap::new(),
            rendered_conversation: None,
            last_known_count: 0,
        }
    }

    // ─── Render passes ───────────────────────────────────────

    pub fn render_full(&mut self, store: &ConversationStore) -> RenderStats {
        let Some(container) = self.dom.element_by_id(&self.anchors.messages) else {
            log::debug!("message container '{}' not mounted", self.anchors.messages);
            return RenderStats::default();
        };

        self.index.clear();
        self.dom.clear_children(&container);
        self.last_known_count = 0;
        self.rendered_conversation = store.active_id().map(str::to_string);

        let mut stats = RenderStats { full: true, ..RenderStats::default() };
        if let Some(conversation) = store.active() {
            for message in &conversation.messages {
                let rendered = self.build_message(conversation, message);
                self.dom.append_child(&container, &rendered.root);
                self.index.insert(message.id.clone(), rendered);
                stats.inserted += 1;
            }
            self.last_known_count = conversation.messages.len();
        }

        self.update_chrome(store);
        if stats.inserted > 0 {
            self.schedule_scroll(container);
        }
        log::debug!("full render: {} messages", stats.inserted);
        stats
    }

    pub fn render_incremental(&mut self, store: &ConversationStore) -> RenderStats {
        let Some(container) = self.dom.element_by_id(&self.anchors.messages) else {
            return RenderStats::default();
        };
        if store.active_id() != self.rendered_conversation.as_deref() {
            return self.render_full(store);
        }
        let Some(conversation) = store.active() else {
            self.update_chrome(store);
            return RenderStats::default();
        };

        let mut stats = RenderStats::default();

        // Removals first: a retracted placeholder is gone before its replacement lands
        let live: HashSet<&str> = conversation.messages.iter().map(|m| m.id.as_str()).collect();
        let stale: Vec<String> = self
            .index
            .keys()
            .filter(|id| !live.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(rendered) = self.index.remove(&id) {
                self.dom.remove(&rendered.root);
                stats.removed += 1;
            }
        }

        for (pos, message) in conversation.messages.iter().enumerate() {
            if self.index.contains_key(&message.id) {
                continue;
            }
            let rendered = self.build_message(conversation, message);
            let next_sibling = conversation.messages[pos + 1..]
                .iter()
                .find_map(|m| self.index.get(&m.id))
                .map(|r| r.root.clone());
            match next_sibling {
                Some(reference) => self.dom.insert_before(&container, &rendered.root, &reference),
                None => self.dom.append_child(&container, &rendered.root),
            }
            self.index.insert(message.id.clone(), rendered);
            stats.inserted += 1;
        }
        self.last_known_count = conversation.messages.len();

        self.update_chrome(store);
        if stats.inserted > 0 {
            self.schedule_scroll(container);
        }
        stats
    }

    /// Rebuild the conversation sidebar, pinned first.
    pub fn render_conversation_list(&self, store: &ConversationStore) {
        let Some(list) = self.dom.element_by_id(&self.anchors.conversation_list) else {
            return;
        };
        self.dom.clear_children(&list);
        let active = store.active_id();
        for conversation in store.sorted_for_display() {
            let item = self.dom.create_element("li");
            self.dom.set_class(&item, "conversation-item");
            self.dom.toggle_class(&item, "pinned", conversation.pinned);
            self.dom.toggle_class(&item, "active", active == Some(conversation.id.as_str()));
            self.dom.set_attribute(&item, "data-conversation-id", &conversation.id);
            self.dom.set_text(&item, &conversation.title);
            self.bind_action(
                &item,
                UiAction::SelectConversation { conversation_id: conversation.id.clone() },
            );
            self.dom.append_child(&list, &item);
        }
    }

    /// Enable or disable the send control.
    pub fn set_send_enabled(&self, enabled: bool) {
        if let Some(button) = self.dom.element_by_id(&self.anchors.send_button) {
            self.dom.set_disabled(&button, !enabled);
        }
    }

    /// Show a one-line notice, or hide it with `None`.
    pub fn show_status(&self, notice: Option<&str>) {
        let Some(status) = self.dom.element_by_id(&self.anchors.status) else {
            return;
        };
        self.dom.set_text(&status, notice.unwrap_or(""));
        self.dom.set_hidden(&status, notice.is_none());
    }

    /// Put text back into the input box after a failed send.
    pub fn restore_draft(&self, text: &str) {
        if let Some(input) = self.dom.element_by_id(&self.anchors.input) {
            self.dom.set_value(&input, text);
        }
    }

    // ─── Introspection ───────────────────────────────────────

    pub fn is_rendered(&self, message_id: &str) -> bool {
        self.index.contains_key(message_id)
    }

    pub fn rendered_count(&self) -> usize {
        self.index.len()
    }

    pub fn element_for(&self, message_id: &str) -> Option<&Element<D>> {
        self.index.get(message_id).map(|r| &r.root)
    }

    pub fn rendered_conversation(&self) -> Option<&str> {
        self.rendered_conversation.as_deref()
    }

    pub fn last_known_count(&self) -> usize {
        self.last_known_count
    }

    // ─── Element construction ────────────────────────────────

    fn build_message(&self, conversation: &Conversation, message: &Message) -> RenderedMessage<Element<D>> {
        let dom = &self.dom;
        let root = dom.create_element("div");
        dom.set_class(&root, &format!("message message-{}", message.role.as_str()));
        dom.toggle_class(&root, "message-pending", message.is_placeholder());
        dom.toggle_class(&root, "message-notice", message.is_local());
        dom.toggle_class(&root, "message-pinned", conversation.is_message_pinned(&message.id));
        dom.set_attribute(&root, "data-message-id", &message.id);

        let body = dom.create_element("div");
        dom.set_class(&body, "message-body");
        if message.role == Role::Assistant && !message.is_local() {
            self.render_assistant_body(&body, message);
        } else {
            // User input and local notices are literal text
            dom.set_text(&body, &message.text);
        }
        dom.append_child(&root, &body);

        // Placeholders and notices have no server id to pin or flag
        if !message.is_confirmed() {
            return RenderedMessage { root, pin_toggle: None };
        }

        let controls = dom.create_element("div");
        dom.set_class(&controls, "message-controls");

        let pin_toggle = dom.create_element("button");
        dom.set_class(&pin_toggle, "pin-toggle");
        dom.set_text(&pin_toggle, pin_label(conversation.is_message_pinned(&message.id)));
        self.bind_action(
            &pin_toggle,
            UiAction::TogglePinMessage {
                conversation_id: conversation.id.clone(),
                message_id: message.id.clone(),
            },
        );
        dom.append_child(&controls, &pin_toggle);

        if message.role == Role::Assistant {
            let flag = dom.create_element("button");
            dom.set_class(&flag, "flag-message");
            dom.set_text(&flag, "Flag");
            self.bind_action(
                &flag,
                UiAction::FlagMessage {
                    conversation_id: conversation.id.clone(),
                    message_id: message.id.clone(),
                },
            );
            dom.append_child(&controls, &flag);
        }

        dom.append_child(&root, &controls);
        RenderedMessage { root, pin_toggle: Some(pin_toggle) }
    }

    fn render_assistant_body(&self, body: &Element<D>, message: &Message) {
        let segments = self.extractor.extract(&message.text, &message.id, self.dom.as_ref());
        for segment in segments {
            match segment {
                ArtefactSegment::Text(text) => {
                    let prose = self.dom.create_element("div");
                    self.dom.set_class(&prose, "message-text");
                    self.dom.render_markup(&prose, &text);
                    self.dom.append_child(body, &prose);
                }
                // Spliced in as built; markup passes never see it
                ArtefactSegment::Artefact { element, .. } => {
                    self.dom.append_child(body, &element);
                }
            }
        }
    }

    fn bind_action(&self, el: &Element<D>, action: UiAction) {
        let actions = self.actions.clone();
        self.dom.on_click(
            el,
            Box::new(move || {
                if actions.unbounded_send(action.clone()).is_err() {
                    log::warn!("action channel closed; dropped {:?}", action);
                }
            }),
        );
    }

    // ─── Chrome ──────────────────────────────────────────────

    fn update_chrome(&self, store: &ConversationStore) {
        let active = store.active();
        let dom = &self.dom;

        if let Some(title) = dom.element_by_id(&self.anchors.title) {
            dom.set_text(&title, active.map(|c| c.title.as_str()).unwrap_or(""));
        }

        if let Some(banner) = dom.element_by_id(&self.anchors.pinned_banner) {
            match active.and_then(|c| c.pinned_message()) {
                Some(pinned) => {
                    dom.clear_children(&banner);
                    let text = dom.create_element("div");
                    dom.set_class(&text, "pinned-text");
                    // User text is literal; only assistant text carries artefacts
                    let shown = match pinned.role {
                        Role::Assistant => self.extractor.strip(&pinned.text),
                        Role::User => pinned.text.clone(),
                    };
                    dom.set_text(&text, shown.trim());
                    dom.append_child(&banner, &text);
                    dom.set_hidden(&banner, false);
                }
                None => {
                    dom.clear_children(&banner);
                    dom.set_hidden(&banner, true);
                }
            }
        }

        if let Some(button) = dom.element_by_id(&self.anchors.pin_button) {
            let pinned = active.is_some_and(|c| c.pinned);
            dom.set_text(&button, if pinned { "Unpin conversation" } else { "Pin conversation" });
            dom.toggle_class(&button, "pinned", pinned);
            dom.set_disabled(&button, active.is_none());
        }

        if let Some(conversation) = active {
            for (id, rendered) in &self.index {
                let pinned = conversation.is_message_pinned(id);
                dom.toggle_class(&rendered.root, "message-pinned", pinned);
                if let Some(toggle) = &rendered.pin_toggle {
                    dom.set_text(toggle, pin_label(pinned));
                }
            }
        }
    }

    fn schedule_scroll(&self, container: Element<D>) {
        let dom = self.dom.clone();
        self.dom.request_frame(Box::new(move || dom.scroll_to_end(&container)));
    }
}

fn pin_label(pinned: bool) -> &'static str {
    if pinned { "Unpin" } else { "Pin" }
}
