//! Port traits: the boundary between the chat core and the browser.
//!
//! Implementations live in `tutor-platform` (fetch + web-sys adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use tutor_types::{
    Result,
    conversation::Conversation,
    message::Message,
};

// ─── Conversation Gateway ────────────────────────────────────

/// Server-confirmed pair returned by a successful send
#[derive(Debug, Clone, PartialEq)]
pub struct PostedExchange {
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Chat/course persistence endpoints.
///
/// Every call is a single attempt. Failures come back as `Err`; the core
/// reacts by rolling back optimistic state, never by retrying.
#[async_trait(?Send)]
pub trait ConversationGateway {
    /// Create an empty conversation for a course; the returned id is canonical
    async fn create_conversation(&self, course_ref: &str) -> Result<Conversation>;

    /// Send user text and receive the stored user + assistant messages
    async fn post_message(&self, conversation_id: &str, text: &str) -> Result<PostedExchange>;

    async fn set_pin_status(&self, conversation_id: &str, pinned: bool) -> Result<()>;

    async fn set_pinned_message(
        &self,
        conversation_id: &str,
        message_id: Option<&str>,
    ) -> Result<()>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<()>;

    async fn list_conversations(&self, user_ref: &str, course_ref: &str) -> Result<Vec<Conversation>>;
}

// ─── Diagram Renderer ────────────────────────────────────────

/// Turns an artefact payload into an interactive element.
///
/// The renderer owns failure handling for bad diagram source; it must always
/// hand back an element.
pub trait DiagramRenderer {
    type Element;

    fn render_diagram(&self, element_id: &str, source: &str) -> Self::Element;
}

// ─── DOM Port ────────────────────────────────────────────────

/// The slice of the DOM the reconciler needs.
///
/// Handles are cheap clones referring to the same live node.
pub trait DomPort {
    type Element: Clone + 'static;

    /// Look up an anchor; `None` if the page has not mounted it (yet)
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn create_element(&self, tag: &str) -> Self::Element;

    fn set_attribute(&self, el: &Self::Element, name: &str, value: &str);

    /// Replace the element's full class list
    fn set_class(&self, el: &Self::Element, class: &str);

    fn toggle_class(&self, el: &Self::Element, class: &str, on: bool);

    /// Set literal text; never interpreted as markup
    fn set_text(&self, el: &Self::Element, text: &str);

    /// Render markdown + math into the element
    fn render_markup(&self, el: &Self::Element, text: &str);

    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    fn insert_before(&self, parent: &Self::Element, child: &Self::Element, reference: &Self::Element);

    /// Detach the element from its parent
    fn remove(&self, el: &Self::Element);

    fn clear_children(&self, el: &Self::Element);

    fn set_hidden(&self, el: &Self::Element, hidden: bool);

    fn set_disabled(&self, el: &Self::Element, disabled: bool);

    /// Set the value of a form control
    fn set_value(&self, el: &Self::Element, value: &str);

    fn on_click(&self, el: &Self::Element, handler: Box<dyn Fn()>);

    /// Scroll a container to its end; must not fail if smooth scrolling is missing
    fn scroll_to_end(&self, el: &Self::Element);

    /// Run a task after the next layout (next animation frame in the browser)
    fn request_frame(&self, task: Box<dyn FnOnce()>);
}

/// A DOM that can also render diagrams into its own element type.
pub trait RenderTarget: DomPort + DiagramRenderer<Element = <Self as DomPort>::Element> + 'static {}

impl<T> RenderTarget for T where T: DomPort + DiagramRenderer<Element = <T as DomPort>::Element> + 'static {}
