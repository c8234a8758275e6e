//! web-sys implementation of the DOM port.
//!
//! Markdown, math and diagram rendering are delegated to page-provided
//! globals when present:
//! - `marked.parse` + `DOMPurify.sanitize` for markdown (both required,
//!   otherwise the text is shown literally)
//! - `renderMathInElement` (KaTeX auto-render) for `$...$` / `$$...$$`
//! - `mermaid.run` for diagrams, run lazily the first time a diagram is shown

use std::cell::Cell;
use std::rc::Rc;

use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, ScrollBehavior, ScrollToOptions};

use tutor_core::ports::{DiagramRenderer, DomPort};
use tutor_types::{Result, TutorError};

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new() -> Result<Self> {
        let document = web_sys::window()
            .ok_or_else(|| TutorError::JsInterop("No window object".to_string()))?
            .document()
            .ok_or_else(|| TutorError::JsInterop("No document".to_string()))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current value of an `<input>` or `<textarea>`
    pub fn value_of(&self, el: &Element) -> Option<String> {
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        el.dyn_ref::<HtmlTextAreaElement>().map(|t| t.value())
    }
}

impl DomPort for WebDom {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> Element {
        self.document
            .create_element(tag)
            .or_else(|e| {
                log::error!("create_element({}) failed: {:?}", tag, e);
                self.document.create_element("div")
            })
            .unwrap_throw()
    }

    fn set_attribute(&self, el: &Element, name: &str, value: &str) {
        let _ = el.set_attribute(name, value);
    }

    fn set_class(&self, el: &Element, class: &str) {
        el.set_class_name(class);
    }

    fn toggle_class(&self, el: &Element, class: &str, on: bool) {
        let _ = el.class_list().toggle_with_force(class, on);
    }

    fn set_text(&self, el: &Element, text: &str) {
        el.set_text_content(Some(text));
    }

    fn render_markup(&self, el: &Element, text: &str) {
        match markdown_to_html(text) {
            Some(html) => el.set_inner_html(&html),
            None => el.set_text_content(Some(text)),
        }
        typeset_math(el);
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        let _ = parent.append_child(child);
    }

    fn insert_before(&self, parent: &Element, child: &Element, reference: &Element) {
        let _ = parent.insert_before(child, Some(reference));
    }

    fn remove(&self, el: &Element) {
        el.remove();
    }

    fn clear_children(&self, el: &Element) {
        el.set_text_content(None);
    }

    fn set_hidden(&self, el: &Element, hidden: bool) {
        let _ = el.toggle_attribute_with_force("hidden", hidden);
    }

    fn set_disabled(&self, el: &Element, disabled: bool) {
        let _ = el.toggle_attribute_with_force("disabled", disabled);
    }

    fn set_value(&self, el: &Element, value: &str) {
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    fn on_click(&self, el: &Element, handler: Box<dyn Fn()>) {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| handler()) as Box<dyn Fn(web_sys::Event)>);
        if let Err(e) = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref()) {
            log::warn!("Failed to bind click handler: {:?}", e);
        }
        // Lives as long as the element; the page never unbinds
        closure.forget();
    }

    fn scroll_to_end(&self, el: &Element) {
        let options = ScrollToOptions::new();
        options.set_top(el.scroll_height() as f64);
        options.set_behavior(ScrollBehavior::Smooth);

        // Call through Reflect so a missing or throwing scrollTo is caught
        let smooth = Reflect::get(el, &JsValue::from_str("scrollTo"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .map(|f| f.call1(el, &options).is_ok())
            .unwrap_or(false);
        if !smooth {
            el.set_scroll_top(el.scroll_height());
        }
    }

    fn request_frame(&self, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = gloo_utils::window().request_animation_frame(callback.unchecked_ref()) {
            log::warn!("requestAnimationFrame failed: {:?}", e);
        }
    }
}

impl DiagramRenderer for WebDom {
    type Element = Element;

    fn render_diagram(&self, element_id: &str, source: &str) -> Element {
        let wrapper = self.create_element("div");
        self.set_attribute(&wrapper, "id", element_id);
        self.set_class(&wrapper, "artefact artefact-diagram");

        let toggle = self.create_element("button");
        self.set_class(&toggle, "artefact-toggle");
        self.set_text(&toggle, "View diagram");

        let diagram = self.create_element("div");
        self.set_class(&diagram, "mermaid");
        self.set_text(&diagram, source);
        self.set_hidden(&diagram, true);

        let rendered = Rc::new(Cell::new(false));
        let toggle_label = toggle.clone();
        let target = diagram.clone();
        let source = source.to_string();
        self.on_click(
            &toggle,
            Box::new(move || {
                let show = target.has_attribute("hidden");
                let _ = target.toggle_attribute_with_force("hidden", !show);
                toggle_label.set_text_content(Some(if show { "Hide diagram" } else { "View diagram" }));
                if show && !rendered.replace(true) {
                    run_mermaid(target.clone(), source.clone());
                }
            }),
        );

        self.append_child(&wrapper, &toggle);
        self.append_child(&wrapper, &diagram);
        wrapper
    }
}

// ─── JS globals ──────────────────────────────────────────────

/// `globalThis[object][method]`, with `object` as the call receiver
fn global_method(object: &str, method: &str) -> Option<(JsValue, Function)> {
    let receiver = Reflect::get(&js_sys::global(), &JsValue::from_str(object)).ok()?;
    if receiver.is_undefined() || receiver.is_null() {
        return None;
    }
    let function = Reflect::get(&receiver, &JsValue::from_str(method))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    Some((receiver, function))
}

fn markdown_to_html(text: &str) -> Option<String> {
    let (marked, parse) = global_method("marked", "parse")?;
    let html = parse.call1(&marked, &JsValue::from_str(text)).ok()?.as_string()?;
    let (purify, sanitize) = global_method("DOMPurify", "sanitize")?;
    sanitize.call1(&purify, &JsValue::from_str(&html)).ok()?.as_string()
}

fn typeset_math(el: &Element) {
    let Some(render) = Reflect::get(&js_sys::global(), &JsValue::from_str("renderMathInElement"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        return;
    };
    let options = JsValue::from_serde(&json!({
        "delimiters": [
            { "left": "$$", "right": "$$", "display": true },
            { "left": "$", "right": "$", "display": false },
            { "left": "\\(", "right": "\\)", "display": false },
            { "left": "\\[", "right": "\\]", "display": true },
        ],
        "throwOnError": false,
    }))
    .unwrap_or(JsValue::UNDEFINED);
    if let Err(e) = render.call2(&JsValue::NULL, el, &options) {
        log::warn!("Math rendering failed: {:?}", e);
    }
}

/// Render one diagram node; on failure the node shows its source instead.
fn run_mermaid(node: Element, source: String) {
    let Some((mermaid, run)) = global_method("mermaid", "run") else {
        let _ = node.class_list().add_1("artefact-fallback");
        return;
    };
    let options = Object::new();
    let _ = Reflect::set(&options, &JsValue::from_str("nodes"), &Array::of1(&node));

    let promise = match run.call1(&mermaid, &options) {
        Ok(value) => value.dyn_into::<Promise>().ok(),
        Err(e) => {
            log::warn!("mermaid.run threw: {:?}", e);
            show_diagram_error(&node, &source);
            return;
        }
    };
    if let Some(promise) = promise {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Diagram failed to render: {:?}", e);
                show_diagram_error(&node, &source);
            }
        });
    }
}

fn show_diagram_error(node: &Element, source: &str) {
    node.set_text_content(Some(source));
    let _ = node.class_list().add_1("artefact-error");
}
