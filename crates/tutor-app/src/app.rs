//! Composition root: wires the page's DOM, the REST gateway and the chat
//! session together, binds the static controls and starts the action loop.

use std::rc::Rc;

use futures::channel::mpsc::UnboundedSender;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use tutor_core::event_bus::EventBus;
use tutor_core::ports::{ConversationGateway, DomPort};
use tutor_core::session::{ChatSession, UiAction};
use tutor_platform::{HttpConversationGateway, WebDom};
use tutor_types::config::{ChatMode, TutorConfig};
use tutor_types::Result;

use crate::mode::{InstructorObserver, StudentObserver};

/// Mode observer kept around for the post-load check
enum ModeHook {
    Student(Rc<StudentObserver>),
    Instructor(Rc<InstructorObserver<WebDom>>),
}

impl ModeHook {
    fn subscribe(config: &TutorConfig, session: &ChatSession<WebDom>, dom: &Rc<WebDom>) -> Self {
        match config.mode {
            ChatMode::Student => {
                let observer = Rc::new(StudentObserver::new(session.actions()));
                session.event_bus().subscribe(observer.clone());
                ModeHook::Student(observer)
            }
            ChatMode::Instructor => {
                let observer = Rc::new(InstructorObserver::new(
                    dom.clone(),
                    config.anchors.empty_state.clone(),
                ));
                session.event_bus().subscribe(observer.clone());
                ModeHook::Instructor(observer)
            }
        }
    }

    fn after_load(&self, conversation_count: usize) {
        match self {
            ModeHook::Student(observer) => observer.ensure_conversation(conversation_count),
            ModeHook::Instructor(observer) => observer.show_empty_state(conversation_count == 0),
        }
    }
}

pub struct TutorApp {
    session: Rc<ChatSession<WebDom>>,
    dom: Rc<WebDom>,
}

impl TutorApp {
    pub fn start(config: TutorConfig) -> Result<Rc<Self>> {
        log::info!(
            "Starting {} chat for course '{}' against {}",
            config.mode.label(),
            config.course_ref,
            config.api_base_trimmed()
        );

        let dom = Rc::new(WebDom::new()?);
        let gateway: Rc<dyn ConversationGateway> = Rc::new(HttpConversationGateway::new(&config));
        let session = Rc::new(ChatSession::new(
            config.clone(),
            dom.clone(),
            gateway,
            EventBus::new(),
        ));
        let mode = ModeHook::subscribe(&config, &session, &dom);

        let app = Rc::new(Self { session, dom });
        app.bind_controls();

        let session = app.session.clone();
        wasm_bindgen_futures::spawn_local(async move {
            session.run_actions().await;
        });

        let session = app.session.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if session.load().await.is_ok() {
                let count = session.store().len();
                mode.after_load(count);
            }
        });

        Ok(app)
    }

    pub fn session(&self) -> &Rc<ChatSession<WebDom>> {
        &self.session
    }

    /// Hook up the controls that exist once per page. Per-message and
    /// sidebar controls are bound by the reconciler as it builds them.
    fn bind_controls(&self) {
        let anchors = &self.session.config().anchors;
        let actions = self.session.actions();

        if let Some(input) = self.dom.element_by_id(&anchors.input) {
            let submit: Rc<dyn Fn()> = {
                let dom = self.dom.clone();
                let input = input.clone();
                let actions = actions.clone();
                Rc::new(move || {
                    let text = dom.value_of(&input).unwrap_or_default();
                    if text.trim().is_empty() {
                        return;
                    }
                    dom.set_value(&input, "");
                    post(&actions, UiAction::Send { text });
                })
            };

            if let Some(button) = self.dom.element_by_id(&anchors.send_button) {
                let submit = submit.clone();
                self.dom.on_click(&button, Box::new(move || submit()));
            }

            // Enter sends, Shift+Enter inserts a newline
            let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" && !event.shift_key() && !event.is_composing() {
                    event.prevent_default();
                    submit();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            if let Err(e) = input.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref()) {
                log::warn!("Failed to bind keydown on #{}: {:?}", anchors.input, e);
            }
            on_key.forget();
        } else {
            log::warn!("#{} not on page, sending disabled", anchors.input);
        }

        let buttons = [
            (&anchors.new_button, UiAction::NewConversation),
            (&anchors.delete_button, UiAction::DeleteActive),
            (&anchors.pin_button, UiAction::TogglePinActive),
        ];
        for (id, action) in buttons {
            let Some(button) = self.dom.element_by_id(id) else {
                log::debug!("#{} not on page", id);
                continue;
            };
            let actions = actions.clone();
            self.dom
                .on_click(&button, Box::new(move || post(&actions, action.clone())));
        }
    }
}

fn post(actions: &UnboundedSender<UiAction>, action: UiAction) {
    if actions.unbounded_send(action).is_err() {
        log::warn!("Action loop closed, input dropped");
    }
}
