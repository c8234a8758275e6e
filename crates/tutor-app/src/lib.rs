//! Tutor App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It reads the page config, assembles the browser adapters and hands
//! them to the chat session.

mod app;
pub mod mode;


pub use app::TutorApp;

use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated by the page
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Tutor WASM starting...");

    let config = tutor_platform::page_config::load_page_config();
    match TutorApp::start(config) {
        // The spawned loops hold the session; the handle itself can go
        Ok(_app) => log::info!("Tutor chat ready"),
        Err(e) => log::error!("Failed to start tutor chat: {}", e),
    }
}
