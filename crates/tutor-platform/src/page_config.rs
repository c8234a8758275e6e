//! Page-embedded configuration.
//!
//! The host page renders its settings as
//! `<script id="tutor-config" type="application/json">{...}</script>`.
//! Missing fields take their defaults; a missing or malformed block falls
//! back to `TutorConfig::default()`.

use tutor_types::config::TutorConfig;

pub const CONFIG_ELEMENT_ID: &str = "tutor-config";

/// Read the config block from the current document.
pub fn load_page_config() -> TutorConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());

    match raw {
        Some(json) => parse_page_config(&json),
        None => {
            log::info!("No #{} block on page, using defaults", CONFIG_ELEMENT_ID);
            TutorConfig::default()
        }
    }
}

pub fn parse_page_config(json: &str) -> TutorConfig {
    if json.trim().is_empty() {
        return TutorConfig::default();
    }
    match TutorConfig::from_json(json) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring page config: {}", e);
            TutorConfig::default()
        }
    }
}
