//! Tutor chat core.
//!
//! Pure Rust: the browser is reached only through the traits in [`ports`].

pub mod ports;
pub mod event_bus;
pub mod store;
pub mod artefact;
pub mod reconciler;
pub mod session;
