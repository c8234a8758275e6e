//! Browser adapters for the tutor chat core.

pub mod gateway;
pub mod dom;
pub mod page_config;

#[cfg(test)]
mod tests;

pub use gateway::HttpConversationGateway;
pub use dom::WebDom;
