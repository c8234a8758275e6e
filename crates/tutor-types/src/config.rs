use serde::{Deserialize, Serialize};
use crate::{Result, TutorError};

/// Top-level front-end configuration.
///
/// Every field has a default so a page may embed a partial JSON object and
/// only override what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TutorConfig {
    pub api_base: String,
    pub user_ref: String,
    pub course_ref: String,
    pub mode: ChatMode,
    pub placeholder_text: String,
    pub artefact: ArtefactSyntax,
    pub anchors: DomAnchors,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            user_ref: String::new(),
            course_ref: String::new(),
            mode: ChatMode::Student,
            placeholder_text: "Thinking...".to_string(),
            artefact: ArtefactSyntax::default(),
            anchors: DomAnchors::default(),
        }
    }
}

impl TutorConfig {
    /// Parse a (possibly partial) JSON config, filling the rest from defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TutorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.artefact.open.is_empty() || self.artefact.close.is_empty() {
            return Err(TutorError::Config(
                "artefact delimiters must not be empty".to_string(),
            ));
        }
        if self.artefact.open == self.artefact.close {
            return Err(TutorError::Config(
                "artefact open and close delimiters must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_base_trimmed(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}

/// Which page hosts the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Student,
    Instructor,
}

impl ChatMode {
    pub fn label(&self) -> &str {
        match self {
            ChatMode::Student => "Student",
            ChatMode::Instructor => "Instructor",
        }
    }
}

/// Envelope tokens around an inline diagram artefact in assistant text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtefactSyntax {
    pub open: String,
    pub close: String,
}

impl Default for ArtefactSyntax {
    fn default() -> Self {
        Self {
            open: "<mermaid>".to_string(),
            close: "</mermaid>".to_string(),
        }
    }
}

/// Element ids the front end renders into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomAnchors {
    pub messages: String,
    pub title: String,
    pub pinned_banner: String,
    pub pin_button: String,
    pub conversation_list: String,
    pub input: String,
    pub send_button: String,
    pub new_button: String,
    pub delete_button: String,
    pub empty_state: String,
    /// One-line notice for failed operations
    pub status: String,
}

impl Default for DomAnchors {
    fn default() -> Self {
        Self {
            messages: "chat-messages".to_string(),
            title: "chat-title".to_string(),
            pinned_banner: "pinned-banner".to_string(),
            pin_button: "pin-conversation".to_string(),
            conversation_list: "conversation-list".to_string(),
            input: "chat-input".to_string(),
            send_button: "send-button".to_string(),
            new_button: "new-conversation".to_string(),
            delete_button: "delete-conversation".to_string(),
            empty_state: "empty-state".to_string(),
            status: "chat-status".to_string(),
        }
    }
}
