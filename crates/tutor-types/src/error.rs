use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TutorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TutorError {
    fn from(e: serde_json::Error) -> Self {
        TutorError::Serialization(e.to_string())
    }
}
