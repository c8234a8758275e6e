pub mod message;
pub mod conversation;
pub mod event;
pub mod config;
pub mod error;


pub use error::TutorError;

pub type Result<T> = std::result::Result<T, TutorError>;
