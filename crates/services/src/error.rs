//! Shared error types for the services crate.

use thiserror::Error;

use content::ContentError;
use quiz_core::model::QuizSessionError;

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    /// The topic does not exist or has no questions.
    #[error("unknown topic: {topic}")]
    UnknownTopic { topic: String },
    #[error("no async runtime available to drive the question timer")]
    NoRuntime,
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
