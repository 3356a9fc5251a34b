//! Error types for the session engine
//!
//! Three distinct failure classes, kept apart on purpose:
//! - data-contract violations (`Model`) fail fast, they are caller bugs
//! - remote failures (`Api`) are recovered at the call site with a logged
//!   fallback
//! - malformed stored values surface visibly instead of silently corrupting
//!   completion-status computation

use docbuilder_api::ApiError;
use docbuilder_model::{ModelError, QuestionId, SubsectionId};

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Data-contract violation in the document model
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Remote operation failed
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// An answer's JSON-string payload failed to decode
    #[error("malformed answer value for question {question}: {source}")]
    MalformedAnswerValue {
        question: QuestionId,
        #[source]
        source: serde_json::Error,
    },

    /// The question does not belong to the session's document
    #[error("question {0} not found in document")]
    UnknownQuestion(QuestionId),

    /// The subsection does not belong to the session's document
    #[error("subsection {0} not found in document")]
    UnknownSubsection(SubsectionId),

    /// A mutation was attempted while the document is read-only
    #[error("document is read-only")]
    ReadOnly,

    /// The in-flight operation was cancelled; no state was written
    #[error("operation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether re-triggering the user action could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transient(),
            Self::Cancelled => true,
            _ => false,
        }
    }
}
