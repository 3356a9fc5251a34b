//! Error types for the document model

use crate::ids::DocumentId;

/// Model-level errors
///
/// A failed lookup is *not* an error: lookups return `Ok(None)`. These
/// variants are data-contract violations and indicate malformed input from
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Traversal was attempted against a document whose sections collection
    /// was never hydrated
    #[error("document {document} has no hydrated sections")]
    UnhydratedDocument { document: DocumentId },
}
