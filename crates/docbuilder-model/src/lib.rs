//! Docbuilder document model
//!
//! Read-only model of a document wizard as served by the remote API:
//! - the document → section → subsection → question hierarchy
//! - pure navigation/flattening over that hierarchy
//! - closing-time evaluation against the authoritative `closed_at`
//!
//! Everything in this crate is synchronous and I/O-free; fetching and
//! mutation live in `docbuilder-api` and `docbuilder-engine`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod answer;
pub mod closing;
pub mod document;
pub mod error;
pub mod ids;
pub mod navigator;

// Re-exports for convenience
pub use answer::Answer;
pub use closing::{is_closed, millis_until_closed, NEVER_CLOSES};
pub use document::{Document, Question, QuestionKind, Section, Subsection};
pub use error::ModelError;
pub use ids::{DocumentId, OrganizationId, QuestionId, SectionId, SubsectionId};
pub use navigator::QuestionFilter;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
