//! Document tree types
//!
//! The hierarchy is document → sections → subsections → questions, owned by
//! the remote API. The client holds a read-only hydrated copy per session;
//! nothing here is mutated after load.

use crate::error::ModelError;
use crate::ids::{DocumentId, QuestionId, SectionId, SubsectionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document wizard definition plus its closing/submission policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    pub id: DocumentId,
    /// URL-safe slug used for document-level fetches
    pub slug: String,
    /// Server-computed closed flag; may be stale relative to `closed_at`
    #[serde(default)]
    pub closed: bool,
    /// Authoritative closing time; `None` means the document never closes
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Whether submission is a supported action for this document
    #[serde(default)]
    pub submittable: bool,
    /// Ordered sections; `None` when the document was fetched unhydrated
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

impl Document {
    /// Hydrated sections, in declared order
    ///
    /// # Errors
    /// `ModelError::UnhydratedDocument` when the sections collection was
    /// never loaded. That is a caller bug, distinct from an empty document
    /// (which is `Ok(&[])`).
    #[inline]
    pub fn sections(&self) -> Result<&[Section], ModelError> {
        self.sections
            .as_deref()
            .ok_or(ModelError::UnhydratedDocument { document: self.id })
    }
}

/// A top-level grouping of subsections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier
    pub id: SectionId,
    /// Meta sections affect the whole rendered document (shared variables),
    /// so edits inside them invalidate every subsection's preview
    #[serde(default)]
    pub is_meta: bool,
    /// Ordered subsections
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

/// The unit a user opens to answer questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subsection {
    /// Subsection identifier
    pub id: SubsectionId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Ordered questions; may be empty for purely narrative subsections
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Subsection {
    /// Whether this subsection carries any questions at all
    #[inline]
    #[must_use]
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }
}

/// A single prompt within a subsection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier
    pub id: QuestionId,
    /// Owning subsection
    pub subsection_id: SubsectionId,
    /// Completion semantics for this question
    #[serde(default)]
    pub kind: QuestionKind,
}

/// Completion semantics of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Requires an answer for the subsection to complete
    #[default]
    Standard,
    /// Branching question: answering `false` dismisses the rest of the
    /// subsection (it does not apply to the organization)
    Gate,
}
