//! Document tree navigation
//!
//! Pure lookup and flatten functions over a hydrated document. A miss is
//! `Ok(None)` — never an error — while traversing an unhydrated document is
//! a data-contract violation and fails loudly.
//!
//! Traversal order is always declared section order, then subsection order
//! within each section; first match wins.

use crate::document::{Document, Question, Section, Subsection};
use crate::error::ModelError;
use crate::ids::{QuestionId, SectionId, SubsectionId};

/// Filter for subsection flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFilter {
    /// Every subsection
    All,
    /// Only subsections that carry at least one question
    WithQuestions,
    /// Only subsections with no questions at all
    WithoutQuestions,
}

impl QuestionFilter {
    fn matches(self, subsection: &Subsection) -> bool {
        match self {
            Self::All => true,
            Self::WithQuestions => subsection.has_questions(),
            Self::WithoutQuestions => !subsection.has_questions(),
        }
    }
}

/// Find a section by id
pub fn section_by_id(
    document: &Document,
    id: SectionId,
) -> Result<Option<&Section>, ModelError> {
    Ok(document.sections()?.iter().find(|s| s.id == id))
}

/// Find a subsection by id, searching every section in order
pub fn subsection_by_id(
    document: &Document,
    id: SubsectionId,
) -> Result<Option<&Subsection>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .flat_map(|s| s.subsections.iter())
        .find(|ss| ss.id == id))
}

/// Find the section that owns a subsection
///
/// Used to determine preview blast radius: the owning section's `is_meta`
/// flag decides between incremental and whole-document refresh.
pub fn section_of_subsection(
    document: &Document,
    id: SubsectionId,
) -> Result<Option<&Section>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .find(|s| s.subsections.iter().any(|ss| ss.id == id)))
}

/// Find the subsection that owns a question
pub fn subsection_of_question(
    document: &Document,
    id: QuestionId,
) -> Result<Option<&Subsection>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .flat_map(|s| s.subsections.iter())
        .find(|ss| ss.questions.iter().any(|q| q.id == id)))
}

/// Flatten all subsections in traversal order
pub fn subsections(
    document: &Document,
    filter: QuestionFilter,
) -> Result<Vec<&Subsection>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .flat_map(|s| s.subsections.iter())
        .filter(|ss| filter.matches(ss))
        .collect())
}

/// Flatten all subsections to bare ids
///
/// Identifier mode for hot paths that only key maps and never touch the
/// subsection objects themselves.
pub fn subsection_ids(
    document: &Document,
    filter: QuestionFilter,
) -> Result<Vec<SubsectionId>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .flat_map(|s| s.subsections.iter())
        .filter(|ss| filter.matches(ss))
        .map(|ss| ss.id)
        .collect())
}

/// Flatten all questions in traversal order
pub fn questions(document: &Document) -> Result<Vec<&Question>, ModelError> {
    Ok(document
        .sections()?
        .iter()
        .flat_map(|s| s.subsections.iter())
        .flat_map(|ss| ss.questions.iter())
        .collect())
}

/// Flatten all questions to bare ids
pub fn question_ids(document: &Document) -> Result<Vec<QuestionId>, ModelError> {
    Ok(questions(document)?.iter().map(|q| q.id).collect())
}
