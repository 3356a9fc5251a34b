//! Deterministic document fixtures
//!
//! Small builders so tests spell out only the shape they care about.

use chrono::{DateTime, Utc};
use docbuilder_model::{
    Document, DocumentId, Question, QuestionId, QuestionKind, Section, SectionId, Subsection,
    SubsectionId,
};

/// Start building a document
#[must_use]
pub fn document(id: u64, slug: &str) -> DocumentBuilder {
    DocumentBuilder {
        id: DocumentId(id),
        slug: slug.to_string(),
        closed: false,
        closed_at: None,
        submittable: true,
        sections: Some(Vec::new()),
    }
}

/// Builder for [`Document`] fixtures
#[derive(Debug)]
pub struct DocumentBuilder {
    id: DocumentId,
    slug: String,
    closed: bool,
    closed_at: Option<DateTime<Utc>>,
    submittable: bool,
    sections: Option<Vec<Section>>,
}

impl DocumentBuilder {
    /// Set the authoritative closing time
    #[must_use]
    pub fn closed_at(mut self, at: DateTime<Utc>) -> Self {
        self.closed_at = Some(at);
        self
    }

    /// Set the stale server-computed closed flag
    #[must_use]
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Set whether submission is supported
    #[must_use]
    pub fn submittable(mut self, submittable: bool) -> Self {
        self.submittable = submittable;
        self
    }

    /// Append an ordinary section
    #[must_use]
    pub fn section(mut self, id: u64, subsections: Vec<Subsection>) -> Self {
        self.sections
            .get_or_insert_with(Vec::new)
            .push(Section {
                id: SectionId(id),
                is_meta: false,
                subsections,
            });
        self
    }

    /// Append a meta section (edits inside it invalidate the whole preview)
    #[must_use]
    pub fn meta_section(mut self, id: u64, subsections: Vec<Subsection>) -> Self {
        self.sections
            .get_or_insert_with(Vec::new)
            .push(Section {
                id: SectionId(id),
                is_meta: true,
                subsections,
            });
        self
    }

    /// Leave the sections collection unhydrated
    #[must_use]
    pub fn unhydrated(mut self) -> Self {
        self.sections = None;
        self
    }

    /// Finish the document
    #[must_use]
    pub fn build(self) -> Document {
        Document {
            id: self.id,
            slug: self.slug,
            closed: self.closed,
            closed_at: self.closed_at,
            submittable: self.submittable,
            sections: self.sections,
        }
    }
}

/// A subsection with standard questions
#[must_use]
pub fn subsection(id: u64, question_ids: &[u64]) -> Subsection {
    Subsection {
        id: SubsectionId(id),
        name: format!("subsection {id}"),
        questions: question_ids
            .iter()
            .map(|q| Question {
                id: QuestionId(*q),
                subsection_id: SubsectionId(id),
                kind: QuestionKind::Standard,
            })
            .collect(),
    }
}

/// A subsection led by a gate question, followed by standard questions
#[must_use]
pub fn gated_subsection(id: u64, gate: u64, question_ids: &[u64]) -> Subsection {
    let mut questions = vec![Question {
        id: QuestionId(gate),
        subsection_id: SubsectionId(id),
        kind: QuestionKind::Gate,
    }];
    questions.extend(question_ids.iter().map(|q| Question {
        id: QuestionId(*q),
        subsection_id: SubsectionId(id),
        kind: QuestionKind::Standard,
    }));
    Subsection {
        id: SubsectionId(id),
        name: format!("subsection {id}"),
        questions,
    }
}
