//! Wire types for the remote API
//!
//! Answer values cross the wire as JSON-encoded strings and are decoded
//! exactly once, at the store boundary. Everything else is plain serde.

use chrono::{DateTime, Utc};
use docbuilder_model::{
    Answer, DocumentId, OrganizationId, QuestionId, SubsectionId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Server-reported lifecycle state of a document submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmittableStatus {
    /// Submittable but nothing submitted yet
    NotSubmitted,
    /// Submitted and awaiting review; the document is read-only
    SubmittedAndPending,
    /// Submission finalized; the document is read-only
    SubmittedAndLocked,
    /// Not yet fetched, fetch failed, or the document is not submittable.
    /// Unrecognized wire values also decode here.
    #[default]
    #[serde(other)]
    Unknown,
}

impl SubmittableStatus {
    /// Whether this status alone forces the document read-only
    #[inline]
    #[must_use]
    pub fn locks_editing(self) -> bool {
        matches!(self, Self::SubmittedAndPending | Self::SubmittedAndLocked)
    }
}

/// Rendering mode for fetched content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Live preview driven by current answers; the only mode the preview
    /// cache exists for
    Preview,
    /// Finalized published rendering
    Published,
}

/// An answer as it crosses the wire
///
/// `value` is a JSON-encoded string, not structured JSON; [`AnswerRecord::parse`]
/// decodes it into the session's [`Answer`] form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The answered question
    pub question_id: QuestionId,
    /// Owning organization
    pub organization_id: OrganizationId,
    /// JSON-encoded payload
    pub value: String,
    /// Server-side update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnswerRecord {
    /// Decode the JSON-string payload into a structured [`Answer`]
    ///
    /// # Errors
    /// The raw `serde_json` error when the payload is not valid JSON. The
    /// caller decides how loudly to surface it; swallowing it corrupts
    /// completion-status computation downstream.
    pub fn parse(&self) -> Result<Answer, serde_json::Error> {
        Ok(Answer {
            question_id: self.question_id,
            value: serde_json::from_str(&self.value)?,
            updated_at: self.updated_at,
        })
    }
}

/// Scope filter for bulk answer fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFilter {
    /// Every answer the organization holds for the document; used at load
    Document {
        organization: OrganizationId,
        document: DocumentId,
    },
    /// Answers for one subsection; used when a subsection is opened to
    /// narrow the store to the most current state
    Subsection {
        organization: OrganizationId,
        subsection: SubsectionId,
    },
}

/// Rendered preview content keyed by subsection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewContent {
    /// Rendered HTML per subsection
    pub entries: HashMap<SubsectionId, String>,
}

impl PreviewContent {
    /// Content for one subsection, when present
    #[inline]
    #[must_use]
    pub fn get(&self, id: SubsectionId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }
}

/// Submittable-meta response for a (document, organization) pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmittableMeta {
    /// Current submission lifecycle state
    pub status: SubmittableStatus,
}

/// Payload sent on answer submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub organization_id: OrganizationId,
    pub question_id: QuestionId,
    /// JSON-encoded payload, mirroring the record shape
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn submittable_status_decodes_known_values() {
        let s: SubmittableStatus = serde_json::from_str("\"not_submitted\"").unwrap();
        assert_eq!(s, SubmittableStatus::NotSubmitted);

        let s: SubmittableStatus =
            serde_json::from_str("\"submitted_and_pending\"").unwrap();
        assert_eq!(s, SubmittableStatus::SubmittedAndPending);
    }

    #[test]
    fn submittable_status_degrades_unknown_values() {
        let s: SubmittableStatus = serde_json::from_str("\"weird_new_state\"").unwrap();
        assert_eq!(s, SubmittableStatus::Unknown);
    }

    #[test]
    fn locks_editing_only_when_submitted() {
        assert!(SubmittableStatus::SubmittedAndPending.locks_editing());
        assert!(SubmittableStatus::SubmittedAndLocked.locks_editing());
        assert!(!SubmittableStatus::NotSubmitted.locks_editing());
        assert!(!SubmittableStatus::Unknown.locks_editing());
    }

    #[test]
    fn answer_record_parses_encoded_value() {
        let record = AnswerRecord {
            question_id: QuestionId(5),
            organization_id: OrganizationId(9),
            value: r#"{"choice": 2, "notes": "ok"}"#.into(),
            updated_at: None,
        };

        let answer = record.parse().unwrap();
        assert_eq!(answer.question_id, QuestionId(5));
        assert_eq!(answer.value, json!({"choice": 2, "notes": "ok"}));
    }

    #[test]
    fn answer_record_surfaces_malformed_value() {
        let record = AnswerRecord {
            question_id: QuestionId(5),
            organization_id: OrganizationId(9),
            value: "{not json".into(),
            updated_at: None,
        };

        assert!(record.parse().is_err());
    }

    #[test]
    fn preview_content_roundtrips_numeric_keys() {
        let body = r#"{"101": "<p>alpha</p>", "403": "<p>beta</p>"}"#;
        let content: PreviewContent = serde_json::from_str(body).unwrap();

        assert_eq!(content.get(SubsectionId(101)), Some("<p>alpha</p>"));
        assert_eq!(content.get(SubsectionId(403)), Some("<p>beta</p>"));
        assert_eq!(content.get(SubsectionId(7)), None);
    }
}
