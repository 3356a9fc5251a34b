//! Remote operation boundary
//!
//! The engine depends on this trait only; the HTTP implementation lives in
//! [`crate::http`] and test doubles in `docbuilder-test-utils`.

use crate::error::ApiError;
use crate::types::{AnswerFilter, AnswerRecord, PreviewContent, RenderMode, SubmittableStatus};
use async_trait::async_trait;
use docbuilder_model::{Document, DocumentId, OrganizationId, QuestionId, SectionId};

/// Remote operations the Docbuilder runtime depends on
///
/// Object-safe so sessions can hold an `Arc<dyn DocbuilderApi>`. Every
/// method maps to one remote request; callers own cancellation and fallback.
#[async_trait]
pub trait DocbuilderApi: Send + Sync {
    /// Fetch a fully hydrated document by slug
    async fn fetch_document(&self, slug: &str) -> Result<Document, ApiError>;

    /// Fetch the submission lifecycle state for a (document, organization) pair
    async fn fetch_submittable_meta(
        &self,
        document: DocumentId,
        organization: OrganizationId,
    ) -> Result<SubmittableStatus, ApiError>;

    /// Bulk-fetch answers within the given scope
    async fn fetch_answers(&self, filter: AnswerFilter) -> Result<Vec<AnswerRecord>, ApiError>;

    /// Submit (create or replace) the answer to a question
    ///
    /// `value` is the JSON-encoded payload; the returned record is the
    /// persisted state, last write wins per question.
    async fn submit_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
        value: String,
    ) -> Result<AnswerRecord, ApiError>;

    /// Delete the organization's answer to a question
    async fn delete_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
    ) -> Result<(), ApiError>;

    /// Fetch rendered content for the whole document, keyed by subsection
    async fn fetch_preview_document(
        &self,
        slug: &str,
        organization: OrganizationId,
        mode: RenderMode,
    ) -> Result<PreviewContent, ApiError>;

    /// Fetch rendered content for a single section, keyed by subsection
    async fn fetch_preview_section(
        &self,
        section: SectionId,
        organization: OrganizationId,
        mode: RenderMode,
    ) -> Result<PreviewContent, ApiError>;
}
