//! Scriptable in-memory implementation of [`DocbuilderApi`]
//!
//! Supports failure injection per operation, call counting for idempotence
//! assertions, and a gate that parks preview fetches until the test releases
//! them — the hook cancellation tests hang requests on.

use async_trait::async_trait;
use docbuilder_api::{
    AnswerFilter, AnswerRecord, ApiError, DocbuilderApi, PreviewContent, RenderMode,
    SubmittableStatus,
};
use docbuilder_model::{Document, DocumentId, OrganizationId, QuestionId, SectionId, SubsectionId};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;

#[derive(Debug)]
struct SeededAnswer {
    record: AnswerRecord,
    subsection: Option<SubsectionId>,
}

/// Call counters for asserting on remote traffic
#[derive(Debug, Default)]
pub struct CallCounts {
    submit: AtomicUsize,
    delete: AtomicUsize,
    fetch_answers: AtomicUsize,
    preview_document: AtomicUsize,
    preview_section: AtomicUsize,
}

impl CallCounts {
    /// Answer submissions seen
    #[must_use]
    pub fn submits(&self) -> usize {
        self.submit.load(Ordering::SeqCst)
    }

    /// Answer deletions seen
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.delete.load(Ordering::SeqCst)
    }

    /// Bulk answer fetches seen
    #[must_use]
    pub fn answer_fetches(&self) -> usize {
        self.fetch_answers.load(Ordering::SeqCst)
    }

    /// Whole-document preview fetches seen
    #[must_use]
    pub fn document_previews(&self) -> usize {
        self.preview_document.load(Ordering::SeqCst)
    }

    /// Single-section preview fetches seen
    #[must_use]
    pub fn section_previews(&self) -> usize {
        self.preview_section.load(Ordering::SeqCst)
    }
}

/// In-memory fake of the remote API
#[derive(Debug, Default)]
pub struct FakeApi {
    document: Mutex<Option<Document>>,
    answers: Mutex<Vec<SeededAnswer>>,
    submittable: Mutex<SubmittableStatus>,
    preview_document: Mutex<PreviewContent>,
    preview_sections: Mutex<HashMap<SectionId, PreviewContent>>,
    preview_gate: Mutex<Option<watch::Receiver<bool>>>,
    fail_answers: AtomicBool,
    fail_submit: AtomicBool,
    fail_submittable: AtomicBool,
    fail_preview: AtomicBool,
    /// Call counters, public for direct assertion
    pub calls: CallCounts,
}

impl FakeApi {
    /// Create an empty fake
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this document for any slug
    #[must_use]
    pub fn with_document(self, document: Document) -> Self {
        *self.document.lock() = Some(document);
        self
    }

    /// Seed a stored answer, optionally tagged with its subsection so the
    /// narrow fetch path can find it
    pub fn seed_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
        subsection: Option<SubsectionId>,
        value: &Value,
    ) {
        let record = AnswerRecord {
            question_id: question,
            organization_id: organization,
            value: value.to_string(),
            updated_at: None,
        };
        let mut answers = self.answers.lock();
        answers.retain(|a| a.record.question_id != question);
        answers.push(SeededAnswer { record, subsection });
    }

    /// Seed a raw wire record verbatim (e.g. with a malformed value)
    pub fn seed_record(&self, record: AnswerRecord, subsection: Option<SubsectionId>) {
        self.answers.lock().push(SeededAnswer { record, subsection });
    }

    /// Set the submittable status served by the meta endpoint
    pub fn set_submittable(&self, status: SubmittableStatus) {
        *self.submittable.lock() = status;
    }

    /// Set the content returned for whole-document preview fetches
    pub fn set_preview_document(&self, entries: &[(u64, &str)]) {
        *self.preview_document.lock() = preview_content(entries);
    }

    /// Set the content returned for one section's preview fetches
    pub fn set_preview_section(&self, section: SectionId, entries: &[(u64, &str)]) {
        self.preview_sections
            .lock()
            .insert(section, preview_content(entries));
    }

    /// Make bulk/narrow answer fetches fail
    pub fn fail_answers(&self, fail: bool) {
        self.fail_answers.store(fail, Ordering::SeqCst);
    }

    /// Make answer submissions fail
    pub fn fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Make the submittable-meta fetch fail
    pub fn fail_submittable(&self, fail: bool) {
        self.fail_submittable.store(fail, Ordering::SeqCst);
    }

    /// Make preview fetches fail
    pub fn fail_preview(&self, fail: bool) {
        self.fail_preview.store(fail, Ordering::SeqCst);
    }

    /// Park preview fetches until the returned sender publishes `true`
    ///
    /// Lets a test cancel an in-flight request deterministically, then
    /// release the response and assert nothing was written.
    #[must_use]
    pub fn gate_previews(&self) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        *self.preview_gate.lock() = Some(rx);
        tx
    }

    async fn wait_preview_gate(&self) -> Result<(), ApiError> {
        let gate = self.preview_gate.lock().clone();
        if let Some(mut rx) = gate {
            rx.wait_for(|open| *open)
                .await
                .map_err(|_| ApiError::Transport("preview gate dropped".into()))?;
        }
        Ok(())
    }
}

fn preview_content(entries: &[(u64, &str)]) -> PreviewContent {
    PreviewContent {
        entries: entries
            .iter()
            .map(|(id, html)| (SubsectionId(*id), (*html).to_string()))
            .collect(),
    }
}

#[async_trait]
impl DocbuilderApi for FakeApi {
    async fn fetch_document(&self, _slug: &str) -> Result<Document, ApiError> {
        self.document
            .lock()
            .clone()
            .ok_or(ApiError::Status { status: 404 })
    }

    async fn fetch_submittable_meta(
        &self,
        _document: DocumentId,
        _organization: OrganizationId,
    ) -> Result<SubmittableStatus, ApiError> {
        if self.fail_submittable.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500 });
        }
        Ok(*self.submittable.lock())
    }

    async fn fetch_answers(&self, filter: AnswerFilter) -> Result<Vec<AnswerRecord>, ApiError> {
        self.calls.fetch_answers.fetch_add(1, Ordering::SeqCst);
        if self.fail_answers.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".into()));
        }
        let answers = self.answers.lock();
        let records = match filter {
            AnswerFilter::Document { organization, .. } => answers
                .iter()
                .filter(|a| a.record.organization_id == organization)
                .map(|a| a.record.clone())
                .collect(),
            AnswerFilter::Subsection {
                organization,
                subsection,
            } => answers
                .iter()
                .filter(|a| {
                    a.record.organization_id == organization && a.subsection == Some(subsection)
                })
                .map(|a| a.record.clone())
                .collect(),
        };
        Ok(records)
    }

    async fn submit_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
        value: String,
    ) -> Result<AnswerRecord, ApiError> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 422 });
        }
        let record = AnswerRecord {
            question_id: question,
            organization_id: organization,
            value,
            updated_at: Some(chrono::Utc::now()),
        };
        let mut answers = self.answers.lock();
        let subsection = answers
            .iter()
            .find(|a| a.record.question_id == question)
            .and_then(|a| a.subsection);
        answers.retain(|a| a.record.question_id != question);
        answers.push(SeededAnswer {
            record: record.clone(),
            subsection,
        });
        Ok(record)
    }

    async fn delete_answer(
        &self,
        _organization: OrganizationId,
        question: QuestionId,
    ) -> Result<(), ApiError> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .retain(|a| a.record.question_id != question);
        Ok(())
    }

    async fn fetch_preview_document(
        &self,
        _slug: &str,
        _organization: OrganizationId,
        _mode: RenderMode,
    ) -> Result<PreviewContent, ApiError> {
        self.calls.preview_document.fetch_add(1, Ordering::SeqCst);
        self.wait_preview_gate().await?;
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 502 });
        }
        Ok(self.preview_document.lock().clone())
    }

    async fn fetch_preview_section(
        &self,
        section: SectionId,
        _organization: OrganizationId,
        _mode: RenderMode,
    ) -> Result<PreviewContent, ApiError> {
        self.calls.preview_section.fetch_add(1, Ordering::SeqCst);
        self.wait_preview_gate().await?;
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 502 });
        }
        Ok(self
            .preview_sections
            .lock()
            .get(&section)
            .cloned()
            .unwrap_or_default())
    }
}
