//! Docbuilder session
//!
//! One `Session` per (document, organization) pair: it owns the answer
//! store, the derived subsection statuses, the preview cache and the
//! readiness record, and sequences every mutation (submit completes → store
//! updated → touched statuses recomputed → preview-staleness decision).
//!
//! Switching document or organization means constructing a new session and
//! dropping the old one — nothing is reconciled across that boundary, and
//! dropping cancels the closing timer so it can never fire against a stale
//! document.

use crate::answers::AnswerStore;
use crate::error::EngineError;
use crate::preview::{PreviewCache, RefreshScope};
use crate::readiness::{ContentSlot, Readiness};
use crate::status::{StatusProcessor, SubsectionStatus};
use docbuilder_api::{AnswerFilter, DocbuilderApi, RenderMode, SubmittableStatus};
use docbuilder_model::{
    closing, navigator, Answer, Document, OrganizationId, QuestionFilter, QuestionId,
    SubsectionId,
};
use futures::future::join_all;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Session tuning knobs
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Client closes this many milliseconds before the server deadline, so
    /// boundary submissions are refused locally instead of accepted and then
    /// rejected remotely
    pub closing_buffer_ms: i64,
    /// Rendering mode; the preview cache only operates in `Preview`
    pub render_mode: RenderMode,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom closing buffer
    #[inline]
    #[must_use]
    pub fn with_closing_buffer_ms(mut self, buffer_ms: i64) -> Self {
        self.closing_buffer_ms = buffer_ms;
        self
    }

    /// With a rendering mode
    #[inline]
    #[must_use]
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            closing_buffer_ms: 5_000,
            render_mode: RenderMode::Preview,
        }
    }
}

/// Result of an answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The value matched the stored answer; no remote call was made and no
    /// preview content was invalidated
    Unchanged,
    /// The answer was persisted
    Submitted {
        /// Recomputed status of the owning subsection
        status: SubsectionStatus,
        /// Preview blast radius recorded for this edit
        scope: RefreshScope,
    },
}

/// Client-side session over one (document, organization) pair
pub struct Session {
    api: Arc<dyn DocbuilderApi>,
    config: SessionConfig,
    organization: OrganizationId,
    document: Document,
    answers: Mutex<AnswerStore>,
    statuses: Mutex<HashMap<SubsectionId, SubsectionStatus>>,
    preview: PreviewCache,
    readiness: Mutex<Readiness>,
    closed_tx: Arc<watch::Sender<bool>>,
    closed_rx: watch::Receiver<bool>,
    timer_cancel: CancellationToken,
}

impl Session {
    /// Fetch the document and build a session around it
    ///
    /// The document fetch is fatal — nothing works without it. The bulk
    /// answer fetch degrades to an empty store on remote failure (the user
    /// re-opens subsections to retry). Statuses are seeded for every
    /// subsection, the closed state is evaluated once, and a single-shot
    /// closing timer is scheduled when the document is still open.
    ///
    /// # Errors
    /// Remote failure on the document fetch, a data-contract violation in
    /// the returned document, or a malformed stored answer value.
    pub async fn load(
        api: Arc<dyn DocbuilderApi>,
        slug: &str,
        organization: OrganizationId,
        config: SessionConfig,
    ) -> Result<Self, EngineError> {
        let document = api.fetch_document(slug).await?;
        info!(slug, %organization, document = %document.id, "session loading");

        let records = match api
            .fetch_answers(AnswerFilter::Document {
                organization,
                document: document.id,
            })
            .await
        {
            Ok(records) => records,
            Err(error) => {
                warn!(%error, "bulk answer fetch failed, starting with empty store");
                Vec::new()
            }
        };

        let mut answers = AnswerStore::new();
        answers.merge_records(records)?;

        let mut statuses = HashMap::new();
        for subsection in navigator::subsections(&document, QuestionFilter::All)? {
            statuses.insert(
                subsection.id,
                StatusProcessor::new(subsection, &answers).calculate_status(),
            );
        }

        let closed_now = closing::is_closed(&document, None);
        let (closed_tx, closed_rx) = watch::channel(closed_now);
        let closed_tx = Arc::new(closed_tx);
        let timer_cancel = CancellationToken::new();

        if !closed_now {
            let remaining = closing::millis_until_closed(&document, config.closing_buffer_ms, None);
            if remaining >= 0 {
                spawn_closing_timer(
                    Arc::clone(&closed_tx),
                    remaining as u64,
                    timer_cancel.clone(),
                );
            }
        }

        let readiness = Readiness::compute(
            ContentSlot::ToBeDetermined,
            statuses.values(),
            SubmittableStatus::Unknown,
        );

        Ok(Self {
            api,
            config,
            organization,
            document,
            answers: Mutex::new(answers),
            statuses: Mutex::new(statuses),
            preview: PreviewCache::new(),
            readiness: Mutex::new(readiness),
            closed_tx,
            closed_rx,
            timer_cancel,
        })
    }

    /// The loaded document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The organization this session answers for
    #[inline]
    #[must_use]
    pub fn organization(&self) -> OrganizationId {
        self.organization
    }

    /// Whether the document is closed right now (timer included)
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    /// Watch channel observing the local closed state
    #[inline]
    #[must_use]
    pub fn closed_watch(&self) -> watch::Receiver<bool> {
        self.closed_rx.clone()
    }

    /// Current status of a subsection
    ///
    /// Falls back to [`StatusProcessor::default_status`] for subsections no
    /// computation has covered yet, and `NotApplicable` for ids the document
    /// does not know.
    #[must_use]
    pub fn status_of(&self, id: SubsectionId) -> SubsectionStatus {
        if let Some(status) = self.statuses.lock().get(&id) {
            return *status;
        }
        match navigator::subsection_by_id(&self.document, id) {
            Ok(Some(subsection)) => StatusProcessor::default_status(subsection),
            _ => SubsectionStatus::NotApplicable,
        }
    }

    /// Snapshot of every subsection status
    #[inline]
    #[must_use]
    pub fn statuses(&self) -> HashMap<SubsectionId, SubsectionStatus> {
        self.statuses.lock().clone()
    }

    /// Current composite readiness record
    #[inline]
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        *self.readiness.lock()
    }

    /// Whether the document is read-only for this organization
    #[inline]
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.readiness().read_only(self.is_closed())
    }

    /// Whether submission is currently available
    #[inline]
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.readiness()
            .can_submit(self.document.submittable, self.is_closed())
    }

    /// The preview content cache
    #[inline]
    #[must_use]
    pub fn preview(&self) -> &PreviewCache {
        &self.preview
    }

    /// Current answer for a question, if any
    #[inline]
    #[must_use]
    pub fn answer(&self, question: QuestionId) -> Option<Answer> {
        self.answers.lock().get(question).cloned()
    }

    /// Re-fetch a subsection's answers and recompute its status
    ///
    /// Called when the user opens a subsection: the narrow fetch brings the
    /// store to the most current server state. A remote failure keeps the
    /// cached answers and is only logged.
    ///
    /// # Errors
    /// `EngineError::UnknownSubsection` for ids outside the document, or a
    /// malformed stored answer value.
    pub async fn open_subsection(
        &self,
        id: SubsectionId,
    ) -> Result<SubsectionStatus, EngineError> {
        if navigator::subsection_by_id(&self.document, id)?.is_none() {
            return Err(EngineError::UnknownSubsection(id));
        }

        let records = match self
            .api
            .fetch_answers(AnswerFilter::Subsection {
                organization: self.organization,
                subsection: id,
            })
            .await
        {
            Ok(records) => records,
            Err(error) => {
                warn!(subsection = %id, %error, "subsection answer fetch failed, keeping cached answers");
                Vec::new()
            }
        };

        let changed = self.answers.lock().merge_records(records)?;
        self.recompute_touched(&changed)?;
        self.refresh_readiness();
        Ok(self.status_of(id))
    }

    /// Submit an answer
    ///
    /// Submitting the value already stored is a local no-op: no remote call,
    /// no status recompute, no preview invalidation. Otherwise the persisted
    /// record is merged back, the owning subsection's status is recomputed,
    /// and the edit's preview blast radius is recorded (whole document for
    /// meta sections, one section otherwise).
    ///
    /// # Errors
    /// `EngineError::ReadOnly` when the document is not editable,
    /// `EngineError::UnknownQuestion` for foreign question ids, or the
    /// remote failure from the submission itself.
    pub async fn submit_answer(
        &self,
        question: QuestionId,
        value: Value,
    ) -> Result<SubmitOutcome, EngineError> {
        if self.read_only() {
            return Err(EngineError::ReadOnly);
        }
        let subsection_id = navigator::subsection_of_question(&self.document, question)?
            .map(|s| s.id)
            .ok_or(EngineError::UnknownQuestion(question))?;

        {
            let answers = self.answers.lock();
            if answers.get(question).map(|a| &a.value) == Some(&value) {
                debug!(%question, "unchanged answer value, skipping submission");
                return Ok(SubmitOutcome::Unchanged);
            }
        }

        let encoded = serde_json::to_string(&value)
            .map_err(|source| EngineError::MalformedAnswerValue { question, source })?;
        let record = self
            .api
            .submit_answer(self.organization, question, encoded)
            .await?;

        let changed = self.answers.lock().merge_records(vec![record])?;
        self.recompute_touched(&changed)?;
        self.refresh_readiness();

        let section_id =
            navigator::section_of_subsection(&self.document, subsection_id)?.map(|s| s.id);
        let scope = RefreshScope::plan(&self.document, self.config.render_mode, section_id)?;
        self.preview.request(scope);

        Ok(SubmitOutcome::Submitted {
            status: self.status_of(subsection_id),
            scope,
        })
    }

    /// Delete the answer to a question
    ///
    /// Remote deletion first; on success the entry leaves the store, the
    /// owning subsection is recomputed and the preview blast radius recorded.
    ///
    /// # Errors
    /// Same taxonomy as [`Session::submit_answer`].
    pub async fn delete_answer(&self, question: QuestionId) -> Result<(), EngineError> {
        if self.read_only() {
            return Err(EngineError::ReadOnly);
        }
        let subsection_id = navigator::subsection_of_question(&self.document, question)?
            .map(|s| s.id)
            .ok_or(EngineError::UnknownQuestion(question))?;

        self.api.delete_answer(self.organization, question).await?;

        let removed = self.answers.lock().remove(&[question]);
        if removed.is_empty() {
            return Ok(());
        }
        self.recompute_touched(&removed)?;
        self.refresh_readiness();

        let section_id =
            navigator::section_of_subsection(&self.document, subsection_id)?.map(|s| s.id);
        let scope = RefreshScope::plan(&self.document, self.config.render_mode, section_id)?;
        self.preview.request(scope);
        Ok(())
    }

    /// Refresh the server-reported submittable status
    ///
    /// A fetch failure degrades to `Unknown` instead of propagating — the
    /// readiness record always holds *some* value for this slot.
    pub async fn refresh_submittable(&self) -> SubmittableStatus {
        let status = match self
            .api
            .fetch_submittable_meta(self.document.id, self.organization)
            .await
        {
            Ok(status) => status,
            Err(error) => {
                warn!(%error, "submittable meta fetch failed, degrading to unknown");
                SubmittableStatus::Unknown
            }
        };

        let statuses = self.statuses.lock();
        let mut readiness = self.readiness.lock();
        *readiness = Readiness::compute(readiness.content, statuses.values(), status);
        status
    }

    /// Process pending preview staleness
    ///
    /// A pending full reload (or a still-empty cache) re-fetches the whole
    /// document; otherwise each queued section is refreshed incrementally
    /// under its own child cancellation token. A failed section refresh is
    /// logged and leaves that section queued and its entries stale.
    ///
    /// # Errors
    /// `EngineError::Cancelled` when `cancel` fired mid-flight (nothing was
    /// written), or the remote failure of a full-document refresh.
    pub async fn refresh_preview(&self, cancel: &CancellationToken) -> Result<(), EngineError> {
        if self.config.render_mode != RenderMode::Preview {
            return Ok(());
        }

        if self.preview.needs_full_reload() || self.preview.is_empty() {
            self.preview
                .refresh_document(
                    self.api.as_ref(),
                    &self.document.slug,
                    self.organization,
                    self.config.render_mode,
                    cancel,
                )
                .await?;
        } else {
            // Queued sections refresh concurrently, each under its own
            // child token
            let refreshes = self.preview.outdated().into_iter().map(|section| {
                let request_token = cancel.child_token();
                async move {
                    let result = self
                        .preview
                        .refresh_section(
                            self.api.as_ref(),
                            section,
                            self.organization,
                            self.config.render_mode,
                            &request_token,
                        )
                        .await;
                    (section, result)
                }
            });

            let mut cancelled = false;
            for (section, result) in join_all(refreshes).await {
                match result {
                    Ok(()) => {}
                    Err(EngineError::Cancelled) => cancelled = true,
                    Err(error) => {
                        warn!(%section, %error, "section preview refresh failed, leaving entries stale");
                    }
                }
            }
            if cancelled {
                return Err(EngineError::Cancelled);
            }
        }

        self.mark_content_resolved();
        Ok(())
    }

    /// Recompute statuses for the subsections owning the changed questions
    ///
    /// Only touched subsections are recomputed; an edit never costs
    /// O(all subsections).
    fn recompute_touched(&self, changed: &[QuestionId]) -> Result<(), EngineError> {
        if changed.is_empty() {
            return Ok(());
        }

        let mut touched: Vec<SubsectionId> = Vec::new();
        for question in changed {
            if let Some(subsection) =
                navigator::subsection_of_question(&self.document, *question)?
            {
                if !touched.contains(&subsection.id) {
                    touched.push(subsection.id);
                }
            }
        }

        let answers = self.answers.lock();
        let mut statuses = self.statuses.lock();
        for id in touched {
            if let Some(subsection) = navigator::subsection_by_id(&self.document, id)? {
                let status = StatusProcessor::new(subsection, &answers).calculate_status();
                debug!(subsection = %id, ?status, "subsection status recomputed");
                statuses.insert(id, status);
            }
        }
        Ok(())
    }

    fn refresh_readiness(&self) {
        let statuses = self.statuses.lock();
        let mut readiness = self.readiness.lock();
        *readiness = Readiness::compute(readiness.content, statuses.values(), readiness.submittable);
    }

    fn mark_content_resolved(&self) {
        let statuses = self.statuses.lock();
        let mut readiness = self.readiness.lock();
        *readiness =
            Readiness::compute(ContentSlot::Resolved, statuses.values(), readiness.submittable);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The closing timer must never fire against a torn-down session
        self.timer_cancel.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("document", &self.document.id)
            .field("organization", &self.organization)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Single-shot timer flipping the local closed state at the deadline
///
/// Cancelled through the session's token on drop; `select!` guarantees it
/// fires at most once.
fn spawn_closing_timer(
    closed_tx: Arc<watch::Sender<bool>>,
    delay_ms: u64,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {
                debug!("closing deadline reached, flipping local closed state");
                let _ = closed_tx.send(true);
            }
        }
    });
}
