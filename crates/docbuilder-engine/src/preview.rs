//! Preview content cache
//!
//! Two cooperating collections: rendered content keyed by subsection, and an
//! ordered, deduplicated queue of sections whose content is outdated. An id
//! in the outdated queue means its content must not be trusted for display
//! until re-fetched.
//!
//! Refreshes are cancellation-guarded per request: each in-flight fetch
//! carries its own `CancellationToken`, and a response resolving after its
//! token was cancelled is discarded without touching the cache. A single
//! shared flag would be wrong here — several section refreshes can be in
//! flight at once with independent lifetimes.

use crate::error::EngineError;
use dashmap::DashMap;
use docbuilder_api::{DocbuilderApi, RenderMode};
use docbuilder_model::{navigator, Document, ModelError, OrganizationId, SectionId, SubsectionId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Blast radius of an answer edit on rendered preview content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Nothing to refresh (non-preview render mode)
    None,
    /// Re-fetch the whole document's content
    Full,
    /// Re-fetch a single section incrementally
    ///
    /// The incremental path handles exactly one section per request; callers
    /// needing more than one must use `Full` instead.
    Section(SectionId),
}

impl RefreshScope {
    /// Decide the refresh scope for an edit
    ///
    /// Non-preview modes never refresh. A missing section id means the whole
    /// document must be reloaded, and so does any edit inside a meta section,
    /// since meta content (shared variables) can affect every rendered
    /// subsection. A section id the document does not know is treated as a
    /// full reload rather than guessing.
    ///
    /// # Errors
    /// Propagates the data-contract violation for unhydrated documents.
    pub fn plan(
        document: &Document,
        mode: RenderMode,
        edited_section: Option<SectionId>,
    ) -> Result<Self, ModelError> {
        if mode != RenderMode::Preview {
            return Ok(Self::None);
        }
        let Some(section_id) = edited_section else {
            return Ok(Self::Full);
        };
        match navigator::section_by_id(document, section_id)? {
            Some(section) if section.is_meta => Ok(Self::Full),
            Some(section) => Ok(Self::Section(section.id)),
            None => {
                warn!(%section_id, "edited section not in document, planning full reload");
                Ok(Self::Full)
            }
        }
    }
}

/// Cache of rendered preview content plus staleness bookkeeping
#[derive(Debug, Default)]
pub struct PreviewCache {
    /// Rendered HTML per subsection
    content: DashMap<SubsectionId, String>,
    /// Sections queued for incremental refresh, in request order, deduplicated
    outdated: Mutex<Vec<SectionId>>,
    /// Whole-document reload pending; supersedes the incremental queue
    full_reload: AtomicBool,
}

impl PreviewCache {
    /// Create an empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered content for a subsection, when present and trusted
    #[inline]
    #[must_use]
    pub fn content(&self, id: SubsectionId) -> Option<String> {
        self.content.get(&id).map(|entry| entry.clone())
    }

    /// Record that a refresh is needed
    ///
    /// `Full` clears the incremental queue (it is subsumed); enqueuing a
    /// section already queued is a no-op.
    pub fn request(&self, scope: RefreshScope) {
        match scope {
            RefreshScope::None => {}
            RefreshScope::Full => {
                self.full_reload.store(true, Ordering::SeqCst);
                self.outdated.lock().clear();
            }
            RefreshScope::Section(id) => {
                if self.full_reload.load(Ordering::SeqCst) {
                    return;
                }
                let mut outdated = self.outdated.lock();
                if !outdated.contains(&id) {
                    outdated.push(id);
                }
            }
        }
    }

    /// Sections currently queued for incremental refresh
    #[inline]
    #[must_use]
    pub fn outdated(&self) -> Vec<SectionId> {
        self.outdated.lock().clone()
    }

    /// Whether a whole-document reload is pending
    #[inline]
    #[must_use]
    pub fn needs_full_reload(&self) -> bool {
        self.full_reload.load(Ordering::SeqCst)
    }

    /// Number of cached subsection entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the cache holds no content
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Drop all content and staleness state (scope switch)
    pub fn clear(&self) {
        self.content.clear();
        self.outdated.lock().clear();
        self.full_reload.store(false, Ordering::SeqCst);
    }

    /// Re-fetch the whole document's rendered content
    ///
    /// On success the fetched entries replace the cache wholesale and all
    /// staleness state is reset. On failure or cancellation existing entries
    /// are left stale rather than cleared.
    ///
    /// # Errors
    /// `EngineError::Cancelled` when the token fired before the response was
    /// applied; the remote error otherwise.
    pub async fn refresh_document(
        &self,
        api: &dyn DocbuilderApi,
        slug: &str,
        organization: OrganizationId,
        mode: RenderMode,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let fetched = api.fetch_preview_document(slug, organization, mode).await?;
        if cancel.is_cancelled() {
            debug!(slug, "document preview response discarded after cancellation");
            return Err(EngineError::Cancelled);
        }

        self.content.clear();
        for (id, html) in fetched.entries {
            self.content.insert(id, html);
        }
        self.outdated.lock().clear();
        self.full_reload.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Re-fetch one section's rendered content
    ///
    /// Writes nothing if `cancel` fired while the request was in flight;
    /// the section then simply stays queued.
    ///
    /// # Errors
    /// `EngineError::Cancelled` on a discarded response; the remote error on
    /// fetch failure (entries stay stale, the section stays queued).
    pub async fn refresh_section(
        &self,
        api: &dyn DocbuilderApi,
        section: SectionId,
        organization: OrganizationId,
        mode: RenderMode,
        cancel: &CancellationToken,
    ) -> Result<(), EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let fetched = api.fetch_preview_section(section, organization, mode).await?;
        if cancel.is_cancelled() {
            debug!(%section, "section preview response discarded after cancellation");
            return Err(EngineError::Cancelled);
        }

        for (id, html) in fetched.entries {
            self.content.insert(id, html);
        }
        self.outdated.lock().retain(|queued| *queued != section);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        use docbuilder_model::{DocumentId, Section, Subsection, SubsectionId};
        Document {
            id: DocumentId(1),
            slug: "plan".into(),
            closed: false,
            closed_at: None,
            submittable: true,
            sections: Some(vec![
                Section {
                    id: SectionId(11),
                    is_meta: true,
                    subsections: vec![Subsection {
                        id: SubsectionId(101),
                        name: String::new(),
                        questions: vec![],
                    }],
                },
                Section {
                    id: SectionId(12),
                    is_meta: false,
                    subsections: vec![Subsection {
                        id: SubsectionId(102),
                        name: String::new(),
                        questions: vec![],
                    }],
                },
            ]),
        }
    }

    #[test]
    fn non_preview_mode_plans_nothing() {
        let doc = document();
        let scope =
            RefreshScope::plan(&doc, RenderMode::Published, Some(SectionId(12))).unwrap();
        assert_eq!(scope, RefreshScope::None);
    }

    #[test]
    fn missing_section_plans_full_reload() {
        let doc = document();
        let scope = RefreshScope::plan(&doc, RenderMode::Preview, None).unwrap();
        assert_eq!(scope, RefreshScope::Full);
    }

    #[test]
    fn meta_section_plans_full_reload() {
        let doc = document();
        let scope =
            RefreshScope::plan(&doc, RenderMode::Preview, Some(SectionId(11))).unwrap();
        assert_eq!(scope, RefreshScope::Full);
    }

    #[test]
    fn ordinary_section_plans_incremental() {
        let doc = document();
        let scope =
            RefreshScope::plan(&doc, RenderMode::Preview, Some(SectionId(12))).unwrap();
        assert_eq!(scope, RefreshScope::Section(SectionId(12)));
    }

    #[test]
    fn unknown_section_plans_full_reload() {
        let doc = document();
        let scope =
            RefreshScope::plan(&doc, RenderMode::Preview, Some(SectionId(999))).unwrap();
        assert_eq!(scope, RefreshScope::Full);
    }

    #[test]
    fn outdated_queue_deduplicates() {
        let cache = PreviewCache::new();

        cache.request(RefreshScope::Section(SectionId(12)));
        cache.request(RefreshScope::Section(SectionId(12)));
        cache.request(RefreshScope::Section(SectionId(14)));

        assert_eq!(cache.outdated(), vec![SectionId(12), SectionId(14)]);
        assert!(!cache.needs_full_reload());
    }

    #[test]
    fn full_reload_subsumes_queue() {
        let cache = PreviewCache::new();

        cache.request(RefreshScope::Section(SectionId(12)));
        cache.request(RefreshScope::Full);

        assert!(cache.needs_full_reload());
        assert!(cache.outdated().is_empty());

        // Incremental requests are absorbed while a full reload is pending
        cache.request(RefreshScope::Section(SectionId(14)));
        assert!(cache.outdated().is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let cache = PreviewCache::new();
        cache.content.insert(SubsectionId(101), "<p>x</p>".into());
        cache.request(RefreshScope::Full);

        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.needs_full_reload());
        assert!(cache.outdated().is_empty());
    }
}
