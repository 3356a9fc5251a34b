//! Submit-readiness aggregation
//!
//! Three independently-updating inputs — content availability, aggregate
//! subsection statuses, and the server's submittable status — combine into
//! one explicit record. Each input updates asynchronously; every consumer
//! decision must read the combination of all three, never a subset, so the
//! record is recomputed whenever any one slot changes, with the latest
//! value of the other two.

use crate::status::{requirements_met, SubsectionStatus};
use docbuilder_api::SubmittableStatus;
use serde::{Deserialize, Serialize};

/// State of the rendered-content input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSlot {
    /// Sentinel: no content fetch has resolved yet
    #[default]
    ToBeDetermined,
    /// At least one content fetch resolved for this session
    Resolved,
}

/// Composite readiness signal gating UI actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Readiness {
    /// Rendered-content slot
    pub content: ContentSlot,
    /// Aggregate of subsection statuses: false iff any is `Pending`
    pub requirements_met: bool,
    /// Server-reported submission lifecycle state
    pub submittable: SubmittableStatus,
}

impl Readiness {
    /// Recompute the full record from the latest value of every input
    #[must_use]
    pub fn compute<'a, I>(
        content: ContentSlot,
        statuses: I,
        submittable: SubmittableStatus,
    ) -> Self
    where
        I: IntoIterator<Item = &'a SubsectionStatus>,
    {
        Self {
            content,
            requirements_met: requirements_met(statuses),
            submittable,
        }
    }

    /// Whether the document must be presented read-only
    ///
    /// Read-only iff closed, or submitted and awaiting review, or finalized.
    #[inline]
    #[must_use]
    pub fn read_only(&self, closed: bool) -> bool {
        closed || self.submittable.locks_editing()
    }

    /// Whether submission is currently available
    ///
    /// Requires a submittable document that is still editable, all
    /// requirements met, resolved content, and nothing submitted yet.
    #[inline]
    #[must_use]
    pub fn can_submit(&self, document_submittable: bool, closed: bool) -> bool {
        document_submittable
            && !self.read_only(closed)
            && self.requirements_met
            && self.content == ContentSlot::Resolved
            && self.submittable == SubmittableStatus::NotSubmitted
    }
}
