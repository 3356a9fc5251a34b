//! Subsection completion status
//!
//! Each subsection carries exactly one derived status once the document is
//! loaded. Question-less subsections are `NotApplicable` from the start and
//! never re-evaluated against answers; everything else starts `Pending` and
//! resolves by inspecting the store.

use crate::answers::AnswerStore;
use docbuilder_model::{QuestionKind, Subsection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Derived completion state of a subsection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsectionStatus {
    /// No questions at all; terminal, assigned once at load
    NotApplicable,
    /// Has unanswered or incomplete questions
    Pending,
    /// Every required question has a qualifying answer
    Complete,
    /// A gate question was answered "no": the subsection does not apply to
    /// this organization and the remaining questions are not required
    Dismissed,
}

impl SubsectionStatus {
    /// Whether this status counts as resolved for readiness purposes
    #[inline]
    #[must_use]
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Complete | Self::Dismissed)
    }

    /// Whether this status blocks document readiness
    ///
    /// Only `Pending` blocks; `NotApplicable` never does.
    #[inline]
    #[must_use]
    pub fn blocks_readiness(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Computes a subsection's status from the current answers
#[derive(Debug)]
pub struct StatusProcessor<'a> {
    subsection: &'a Subsection,
    answers: &'a AnswerStore,
}

impl<'a> StatusProcessor<'a> {
    /// Pair a subsection with the answer store it is evaluated against
    #[inline]
    #[must_use]
    pub fn new(subsection: &'a Subsection, answers: &'a AnswerStore) -> Self {
        Self {
            subsection,
            answers,
        }
    }

    /// Status to show before any computation has run
    ///
    /// Used by the UI while no status entry exists yet, e.g. right after a
    /// subsection becomes newly visible.
    #[inline]
    #[must_use]
    pub fn default_status(subsection: &Subsection) -> SubsectionStatus {
        if subsection.has_questions() {
            SubsectionStatus::Pending
        } else {
            SubsectionStatus::NotApplicable
        }
    }

    /// Compute the current status
    ///
    /// Questions are inspected in declared order. A closed gate wins over
    /// everything after it; an unanswered question of any kind leaves the
    /// subsection `Pending`.
    #[must_use]
    pub fn calculate_status(&self) -> SubsectionStatus {
        if !self.subsection.has_questions() {
            return SubsectionStatus::NotApplicable;
        }

        for question in &self.subsection.questions {
            let answer = self.answers.get(question.id);

            let Some(answer) = answer else {
                return SubsectionStatus::Pending;
            };
            // Null payloads do not qualify as answered
            if answer.value == Value::Null {
                return SubsectionStatus::Pending;
            }
            if question.kind == QuestionKind::Gate && !answer.gate_open() {
                return SubsectionStatus::Dismissed;
            }
        }

        SubsectionStatus::Complete
    }
}

/// Whether the aggregate of subsection statuses satisfies requirements
///
/// False iff any status is `Pending`. `NotApplicable` and both resolved
/// states never block.
#[must_use]
pub fn requirements_met<'a, I>(statuses: I) -> bool
where
    I: IntoIterator<Item = &'a SubsectionStatus>,
{
    statuses.into_iter().all(|s| !s.blocks_readiness())
}
