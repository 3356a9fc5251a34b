//! In-memory answer store
//!
//! Normalized cache of the organization's answers, keyed by question id.
//! One entry per question, last write wins. Mutations are synchronous and
//! total; network errors belong to the caller before anything reaches here.
//!
//! Wire records carry their value as a JSON-encoded string; `merge_records`
//! decodes it once on entry. A malformed payload is surfaced as an error
//! (and logged) rather than swallowed, since it would silently corrupt the
//! subsection-status computation downstream.

use crate::error::EngineError;
use docbuilder_api::AnswerRecord;
use docbuilder_model::{Answer, QuestionId, Subsection};
use std::collections::HashMap;
use tracing::error;

/// Answer cache for one (organization, document) scope
#[derive(Debug, Default)]
pub struct AnswerStore {
    entries: HashMap<QuestionId, Answer>,
}

impl AnswerStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of decoded answers, last write wins per question id
    ///
    /// Returns the ids whose *value* actually changed (new entries count as
    /// changed). Metadata-only updates are absorbed silently so untouched
    /// subsections are never redundantly recomputed.
    pub fn merge(&mut self, answers: Vec<Answer>) -> Vec<QuestionId> {
        let mut changed = Vec::new();
        for answer in answers {
            let id = answer.question_id;
            match self.entries.get(&id) {
                Some(existing) if existing.value == answer.value => {
                    // Value unchanged; refresh metadata only
                    self.entries.insert(id, answer);
                }
                _ => {
                    self.entries.insert(id, answer);
                    changed.push(id);
                }
            }
        }
        changed
    }

    /// Decode and merge a batch of wire records
    ///
    /// # Errors
    /// `EngineError::MalformedAnswerValue` on the first payload that is not
    /// valid JSON. Records before it are already merged; the failure is a
    /// visible data problem, not a partial-merge rollback.
    pub fn merge_records(
        &mut self,
        records: Vec<AnswerRecord>,
    ) -> Result<Vec<QuestionId>, EngineError> {
        let mut decoded = Vec::with_capacity(records.len());
        let mut changed = Vec::new();
        for record in records {
            match record.parse() {
                Ok(answer) => decoded.push(answer),
                Err(source) => {
                    error!(question = %record.question_id, %source, "malformed answer value");
                    changed.extend(self.merge(decoded));
                    return Err(EngineError::MalformedAnswerValue {
                        question: record.question_id,
                        source,
                    });
                }
            }
        }
        changed.extend(self.merge(decoded));
        Ok(changed)
    }

    /// Remove entries for the given question ids; absent ids are a no-op
    ///
    /// Returns the ids that were actually present.
    pub fn remove(&mut self, ids: &[QuestionId]) -> Vec<QuestionId> {
        ids.iter()
            .copied()
            .filter(|id| self.entries.remove(id).is_some())
            .collect()
    }

    /// Empty the store entirely
    ///
    /// Answers are scoped to one (organization, document) pair; switching
    /// either clears wholesale rather than reconciling.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current answer for a question
    #[inline]
    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Answer> {
        self.entries.get(&id)
    }

    /// Answers belonging to the given subsection's questions
    #[must_use]
    pub fn answers_for(&self, subsection: &Subsection) -> Vec<&Answer> {
        subsection
            .questions
            .iter()
            .filter_map(|q| self.entries.get(&q.id))
            .collect()
    }

    /// Number of stored answers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
