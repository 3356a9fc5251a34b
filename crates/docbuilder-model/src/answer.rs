//! Answer values
//!
//! One current answer per question per organization. Values are opaque
//! structured JSON: the wire carries them as encoded strings, the store
//! keeps them decoded (`serde_json::Value`) so completion rules can inspect
//! them without re-parsing.

use crate::ids::QuestionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded answer held in the session store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The answered question; unique key within a session
    pub question_id: QuestionId,
    /// Decoded payload; shape depends on the question type and is treated
    /// as opaque unless a completion rule knows better
    pub value: Value,
    /// Server-side update time, when reported
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Answer {
    /// Build an answer with no server metadata
    #[inline]
    #[must_use]
    pub fn new(question_id: QuestionId, value: Value) -> Self {
        Self {
            question_id,
            value,
            updated_at: None,
        }
    }

    /// Gate interpretation of this answer's value
    ///
    /// `false` and `"false"` both read as a closed gate; anything else
    /// (including malformed gate payloads) keeps the gate open so questions
    /// are never hidden by accident.
    #[inline]
    #[must_use]
    pub fn gate_open(&self) -> bool {
        match &self.value {
            Value::Bool(b) => *b,
            Value::String(s) => s != "false",
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gate_reads_boolean_false_as_closed() {
        assert!(!Answer::new(QuestionId(1), json!(false)).gate_open());
        assert!(!Answer::new(QuestionId(1), json!("false")).gate_open());
    }

    #[test]
    fn gate_defaults_open_for_other_shapes() {
        assert!(Answer::new(QuestionId(1), json!(true)).gate_open());
        assert!(Answer::new(QuestionId(1), json!("yes")).gate_open());
        assert!(Answer::new(QuestionId(1), json!({"choice": 2})).gate_open());
        assert!(Answer::new(QuestionId(1), Value::Null).gate_open());
    }
}
