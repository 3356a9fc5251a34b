//! Closing-time evaluation
//!
//! The server reports a `closed` boolean that can go stale between fetches;
//! `closed_at` is authoritative. Both functions take an optional `now`
//! override strictly for deterministic tests.

use crate::document::Document;
use chrono::{DateTime, Utc};

/// Sentinel returned by [`millis_until_closed`] for documents that never close
pub const NEVER_CLOSES: i64 = -1;

/// Whether the document is closed at `now`
///
/// A document without `closed_at` is never closed. The comparison is a
/// strict "after": at the exact boundary instant the document is still open.
#[must_use]
pub fn is_closed(document: &Document, now: Option<DateTime<Utc>>) -> bool {
    match document.closed_at {
        Some(closed_at) => now.unwrap_or_else(Utc::now) > closed_at,
        None => false,
    }
}

/// Milliseconds until the document should be treated as closed
///
/// Returns [`NEVER_CLOSES`] when there is no `closed_at`, `0` when
/// `closed_at - buffer` has already passed, and otherwise the strictly
/// positive `closed_at_ms - buffer_ms - now_ms`.
///
/// The buffer biases the client toward closing slightly before the server,
/// so a submission near the boundary is not accepted locally and then
/// rejected remotely.
#[must_use]
pub fn millis_until_closed(
    document: &Document,
    buffer_ms: i64,
    now: Option<DateTime<Utc>>,
) -> i64 {
    let Some(closed_at) = document.closed_at else {
        return NEVER_CLOSES;
    };

    let now_ms = now.unwrap_or_else(Utc::now).timestamp_millis();
    let remaining = closed_at.timestamp_millis() - buffer_ms - now_ms;
    remaining.max(0)
}
