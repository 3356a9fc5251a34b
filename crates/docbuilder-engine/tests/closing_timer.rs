//! Closing-deadline behavior of a live session
//!
//! The timer is single-shot, scheduled once at load, observable through the
//! watch channel, and cancelled when the session is dropped. Runs under
//! paused tokio time so the deadline elapses instantly.

use chrono::{Duration as ChronoDuration, Utc};
use docbuilder_engine::{EngineError, Session, SessionConfig};
use docbuilder_model::{OrganizationId, QuestionId};
use docbuilder_test_utils::{document, subsection, FakeApi};
use serde_json::json;
use std::sync::Arc;

const ORG: OrganizationId = OrganizationId(7);

#[tokio::test(start_paused = true)]
async fn timer_flips_closed_state_at_deadline() {
    let doc = document(1, "plan")
        .closed_at(Utc::now() + ChronoDuration::hours(1))
        .section(12, vec![subsection(103, &[1002])])
        .build();
    let api = Arc::new(FakeApi::new().with_document(doc));

    let session = Session::load(
        Arc::clone(&api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await
    .unwrap();

    assert!(!session.is_closed());
    assert!(!session.read_only());

    let mut watch = session.closed_watch();
    watch.changed().await.unwrap();

    assert!(session.is_closed());
    assert!(session.read_only());
    let result = session.submit_answer(QuestionId(1002), json!("late")).await;
    assert!(matches!(result, Err(EngineError::ReadOnly)));
}

#[tokio::test(start_paused = true)]
async fn already_closed_document_loads_closed() {
    let doc = document(1, "plan")
        .closed_at(Utc::now() - ChronoDuration::hours(1))
        .section(12, vec![subsection(103, &[1002])])
        .build();
    let api = Arc::new(FakeApi::new().with_document(doc));

    let session = Session::load(
        Arc::clone(&api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await
    .unwrap();

    assert!(session.is_closed());
    assert!(session.read_only());
}

#[tokio::test(start_paused = true)]
async fn never_closing_document_schedules_no_timer() {
    let doc = document(1, "plan")
        .section(12, vec![subsection(103, &[1002])])
        .build();
    let api = Arc::new(FakeApi::new().with_document(doc));

    let session = Session::load(
        Arc::clone(&api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await
    .unwrap();

    // Give any (incorrectly) scheduled timer every chance to fire
    tokio::time::sleep(std::time::Duration::from_secs(365 * 24 * 3600)).await;
    assert!(!session.is_closed());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_cancels_the_timer() {
    let doc = document(1, "plan")
        .closed_at(Utc::now() + ChronoDuration::hours(1))
        .section(12, vec![subsection(103, &[1002])])
        .build();
    let api = Arc::new(FakeApi::new().with_document(doc));

    let session = Session::load(
        Arc::clone(&api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await
    .unwrap();

    let mut watch = session.closed_watch();
    drop(session);

    // The sender side is gone without ever firing
    tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
    assert!(watch.changed().await.is_err());
    assert!(!*watch.borrow());
}
