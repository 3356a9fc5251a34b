//! End-to-end session behavior over the in-memory API fake
//!
//! Covers the load → answer → status → readiness flow, the idempotent
//! submit short-circuit, preview blast-radius bookkeeping, and the degrade
//! paths for remote failures.

use docbuilder_engine::{
    ContentSlot, EngineError, RefreshScope, Session, SessionConfig, SubmitOutcome,
    SubsectionStatus,
};
use docbuilder_model::{OrganizationId, QuestionId, SectionId, SubsectionId};
use docbuilder_api::SubmittableStatus;
use docbuilder_test_utils::{document, gated_subsection, subsection, FakeApi};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const ORG: OrganizationId = OrganizationId(7);

/// A document with a meta section, an ordinary section and a gated one
fn fixture() -> docbuilder_model::Document {
    document(1, "plan")
        .meta_section(11, vec![subsection(101, &[1001])])
        .section(12, vec![subsection(103, &[1002, 1003]), subsection(104, &[])])
        .section(14, vec![gated_subsection(401, 4001, &[4002])])
        .build()
}

async fn load(api: &Arc<FakeApi>) -> Session {
    Session::load(
        Arc::clone(api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await
    .expect("session should load")
}

#[tokio::test]
async fn load_seeds_statuses_from_bulk_answers() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1001), None, &json!("mission statement"));
    api.seed_answer(ORG, QuestionId(1002), None, &json!({"choice": 1}));

    let session = load(&api).await;

    assert_eq!(session.status_of(SubsectionId(101)), SubsectionStatus::Complete);
    // 1003 unanswered
    assert_eq!(session.status_of(SubsectionId(103)), SubsectionStatus::Pending);
    assert_eq!(
        session.status_of(SubsectionId(104)),
        SubsectionStatus::NotApplicable
    );
    // Gate unanswered
    assert_eq!(session.status_of(SubsectionId(401)), SubsectionStatus::Pending);
    assert!(!session.readiness().requirements_met);
}

#[tokio::test]
async fn load_degrades_to_empty_store_on_answer_fetch_failure() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1001), None, &json!("x"));
    api.fail_answers(true);

    let session = load(&api).await;

    assert!(session.answer(QuestionId(1001)).is_none());
    assert_eq!(session.status_of(SubsectionId(101)), SubsectionStatus::Pending);
}

#[tokio::test]
async fn load_surfaces_malformed_answer_values() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_record(
        docbuilder_api::AnswerRecord {
            question_id: QuestionId(1001),
            organization_id: ORG,
            value: "{broken".into(),
            updated_at: None,
        },
        None,
    );

    let result = Session::load(
        Arc::clone(&api) as Arc<dyn docbuilder_api::DocbuilderApi>,
        "plan",
        ORG,
        SessionConfig::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(EngineError::MalformedAnswerValue { question, .. }) if question == QuestionId(1001)
    ));
}

#[tokio::test]
async fn submit_updates_status_and_records_blast_radius() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1002), None, &json!("a"));
    let session = load(&api).await;

    let outcome = session
        .submit_answer(QuestionId(1003), json!("b"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            status: SubsectionStatus::Complete,
            scope: RefreshScope::Section(SectionId(12)),
        }
    );
    assert_eq!(session.preview().outdated(), vec![SectionId(12)]);

    // A second edit in the same section does not duplicate the queue entry
    session
        .submit_answer(QuestionId(1002), json!("a2"))
        .await
        .unwrap();
    assert_eq!(session.preview().outdated(), vec![SectionId(12)]);
}

#[tokio::test]
async fn meta_section_edit_requests_full_reload() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    let session = load(&api).await;

    let outcome = session
        .submit_answer(QuestionId(1001), json!("new mission"))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Submitted {
            scope: RefreshScope::Full,
            ..
        }
    ));
    assert!(session.preview().needs_full_reload());
    assert!(session.preview().outdated().is_empty());
}

#[tokio::test]
async fn unchanged_submit_short_circuits() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1002), None, &json!({"choice": 1}));
    let session = load(&api).await;

    let outcome = session
        .submit_answer(QuestionId(1002), json!({"choice": 1}))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Unchanged);
    // No remote call, no preview invalidation
    assert_eq!(api.calls.submits(), 0);
    assert!(session.preview().outdated().is_empty());
    assert!(!session.preview().needs_full_reload());
}

#[tokio::test]
async fn submit_rejects_unknown_questions() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    let session = load(&api).await;

    let result = session.submit_answer(QuestionId(9999), json!("x")).await;
    assert!(matches!(
        result,
        Err(EngineError::UnknownQuestion(q)) if q == QuestionId(9999)
    ));
}

#[tokio::test]
async fn gate_answer_dismisses_subsection() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    let session = load(&api).await;

    let outcome = session
        .submit_answer(QuestionId(4001), json!(false))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SubmitOutcome::Submitted {
            status: SubsectionStatus::Dismissed,
            ..
        }
    ));
    assert_eq!(session.status_of(SubsectionId(401)), SubsectionStatus::Dismissed);
}

#[tokio::test]
async fn delete_recomputes_and_invalidates() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1002), None, &json!("a"));
    api.seed_answer(ORG, QuestionId(1003), None, &json!("b"));
    let session = load(&api).await;
    assert_eq!(session.status_of(SubsectionId(103)), SubsectionStatus::Complete);

    session.delete_answer(QuestionId(1003)).await.unwrap();

    assert_eq!(api.calls.deletes(), 1);
    assert!(session.answer(QuestionId(1003)).is_none());
    assert_eq!(session.status_of(SubsectionId(103)), SubsectionStatus::Pending);
    assert_eq!(session.preview().outdated(), vec![SectionId(12)]);
}

#[tokio::test]
async fn open_subsection_narrows_to_current_state() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    let session = load(&api).await;
    assert_eq!(session.status_of(SubsectionId(103)), SubsectionStatus::Pending);

    // Answers appear server-side after load (e.g. another device)
    api.seed_answer(ORG, QuestionId(1002), Some(SubsectionId(103)), &json!("a"));
    api.seed_answer(ORG, QuestionId(1003), Some(SubsectionId(103)), &json!("b"));

    let status = session.open_subsection(SubsectionId(103)).await.unwrap();
    assert_eq!(status, SubsectionStatus::Complete);
}

#[tokio::test]
async fn open_subsection_keeps_cache_on_fetch_failure() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1002), Some(SubsectionId(103)), &json!("a"));
    let session = load(&api).await;

    api.fail_answers(true);
    let status = session.open_subsection(SubsectionId(103)).await.unwrap();

    assert_eq!(status, SubsectionStatus::Pending);
    assert!(session.answer(QuestionId(1002)).is_some());
}

#[tokio::test]
async fn open_unknown_subsection_is_an_error() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    let session = load(&api).await;

    let result = session.open_subsection(SubsectionId(9999)).await;
    assert!(matches!(result, Err(EngineError::UnknownSubsection(_))));
}

#[tokio::test]
async fn submittable_fetch_failure_degrades_to_unknown() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.set_submittable(SubmittableStatus::NotSubmitted);
    let session = load(&api).await;

    assert_eq!(
        session.refresh_submittable().await,
        SubmittableStatus::NotSubmitted
    );

    api.fail_submittable(true);
    assert_eq!(session.refresh_submittable().await, SubmittableStatus::Unknown);
    assert_eq!(session.readiness().submittable, SubmittableStatus::Unknown);
}

#[tokio::test]
async fn submitted_status_makes_session_read_only() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.set_submittable(SubmittableStatus::SubmittedAndPending);
    let session = load(&api).await;
    session.refresh_submittable().await;

    assert!(session.read_only());
    let result = session.submit_answer(QuestionId(1002), json!("x")).await;
    assert!(matches!(result, Err(EngineError::ReadOnly)));
}

#[tokio::test]
async fn full_readiness_path_enables_submission() {
    let api = Arc::new(FakeApi::new().with_document(fixture()));
    api.seed_answer(ORG, QuestionId(1001), None, &json!("mission"));
    api.seed_answer(ORG, QuestionId(1002), None, &json!("a"));
    api.seed_answer(ORG, QuestionId(1003), None, &json!("b"));
    api.seed_answer(ORG, QuestionId(4001), None, &json!(false));
    api.set_submittable(SubmittableStatus::NotSubmitted);
    api.set_preview_document(&[(101, "<p>mission</p>"), (103, "<p>body</p>")]);

    let session = load(&api).await;
    assert!(session.readiness().requirements_met);
    // Content and submittable slots still unresolved
    assert!(!session.can_submit());

    session.refresh_submittable().await;
    assert!(!session.can_submit());

    session
        .refresh_preview(&CancellationToken::new())
        .await
        .unwrap();

    let readiness = session.readiness();
    assert_eq!(readiness.content, ContentSlot::Resolved);
    assert!(session.can_submit());

    // Dropping a required answer flips requirements-met back off
    session.delete_answer(QuestionId(1003)).await.unwrap();
    assert!(!session.readiness().requirements_met);
    assert!(!session.can_submit());
}
