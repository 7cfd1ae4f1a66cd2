//! Workflow engine transition tests against a real (temp-file) database.

mod common;

use common::{create_form, engine_with, history_actions, test_db, RecordingNotifier};
use punchlist::notify::NotifyEvent;
use punchlist::store::{FormStatus, FormStore};
use punchlist::workflow::WorkflowError;
use std::sync::Arc;

#[tokio::test]
async fn submit_clears_all_workflow_flags() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-23-0001", Some("tech@example.com")).await;
    assert_eq!(form.status, FormStatus::Draft);
    assert!(form.is_draft);

    let submitted = engine.submit(&form.id).await.unwrap();

    assert_eq!(submitted.status, FormStatus::Submitted);
    assert!(!submitted.is_draft);
    assert!(!submitted.is_rejected);
    assert!(!submitted.is_forwarded);
    assert!(!submitted.is_approved);
    assert!(submitted.submitted_at.is_some());
}

#[tokio::test]
async fn reject_then_forward_keeps_flags_mutually_exclusive() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-23-0002", Some("tech@example.com")).await;
    engine.submit(&form.id).await.unwrap();

    let rejected = engine
        .reject(&form.id, "pm@example.com", "missing torque readings")
        .await
        .unwrap();
    assert!(rejected.is_rejected);
    assert!(!rejected.is_forwarded);
    assert!(!rejected.is_approved);
    assert_eq!(
        rejected.rejection_note.as_deref(),
        Some("missing torque readings")
    );

    let forwarded = engine
        .forward(&form.id, "pm@example.com", "lead@example.com")
        .await
        .unwrap();
    assert!(!forwarded.is_rejected);
    assert!(forwarded.is_forwarded);
    assert!(!forwarded.is_approved);
    assert_eq!(
        forwarded.forwarded_to_email.as_deref(),
        Some("lead@example.com")
    );
}

#[tokio::test]
async fn resubmission_records_resubmitted_action() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    let form = create_form(&db, "24-23-0003", Some("tech@example.com")).await;

    engine.submit(&form.id).await.unwrap();
    engine
        .reject(&form.id, "pm@example.com", "wrong serial number")
        .await
        .unwrap();
    let resubmitted = engine.submit(&form.id).await.unwrap();

    // resubmission wipes the rejection entirely
    assert!(!resubmitted.is_rejected);
    assert!(resubmitted.rejection_note.is_none());

    assert_eq!(
        history_actions(&db, &form.id).await,
        vec!["submitted", "rejected", "resubmitted"]
    );

    let kinds = notifier.event_kinds();
    assert_eq!(kinds, vec!["submitted", "rejected", "resubmitted"]);

    let events = notifier.events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(NotifyEvent::Resubmitted { .. })
    ));
}

#[tokio::test]
async fn reject_with_empty_note_fails_fast_without_side_effects() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    let form = create_form(&db, "24-23-0004", Some("tech@example.com")).await;
    let submitted = engine.submit(&form.id).await.unwrap();

    let err = engine
        .reject(&form.id, "pm@example.com", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::MissingField("note")));

    // no state mutation, no history entry, no notification
    let current = FormStore::new(db.clone()).fetch(&form.id).await.unwrap().unwrap();
    assert!(!current.is_rejected);
    assert_eq!(current.revision, submitted.revision);
    assert_eq!(history_actions(&db, &form.id).await, vec!["submitted"]);
    assert_eq!(notifier.event_kinds(), vec!["submitted"]);
}

#[tokio::test]
async fn history_orders_entries_by_transition_sequence() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-29-0005", Some("tech@example.com")).await;

    engine.submit(&form.id).await.unwrap();
    engine
        .reject(&form.id, "pm@example.com", "incomplete parts list")
        .await
        .unwrap();
    engine
        .forward(&form.id, "pm@example.com", "lead@example.com")
        .await
        .unwrap();
    engine.approve(&form.id, "pm@example.com").await.unwrap();

    let entries = engine.history(&form.id).await.unwrap();
    let actions: Vec<_> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["submitted", "rejected", "forwarded", "approved"]);

    for pair in entries.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
}

#[tokio::test]
async fn end_to_end_reject_resubmit_scenario() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    let form = create_form(&db, "24-23-0001", Some("tech@example.com")).await;

    let submitted = engine.submit(&form.id).await.unwrap();
    assert_eq!(submitted.status, FormStatus::Submitted);
    assert!(!submitted.is_rejected);

    let rejected = engine
        .reject(&form.id, "pm@example.com", "missing signature")
        .await
        .unwrap();
    assert!(rejected.is_rejected);
    assert_eq!(rejected.rejection_note.as_deref(), Some("missing signature"));
    assert!(!rejected.is_approved);

    engine.submit(&form.id).await.unwrap();

    assert_eq!(
        history_actions(&db, &form.id).await,
        vec!["submitted", "rejected", "resubmitted"]
    );

    // the escalation label rides on the resubmission event
    let events = notifier.events.lock().unwrap();
    match events.last() {
        Some(NotifyEvent::Resubmitted { escalation, .. }) => {
            // fresh rejection, so the provisional policy grades it normal
            assert_eq!(escalation.as_str(), "normal");
        }
        other => panic!("expected resubmitted event, got {other:?}"),
    }
}

#[tokio::test]
async fn notification_failure_does_not_block_approval() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    let form = create_form(&db, "24-42-0006", Some("tech@example.com")).await;
    engine.submit(&form.id).await.unwrap();

    notifier.set_failing(true);
    let approved = engine.approve(&form.id, "pm@example.com").await.unwrap();

    assert!(approved.is_approved);
    assert!(!approved.http_post_sent);
    assert_eq!(
        history_actions(&db, &form.id).await,
        vec!["submitted", "approved"]
    );
}

#[tokio::test]
async fn successful_notification_sets_http_post_sent() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-23-0007", Some("tech@example.com")).await;
    let submitted = engine.submit(&form.id).await.unwrap();

    assert!(submitted.http_post_sent);
    let stored = FormStore::new(db.clone()).fetch(&form.id).await.unwrap().unwrap();
    assert!(stored.http_post_sent);
}

#[tokio::test]
async fn transitions_on_unknown_form_are_not_found() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    assert!(matches!(
        engine.submit("no-such-form").await,
        Err(WorkflowError::FormNotFound(_))
    ));
    assert!(matches!(
        engine.reject("no-such-form", "pm@example.com", "note").await,
        Err(WorkflowError::FormNotFound(_))
    ));
    assert!(matches!(
        engine
            .forward("no-such-form", "pm@example.com", "lead@example.com")
            .await,
        Err(WorkflowError::FormNotFound(_))
    ));
    assert!(matches!(
        engine.approve("no-such-form", "pm@example.com").await,
        Err(WorkflowError::FormNotFound(_))
    ));

    // not-found transitions never reach the notifier
    assert!(notifier.event_kinds().is_empty());
}

#[tokio::test]
async fn log_appends_free_form_entries_with_all_params_required() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier.clone());

    let form = create_form(&db, "24-23-0008", Some("tech@example.com")).await;

    engine
        .log(&form.id, "draft_saved", "tech@example.com")
        .await
        .unwrap();
    engine
        .log(&form.id, "edit_enabled", "pm@example.com")
        .await
        .unwrap();

    assert_eq!(
        history_actions(&db, &form.id).await,
        vec!["draft_saved", "edit_enabled"]
    );
    // ancillary log entries do not notify
    assert!(notifier.event_kinds().is_empty());

    assert!(matches!(
        engine.log("", "draft_saved", "tech@example.com").await,
        Err(WorkflowError::MissingField("formId"))
    ));
    assert!(matches!(
        engine.log(&form.id, "", "tech@example.com").await,
        Err(WorkflowError::MissingField("action"))
    ));
    assert!(matches!(
        engine.log(&form.id, "draft_saved", "").await,
        Err(WorkflowError::MissingField("actorEmail"))
    ));
}

#[tokio::test]
async fn revision_increments_on_every_transition() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-23-0009", Some("tech@example.com")).await;
    assert_eq!(form.revision, 0);

    let after_submit = engine.submit(&form.id).await.unwrap();
    assert_eq!(after_submit.revision, 1);

    let after_reject = engine
        .reject(&form.id, "pm@example.com", "redo photos")
        .await
        .unwrap();
    assert_eq!(after_reject.revision, 2);

    let after_resubmit = engine.submit(&form.id).await.unwrap();
    assert_eq!(after_resubmit.revision, 3);
}

#[tokio::test]
async fn submit_falls_back_to_unknown_actor() {
    let (db, _dir) = test_db().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with(&db, notifier);

    let form = create_form(&db, "24-23-0010", None).await;
    engine.submit(&form.id).await.unwrap();

    let entries = engine.history(&form.id).await.unwrap();
    assert_eq!(entries[0].actor_email, "unknown");
}
