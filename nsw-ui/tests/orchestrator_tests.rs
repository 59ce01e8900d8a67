//! Workflow orchestrator integration tests
//!
//! Stages run against the scripted in-memory transport; assertions cover the
//! issued requests, the session state and the published events.

mod helpers;

use helpers::*;
use nsw_common::api::Endpoint;
use nsw_common::candidate::CandidateId;
use nsw_common::events::{NoticeLevel, Stage, WorkflowEvent, WorkflowStep};
use nsw_ui::orchestrator::{BusyState, ReviewForm, MISSING_GENERATION_INPUT};
use nsw_ui::StageError;
use serde_json::json;

// ============================================================================
// Generate
// ============================================================================

#[tokio::test]
async fn test_generate_without_key_makes_no_request() {
    // Given: topic filled, model key empty
    let mut h = harness_with_form(ReviewForm {
        topic_main: "A harbor at dawn".to_string(),
        ..ReviewForm::default()
    });

    // When: Generate is triggered
    let err = h.orchestrator.generate().await.unwrap_err();

    // Then: validation message, zero network calls, no state change
    assert_eq!(err, StageError::Validation(MISSING_GENERATION_INPUT.to_string()));
    assert!(h.transport.calls().is_empty());
    let events = drain(&mut h.events);
    assert_eq!(notices(&events), vec![MISSING_GENERATION_INPUT.to_string()]);
    assert_eq!(h.orchestrator.snapshot().await.step, WorkflowStep::Setup);
}

#[tokio::test]
async fn test_generate_with_whitespace_topic_is_rejected() {
    let h = harness_with_form(ReviewForm {
        gemini_key: "key".to_string(),
        topic_main: "   ".to_string(),
        ..ReviewForm::default()
    });

    assert!(matches!(h.orchestrator.generate().await, Err(StageError::Validation(_))));
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_generate_groups_two_scene_one_character() {
    let mut h = harness();
    h.transport.reply_json(
        Endpoint::GenerateCandidates,
        candidates_reply(vec![scene(0), character(1), scene(2)]),
    );

    let total = h.orchestrator.generate().await.unwrap();
    assert_eq!(total, 3);

    let display = h.orchestrator.display().await;
    let headers: Vec<(&str, usize)> =
        display.groups().iter().map(|g| (g.header.label.as_str(), g.cards.len())).collect();
    assert_eq!(headers, vec![("Scene Craft", 2), ("Character Dynamics", 1)]);

    let session = h.orchestrator.snapshot().await;
    assert_eq!(session.step, WorkflowStep::Review);
    assert_eq!(session.history_count, 0);

    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::HistoryCountChanged { count: 0, label, .. } if label == "Training samples: 0"
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::StepChanged { step: WorkflowStep::Review, .. })));
}

#[tokio::test]
async fn test_generate_sends_form_payload() {
    let h = harness();
    h.orchestrator.set_form_field("topic_sub1", "Storm season").await.unwrap();
    h.orchestrator.set_form_field("p_tension", "0.9").await.unwrap();
    h.transport.reply_json(Endpoint::GenerateCandidates, candidates_reply(vec![]));

    h.orchestrator.generate().await.unwrap();

    let calls = h.transport.calls_to(Endpoint::GenerateCandidates);
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["gemini_key"], "test-key");
    assert_eq!(body["topic_main"], "A lighthouse keeper finds a letter");
    assert_eq!(body["topic_sub1"], "Storm season");
    assert_eq!(body["topic_sub2"], "");
    assert_eq!(body["amplify_token"], "");
    assert_eq!(body["params"]["p_tension"], 0.9);
    assert_eq!(body["params"]["p_char_trauma"], 0.0);
    assert_eq!(body["params"]["length"], 500);
}

#[tokio::test]
async fn test_generate_empty_batch_renders_placeholder() {
    let h = harness();
    h.transport.reply_json(Endpoint::GenerateCandidates, candidates_reply(vec![]));

    h.orchestrator.generate().await.unwrap();

    let display = h.orchestrator.display().await;
    assert_eq!(display.placeholder_count(), 1);
    assert_eq!(display.header_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_shown_and_keeps_state() {
    let mut h = harness();
    h.transport.reply_json(Endpoint::GenerateCandidates, candidates_reply(vec![scene(0)]));
    h.orchestrator.generate().await.unwrap();
    drain(&mut h.events);

    h.transport.reply_json(Endpoint::Optimize, error_reply("Solver token rejected"));
    let err = h.orchestrator.optimize().await.unwrap_err();

    assert_eq!(err, StageError::Backend("Solver token rejected".to_string()));
    assert_eq!(h.orchestrator.candidates().await.len(), 1, "candidates untouched");
    assert_eq!(h.orchestrator.busy_state(), BusyState::Idle);
    let events = drain(&mut h.events);
    assert_eq!(notices(&events), vec!["Error: Solver token rejected".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_clears_busy() {
    let mut h = harness();
    h.transport
        .reply(Endpoint::GenerateCandidates, Reply::NetworkError("connection refused".to_string()));

    let err = h.orchestrator.generate().await.unwrap_err();

    assert_eq!(err, StageError::Transport("connection refused".to_string()));
    assert_eq!(h.orchestrator.busy_state(), BusyState::Idle);
    let events = drain(&mut h.events);
    let busy: Vec<Option<Stage>> = events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::BusyChanged { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(busy, vec![Some(Stage::Generate), None]);
    assert_eq!(notices(&events), vec!["Communication error: connection refused".to_string()]);
    assert_eq!(h.orchestrator.snapshot().await.step, WorkflowStep::Setup);
}

#[tokio::test]
async fn test_malformed_response_is_transport_failure() {
    let h = harness();
    h.transport.reply(Endpoint::Optimize, Reply::Raw("<html>502 Bad Gateway</html>".to_string()));

    assert!(matches!(h.orchestrator.optimize().await, Err(StageError::Transport(_))));
    assert_eq!(h.orchestrator.busy_state(), BusyState::Idle);
}

// ============================================================================
// Optimize and BBO step
// ============================================================================

#[tokio::test]
async fn test_optimize_replaces_candidates_wholesale() {
    let h = harness();
    h.transport
        .reply_json(Endpoint::GenerateCandidates, candidates_reply(vec![scene(0), scene(1), character(2)]));
    h.transport.reply_json(
        Endpoint::Optimize,
        candidates_reply(vec![candidate_json(5, "Character Dynamics", true, 4)]),
    );

    h.orchestrator.generate().await.unwrap();
    h.orchestrator.optimize().await.unwrap();

    let candidates = h.orchestrator.candidates().await;
    assert_eq!(candidates.len(), 1);
    let display = h.orchestrator.display().await;
    let card = display.cards().next().unwrap();
    assert!(card.highlighted);
    assert_eq!(card.rating.checked_value(), Some(4));
    assert_eq!(h.orchestrator.snapshot().await.history_count, 0);
}

#[tokio::test]
async fn test_bbo_step_updates_history_and_notifies() {
    let mut h = harness();
    h.transport.reply_json(
        Endpoint::BboStep,
        json!({"status": "success", "candidates": [scene(0), character(1)], "history_count": 12}),
    );

    let history = h.orchestrator.bbo_step().await.unwrap();

    assert_eq!(history, 12);
    assert_eq!(h.orchestrator.history_count().await, 12);
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::HistoryCountChanged { count: 12, label, .. } if label == "Training samples: 12"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::ReviewerNotice { level: NoticeLevel::Info, .. }
    )));
}

#[tokio::test]
async fn test_bbo_step_without_history_keeps_previous_count() {
    let h = harness();
    h.transport.reply_json(
        Endpoint::BboStep,
        json!({"status": "success", "candidates": [], "history_count": 3}),
    );
    h.transport.reply_json(Endpoint::BboStep, candidates_reply(vec![scene(0)]));

    h.orchestrator.bbo_step().await.unwrap();
    let history = h.orchestrator.bbo_step().await.unwrap();

    assert_eq!(history, 3);
    assert_eq!(h.orchestrator.candidates().await.len(), 1);
}

#[tokio::test]
async fn test_bbo_step_sends_queued_ratings_first() {
    let h = harness();
    h.transport.reply_json(Endpoint::GenerateCandidates, candidates_reply(vec![scene(0), scene(1)]));
    h.transport.reply_json(Endpoint::BboStep, candidates_reply(vec![scene(0), scene(1)]));
    h.orchestrator.generate().await.unwrap();

    h.orchestrator.submit_rating(CandidateId::Number(0), 5).unwrap();
    h.orchestrator.submit_rating(CandidateId::Number(1), 1).unwrap();
    h.orchestrator.bbo_step().await.unwrap();

    assert_eq!(
        h.transport.endpoints(),
        vec![
            Endpoint::GenerateCandidates,
            Endpoint::UpdateRating,
            Endpoint::UpdateRating,
            Endpoint::BboStep
        ]
    );
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn test_reset_declined_issues_no_request() {
    let h = harness();

    let outcome = h.orchestrator.reset(&|_: &str| false).await;

    assert_eq!(outcome, Err(StageError::Declined));
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_reset_confirmed_issues_one_call_and_zeroes_history() {
    let mut h = harness();
    h.transport.reply_json(
        Endpoint::BboStep,
        json!({"status": "success", "candidates": [], "history_count": 7}),
    );
    h.orchestrator.bbo_step().await.unwrap();
    drain(&mut h.events);

    let asked = std::sync::Mutex::new(Vec::new());
    h.orchestrator
        .reset(&|question: &str| {
            asked.lock().unwrap().push(question.to_string());
            true
        })
        .await
        .unwrap();

    assert_eq!(asked.lock().unwrap().len(), 1);
    let resets = h.transport.calls_to(Endpoint::BboReset);
    assert_eq!(resets.len(), 1);
    assert_eq!(resets[0].body, None, "reset carries no body");
    assert_eq!(h.orchestrator.history_count().await, 0);

    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::HistoryCountChanged { count: 0, label, .. } if label == "Training samples: 0"
    )));
}

#[tokio::test]
async fn test_reset_failure_is_log_only() {
    let mut h = harness();
    h.transport.reply_json(
        Endpoint::BboStep,
        json!({"status": "success", "candidates": [], "history_count": 4}),
    );
    h.orchestrator.bbo_step().await.unwrap();
    drain(&mut h.events);
    h.transport.reply_json(Endpoint::BboReset, error_reply("history locked"));

    let outcome = h.orchestrator.reset(&|_: &str| true).await;

    assert_eq!(outcome, Err(StageError::Backend("history locked".to_string())));
    assert_eq!(h.orchestrator.history_count().await, 4);
    assert!(notices(&drain(&mut h.events)).is_empty());
    assert_eq!(h.orchestrator.busy_state(), BusyState::Idle);
}

// ============================================================================
// Busy policy
// ============================================================================

#[tokio::test]
async fn test_trigger_while_busy_is_rejected() {
    let h = harness();
    let gate = h.transport.gate(Endpoint::Optimize);
    h.transport.reply_json(Endpoint::Optimize, candidates_reply(vec![scene(0)]));

    let running = {
        let orchestrator = h.orchestrator.clone();
        tokio::spawn(async move { orchestrator.optimize().await })
    };
    gate.entered.notified().await;

    // While optimize is in flight
    assert!(matches!(h.orchestrator.busy_state(), BusyState::Busy { stage: Stage::Optimize, .. }));
    let rejected = h.orchestrator.generate().await;
    assert_eq!(rejected, Err(StageError::Busy { active: Stage::Optimize }));
    let rejected = h.orchestrator.reset(&|_: &str| true).await;
    assert_eq!(rejected, Err(StageError::Busy { active: Stage::Optimize }));
    assert_eq!(h.transport.endpoints(), vec![Endpoint::Optimize]);

    // Ratings are not subject to the busy lock
    h.orchestrator.submit_rating(CandidateId::Number(0), 3).unwrap();

    gate.release.notify_one();
    assert_eq!(running.await.unwrap(), Ok(1));
    assert_eq!(h.orchestrator.busy_state(), BusyState::Idle);
    assert_eq!(h.orchestrator.candidates().await.len(), 1, "in-flight stage unaffected");
}

// ============================================================================
// Draft pipeline
// ============================================================================

#[tokio::test]
async fn test_generate_draft_fills_fields() {
    let mut h = harness();
    h.transport.reply_json(
        Endpoint::GenerateDraft,
        json!({"status": "success", "summary": "Keeper finds letter.", "article": "The lamp turned."}),
    );

    h.orchestrator.generate_draft().await.unwrap();

    let calls = h.transport.calls_to(Endpoint::GenerateDraft);
    assert_eq!(calls[0].body, Some(json!({})));
    let draft = h.orchestrator.draft().await;
    assert_eq!(draft.summary, "Keeper finds letter.");
    assert_eq!(draft.article, "The lamp turned.");
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(e, WorkflowEvent::DraftUpdated { .. })));
    assert!(events.iter().any(|e| matches!(e, WorkflowEvent::LayoutInvalidated { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::StepChanged { step: WorkflowStep::Draft, .. })));
    assert_eq!(h.orchestrator.snapshot().await.step, WorkflowStep::Draft);
}

#[tokio::test]
async fn test_failed_draft_keeps_step() {
    let h = harness();
    h.transport.reply_json(Endpoint::GenerateDraft, error_reply("Not enough ratings"));

    assert!(h.orchestrator.generate_draft().await.is_err());

    assert_eq!(h.orchestrator.snapshot().await.step, WorkflowStep::Setup);
}

#[tokio::test]
async fn test_generate_final_persists_edit_before_generating() {
    let h = harness();
    h.orchestrator.set_draft_article("Edited article.").await;
    h.orchestrator.set_instruction("Make it colder.").await;
    h.transport.reply_json(Endpoint::GenerateFinal, json!({"status": "success", "final_text": "Final."}));

    h.orchestrator.generate_final().await.unwrap();

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].endpoint, Endpoint::SaveDraftEdit);
    assert_eq!(
        calls[0].body,
        Some(json!({"article": "Edited article.", "instruction": "Make it colder."}))
    );
    assert_eq!(calls[1].endpoint, Endpoint::GenerateFinal);
    assert_eq!(calls[1].body, Some(json!({})));
    assert_eq!(h.orchestrator.draft().await.final_text, "Final.");
}

#[tokio::test]
async fn test_failed_edit_save_does_not_gate_final() {
    let mut h = harness();
    h.transport
        .reply(Endpoint::SaveDraftEdit, Reply::NetworkError("connection reset".to_string()));
    h.transport.reply_json(Endpoint::GenerateFinal, json!({"status": "success", "final_text": "Done."}));

    h.orchestrator.generate_final().await.unwrap();

    assert_eq!(h.orchestrator.draft().await.final_text, "Done.");
    assert!(notices(&drain(&mut h.events)).is_empty(), "only generation drives feedback");
}

#[tokio::test]
async fn test_final_generation_failure_is_shown() {
    let mut h = harness();
    h.transport.reply_json(Endpoint::GenerateFinal, error_reply("No draft available"));

    let err = h.orchestrator.generate_final().await.unwrap_err();

    assert_eq!(err, StageError::Backend("No draft available".to_string()));
    assert_eq!(h.orchestrator.draft().await.final_text, "");
    assert_eq!(notices(&drain(&mut h.events)), vec!["Error: No draft available".to_string()]);
}

#[tokio::test]
async fn test_export_final_text() {
    let h = harness();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("novel_scene.txt");

    assert!(matches!(h.orchestrator.export_final(&path).await, Err(StageError::Validation(_))));
    assert!(!path.exists());

    h.transport
        .reply_json(Endpoint::GenerateFinal, json!({"status": "success", "final_text": "雨が降っていた。"}));
    h.orchestrator.generate_final().await.unwrap();
    h.orchestrator.export_final(&path).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "雨が降っていた。");
}

#[tokio::test]
async fn test_export_write_failure_is_file_error() {
    // Given: a final text and a target inside a directory that does not exist
    let h = harness();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("novel_scene.txt");
    h.transport.reply_json(Endpoint::GenerateFinal, json!({"status": "success", "final_text": "Done."}));
    h.orchestrator.generate_final().await.unwrap();

    // When: exporting
    let err = h.orchestrator.export_final(&path).await.unwrap_err();

    // Then: reported as a file error, not as a validation problem
    assert!(matches!(err, StageError::Io(_)), "got {:?}", err);
    assert!(err.notice().starts_with("File error: "));
}
