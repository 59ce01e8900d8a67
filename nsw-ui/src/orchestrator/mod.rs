//! Workflow orchestrator
//!
//! Sequences the six reviewer-triggered stages against the gateway:
//!
//! | Stage          | Request           | On success                                  |
//! |----------------|-------------------|---------------------------------------------|
//! | generate       | form payload      | replace candidates, history 0, Review step  |
//! | optimize       | form payload      | replace candidates                          |
//! | bbo_step       | form payload      | replace candidates, history from response   |
//! | reset          | no body           | history 0                                   |
//! | generate_draft | `{}`              | fill summary and article, Draft step        |
//! | generate_final | edit, then `{}`   | fill final text                             |
//!
//! Every stage runs under the busy indicator; a trigger while busy is
//! rejected. Failures are reported to the reviewer as notices (reset only
//! logs them) and never change session state. Rating edits go through the
//! [`RatingChannel`] and are not subject to the busy lock.

mod busy;
mod draft;
mod session;

pub use busy::{BusyGuard, BusyIndicator, BusyState};
pub use session::{history_label, DraftFields, ReviewForm, WorkflowSession, MISSING_GENERATION_INPUT};

use chrono::Utc;
use nsw_common::api::{Ack, CandidateBatch, Endpoint};
use nsw_common::candidate::{Candidate, CandidateId, CandidateKind};
use nsw_common::events::{EventBus, NoticeLevel, Stage, WorkflowEvent, WorkflowStep};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StageError, StageResult};
use crate::gateway::Gateway;
use crate::rating::RatingChannel;
use crate::render::DisplayTree;

/// Question asked before the rating history is reset
pub const RESET_CONFIRMATION: &str = "Reset the rating history?";

/// Reviewer confirmation for destructive stages
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Drives the review workflow
///
/// Cheap to clone; clones share the session, busy state and rating worker.
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    gateway: Gateway,
    event_bus: EventBus,
    ratings: RatingChannel,
    busy: BusyIndicator,
    session: Arc<RwLock<WorkflowSession>>,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator and start its rating worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(gateway: Gateway, event_bus: EventBus, form: ReviewForm) -> Self {
        let (ratings, _worker) = RatingChannel::spawn(gateway.clone(), event_bus.clone());
        let session = WorkflowSession::new(form);
        tracing::info!(session_id = %session.session_id, "Review session started");

        Self {
            gateway,
            busy: BusyIndicator::new(event_bus.clone()),
            event_bus,
            ratings,
            session: Arc::new(RwLock::new(session)),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn busy_state(&self) -> BusyState {
        self.busy.current()
    }

    // ========================================================================
    // Candidate stages
    // ========================================================================

    /// Generate a fresh candidate batch
    ///
    /// Requires the model key and primary topic; without them no request is
    /// made. On success the history display returns to 0 and the workflow
    /// advances to the Review step.
    pub async fn generate(&self) -> StageResult<usize> {
        let outcome = self.generate_inner().await;
        self.report(Stage::Generate, outcome)
    }

    async fn generate_inner(&self) -> StageResult<usize> {
        self.session.read().await.form.validate_for_generation()?;
        let _busy = self.busy.try_acquire(Stage::Generate)?;

        let batch = self.request_candidates(Endpoint::GenerateCandidates).await?;
        let total = {
            let mut session = self.session.write().await;
            session.replace_candidates(batch.candidates);
            session.history_count = 0;
            self.publish_replacement(Stage::Generate, &session);
            session.candidates.len()
        };

        self.publish_history(0);
        self.enter_step(WorkflowStep::Review).await;
        Ok(total)
    }

    /// Re-optimize from the parameter settings only
    pub async fn optimize(&self) -> StageResult<usize> {
        let outcome = self.optimize_inner().await;
        self.report(Stage::Optimize, outcome)
    }

    async fn optimize_inner(&self) -> StageResult<usize> {
        let _busy = self.busy.try_acquire(Stage::Optimize)?;

        let batch = self.request_candidates(Endpoint::Optimize).await?;
        let mut session = self.session.write().await;
        session.replace_candidates(batch.candidates);
        self.publish_replacement(Stage::Optimize, &session);
        Ok(session.candidates.len())
    }

    /// Learn from the submitted ratings and re-optimize
    ///
    /// Returns the history count now displayed.
    pub async fn bbo_step(&self) -> StageResult<u64> {
        let outcome = self.bbo_step_inner().await;
        self.report(Stage::BboStep, outcome)
    }

    async fn bbo_step_inner(&self) -> StageResult<u64> {
        let _busy = self.busy.try_acquire(Stage::BboStep)?;

        // Ratings queued before the trigger must be on the backend first
        self.ratings.flush().await;

        let batch = self.request_candidates(Endpoint::BboStep).await?;
        let history_count = {
            let mut session = self.session.write().await;
            session.replace_candidates(batch.candidates);
            match batch.history_count {
                Some(count) => session.history_count = count,
                None => tracing::warn!("BBO step response carried no history_count, keeping previous value"),
            }
            self.publish_replacement(Stage::BboStep, &session);
            session.history_count
        };

        self.publish_history(history_count);
        self.event_bus.emit_lossy(WorkflowEvent::notice(
            NoticeLevel::Info,
            "Ratings learned. The optimal combination is highlighted.",
        ));
        Ok(history_count)
    }

    /// Clear the backend rating history after reviewer confirmation
    ///
    /// Declining issues no request. Failures are logged only.
    pub async fn reset(&self, prompt: &dyn ConfirmPrompt) -> StageResult<()> {
        let outcome = self.reset_inner(prompt).await;
        self.report(Stage::Reset, outcome)
    }

    async fn reset_inner(&self, prompt: &dyn ConfirmPrompt) -> StageResult<()> {
        if !prompt.confirm(RESET_CONFIRMATION) {
            tracing::info!("Reset declined by reviewer");
            return Err(StageError::Declined);
        }
        let _busy = self.busy.try_acquire(Stage::Reset)?;

        self.gateway.call_without_body::<Ack>(Endpoint::BboReset).await?;
        self.session.write().await.history_count = 0;

        self.publish_history(0);
        self.event_bus
            .emit_lossy(WorkflowEvent::notice(NoticeLevel::Info, "Rating history has been reset."));
        Ok(())
    }

    async fn request_candidates(&self, endpoint: Endpoint) -> StageResult<CandidateBatch> {
        let request = self.session.read().await.form.stage_request();
        let batch: CandidateBatch = self.gateway.call(endpoint, &request).await?;
        Ok(batch)
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    /// Queue a rating edit for delivery
    ///
    /// Does not re-render and is not blocked by a running stage.
    pub fn submit_rating(&self, id: CandidateId, rating: u8) -> StageResult<()> {
        self.ratings.submit(id, rating)
    }

    /// Wait for queued rating edits
    pub async fn flush_ratings(&self) {
        self.ratings.flush().await;
    }

    /// Map reviewer-typed text to the id of a candidate in the snapshot
    pub async fn resolve_candidate_id(&self, text: &str) -> Option<CandidateId> {
        let text = text.trim();
        self.session
            .read()
            .await
            .candidates
            .iter()
            .map(|candidate| &candidate.id)
            .find(|id| id.to_string() == text)
            .cloned()
    }

    // ========================================================================
    // Form and session access
    // ========================================================================

    pub async fn set_form_field(&self, name: &str, value: &str) -> StageResult<()> {
        self.session.write().await.form.set_field(name, value)
    }

    pub async fn form(&self) -> ReviewForm {
        self.session.read().await.form.clone()
    }

    pub async fn candidates(&self) -> Arc<[Candidate]> {
        Arc::clone(&self.session.read().await.candidates)
    }

    pub async fn display(&self) -> Arc<DisplayTree> {
        Arc::clone(&self.session.read().await.display)
    }

    pub async fn history_count(&self) -> u64 {
        self.session.read().await.history_count
    }

    pub async fn snapshot(&self) -> WorkflowSession {
        self.session.read().await.clone()
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    fn publish_replacement(&self, stage: Stage, session: &WorkflowSession) {
        let total = session.candidates.len();
        let selected = session.selected_count();
        let unknown = session
            .candidates
            .iter()
            .filter(|candidate| candidate.kind == CandidateKind::Unknown)
            .count();
        if unknown > 0 {
            tracing::warn!(%stage, unknown, "Candidates with an unrecognized type are not displayed");
        }
        tracing::info!(%stage, total, selected, "Candidates replaced");
        self.event_bus.emit_lossy(WorkflowEvent::CandidatesReplaced {
            stage,
            total,
            selected,
            timestamp: Utc::now(),
        });
    }

    async fn enter_step(&self, step: WorkflowStep) {
        let previous = {
            let mut session = self.session.write().await;
            std::mem::replace(&mut session.step, step)
        };
        if previous != step {
            tracing::debug!(from = ?previous, to = ?step, "Workflow step changed");
        }
        self.event_bus.emit_lossy(WorkflowEvent::StepChanged {
            step,
            timestamp: Utc::now(),
        });
    }

    fn publish_history(&self, count: u64) {
        self.event_bus.emit_lossy(WorkflowEvent::HistoryCountChanged {
            count,
            label: history_label(count),
            timestamp: Utc::now(),
        });
    }

    /// Surface a stage failure to the reviewer and pass the outcome through
    fn report<T>(&self, stage: Stage, outcome: StageResult<T>) -> StageResult<T> {
        if let Err(e) = &outcome {
            match e {
                StageError::Declined => {}
                StageError::Busy { .. } => {
                    self.event_bus.emit_lossy(WorkflowEvent::notice(NoticeLevel::Error, e.notice()));
                }
                _ if stage == Stage::Reset => {
                    tracing::warn!(%stage, error = %e, "Reset failed");
                }
                _ => {
                    tracing::warn!(%stage, error = %e, "Stage failed");
                    self.event_bus.emit_lossy(WorkflowEvent::notice(NoticeLevel::Error, e.notice()));
                }
            }
        }
        outcome
    }
}
