//! Rating capture channel
//!
//! Rating edits bypass stage sequencing: they are validated synchronously,
//! queued, and delivered by a single worker task in submission order, one
//! request per edit. The latest edit for a candidate therefore always reaches
//! the backend last. Delivery never re-renders and never blocks a stage.
//!
//! Failures are logged and published as [`WorkflowEvent::RatingFailed`]; the
//! in-memory candidate is not touched until the next full replacement.

use chrono::Utc;
use nsw_common::api::{Ack, Endpoint, RatingRequest};
use nsw_common::candidate::{CandidateId, Rating};
use nsw_common::events::{EventBus, WorkflowEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{StageError, StageResult};
use crate::gateway::Gateway;

enum RatingCommand {
    Submit(RatingRequest),
    Flush(oneshot::Sender<()>),
}

/// Handle to the rating worker
#[derive(Clone)]
pub struct RatingChannel {
    tx: mpsc::UnboundedSender<RatingCommand>,
}

impl RatingChannel {
    /// Start the worker task
    ///
    /// The worker stops once every handle has been dropped.
    pub fn spawn(gateway: Gateway, event_bus: EventBus) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(rx, gateway, event_bus));
        (Self { tx }, handle)
    }

    /// Queue a rating edit
    ///
    /// Returns once the edit is queued; delivery happens in the background.
    /// An out-of-range rating is rejected here and never reaches the network.
    pub fn submit(&self, id: CandidateId, rating: u8) -> StageResult<()> {
        let rating = Rating::new(rating)?;
        tracing::debug!(candidate_id = %id, rating = rating.value(), "Rating queued");
        self.tx
            .send(RatingCommand::Submit(RatingRequest { id, rating }))
            .map_err(|_| StageError::Transport("rating channel is closed".to_string()))
    }

    /// Wait until every edit queued before this call has been delivered or
    /// has failed
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(RatingCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<RatingCommand>, gateway: Gateway, event_bus: EventBus) {
    while let Some(command) = rx.recv().await {
        match command {
            RatingCommand::Submit(request) => deliver(&gateway, &event_bus, request).await,
            RatingCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Rating worker stopped");
}

async fn deliver(gateway: &Gateway, event_bus: &EventBus, request: RatingRequest) {
    match gateway.call::<_, Ack>(Endpoint::UpdateRating, &request).await {
        Ok(_) => {
            tracing::info!(candidate_id = %request.id, rating = request.rating.value(), "Rating recorded");
            event_bus.emit_lossy(WorkflowEvent::RatingSubmitted {
                candidate_id: request.id,
                rating: request.rating.value(),
                timestamp: Utc::now(),
            });
        }
        Err(e) => {
            tracing::warn!(
                candidate_id = %request.id,
                rating = request.rating.value(),
                error = %e,
                "Rating update failed"
            );
            event_bus.emit_lossy(WorkflowEvent::RatingFailed {
                candidate_id: request.id,
                rating: request.rating.value(),
                reason: e.to_string(),
                timestamp: Utc::now(),
            });
        }
    }
}
