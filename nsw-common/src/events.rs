//! Workflow event system
//!
//! The orchestrator publishes everything an observer (console, web shell,
//! tests) needs to reflect workflow state: busy transitions, candidate
//! replacements, counters, draft fields and reviewer notices. Observers are
//! optional, so every emit is lossy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::candidate::CandidateId;

/// One of the six discrete workflow triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Optimize,
    BboStep,
    Reset,
    GenerateDraft,
    GenerateFinal,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Optimize => "optimize",
            Stage::BboStep => "bbo_step",
            Stage::Reset => "reset",
            Stage::GenerateDraft => "generate_draft",
            Stage::GenerateFinal => "generate_final",
        }
    }

    /// Status text shown while the stage is in flight
    pub fn busy_message(self) -> &'static str {
        match self {
            Stage::Generate => "Generating candidates...",
            Stage::Optimize => "Optimizing from parameter settings only...",
            Stage::BboStep => "Learning from ratings and optimizing the combination...",
            Stage::Reset => "Resetting rating history...",
            Stage::GenerateDraft => "Generating draft article...",
            Stage::GenerateFinal => "Generating final article...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reviewer-facing workflow step (tab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Setup,
    Review,
    Draft,
}

/// Severity of a reviewer notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// NSW workflow events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// Busy indicator changed; `stage` is None when idle
    BusyChanged {
        stage: Option<Stage>,
        message: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Candidate snapshot swapped by a stage response
    CandidatesReplaced {
        stage: Stage,
        total: usize,
        selected: usize,
        timestamp: DateTime<Utc>,
    },

    /// History counter display changed
    HistoryCountChanged {
        count: u64,
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// Active workflow step changed
    StepChanged {
        step: WorkflowStep,
        timestamp: DateTime<Utc>,
    },

    /// Draft summary and article populated
    DraftUpdated {
        summary_chars: usize,
        article_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// Final text populated
    FinalTextUpdated {
        chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// Auto-sizing text areas need re-measuring
    LayoutInvalidated {
        timestamp: DateTime<Utc>,
    },

    /// Message addressed to the reviewer
    ReviewerNotice {
        level: NoticeLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Rating edit acknowledged by the backend
    RatingSubmitted {
        candidate_id: CandidateId,
        rating: u8,
        timestamp: DateTime<Utc>,
    },

    /// Rating edit could not be delivered
    RatingFailed {
        candidate_id: CandidateId,
        rating: u8,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    pub fn notice(level: NoticeLevel, message: impl Into<String>) -> Self {
        WorkflowEvent::ReviewerNotice {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for workflow events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
