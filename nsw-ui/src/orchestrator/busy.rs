//! Busy indicator
//!
//! At most one stage is in flight. A trigger arriving while busy is rejected
//! without issuing a request; the in-flight stage is unaffected. The state
//! returns to idle when the [`BusyGuard`] drops, whatever the outcome.

use chrono::Utc;
use nsw_common::events::{EventBus, Stage, WorkflowEvent};
use std::sync::{Arc, Mutex};

use crate::error::{StageError, StageResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    Busy { stage: Stage, message: String },
}

impl BusyState {
    pub fn is_busy(&self) -> bool {
        matches!(self, BusyState::Busy { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BusyIndicator {
    state: Arc<Mutex<BusyState>>,
    event_bus: EventBus,
}

impl BusyIndicator {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusyState::Idle)),
            event_bus,
        }
    }

    /// Enter the busy state for `stage`, or report the stage already running
    pub fn try_acquire(&self, stage: Stage) -> StageResult<BusyGuard> {
        let message = stage.busy_message().to_string();
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if let BusyState::Busy { stage: active, .. } = &*state {
                tracing::info!(requested = %stage, active = %active, "Stage rejected while busy");
                return Err(StageError::Busy { active: *active });
            }
            *state = BusyState::Busy {
                stage,
                message: message.clone(),
            };
        }

        tracing::debug!(%stage, "Busy");
        self.event_bus.emit_lossy(WorkflowEvent::BusyChanged {
            stage: Some(stage),
            message: Some(message),
            timestamp: Utc::now(),
        });

        Ok(BusyGuard {
            state: Arc::clone(&self.state),
            event_bus: self.event_bus.clone(),
            stage,
        })
    }

    pub fn current(&self) -> BusyState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Holds the busy state; dropping it returns to idle
#[derive(Debug)]
pub struct BusyGuard {
    state: Arc<Mutex<BusyState>>,
    event_bus: EventBus,
    stage: Stage,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = BusyState::Idle;
        tracing::debug!(stage = %self.stage, "Idle");
        self.event_bus.emit_lossy(WorkflowEvent::BusyChanged {
            stage: None,
            message: None,
            timestamp: Utc::now(),
        });
    }
}
