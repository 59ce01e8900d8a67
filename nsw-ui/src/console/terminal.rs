//! Terminal output for workflow events

use nsw_common::events::{EventBus, NoticeLevel, WorkflowEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// One-line description of an event, or None for events the console ignores
pub fn describe(event: &WorkflowEvent) -> Option<String> {
    let line = match event {
        WorkflowEvent::BusyChanged { message: Some(message), .. } => format!("... {}", message),
        WorkflowEvent::BusyChanged { message: None, .. } => return None,
        WorkflowEvent::CandidatesReplaced { stage, total, selected, .. } => {
            format!("[{}] {} candidates ({} recommended). Type 'show' to review.", stage, total, selected)
        }
        WorkflowEvent::HistoryCountChanged { label, .. } => label.clone(),
        WorkflowEvent::StepChanged { step, .. } => format!("Step: {:?}", step),
        WorkflowEvent::DraftUpdated { summary_chars, article_chars, .. } => format!(
            "Draft ready: summary {} chars, article {} chars. Type 'status' for details.",
            summary_chars, article_chars
        ),
        WorkflowEvent::FinalTextUpdated { chars, .. } => {
            format!("Final article ready ({} chars). Type 'export' to save it.", chars)
        }
        WorkflowEvent::LayoutInvalidated { .. } => return None,
        WorkflowEvent::ReviewerNotice { level: NoticeLevel::Info, message, .. } => message.clone(),
        WorkflowEvent::ReviewerNotice { level: NoticeLevel::Error, message, .. } => format!("! {}", message),
        WorkflowEvent::RatingSubmitted { candidate_id, rating, .. } => {
            format!("Rated #{}: {}", candidate_id, rating)
        }
        WorkflowEvent::RatingFailed { candidate_id, rating, reason, .. } => {
            format!("! Rating #{} = {} was not saved: {}", candidate_id, rating, reason)
        }
    };
    Some(line)
}

/// Print events until the bus closes
pub fn spawn_event_printer(event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
