//! Draft pipeline stages
//!
//! generate_draft → (reviewer edits the article) → generate_final. The final
//! stage first persists the edited article and instruction; that call is
//! best effort and never gates generation.

use chrono::Utc;
use nsw_common::api::{Ack, DraftEditRequest, DraftPayload, EmptyRequest, Endpoint, FinalPayload};
use nsw_common::events::{NoticeLevel, Stage, WorkflowEvent, WorkflowStep};
use nsw_common::Error;
use std::path::Path;

use super::{DraftFields, WorkflowOrchestrator};
use crate::error::{StageError, StageResult};

impl WorkflowOrchestrator {
    /// Request a draft summary and article
    pub async fn generate_draft(&self) -> StageResult<()> {
        let outcome = self.generate_draft_inner().await;
        self.report(Stage::GenerateDraft, outcome)
    }

    async fn generate_draft_inner(&self) -> StageResult<()> {
        let _busy = self.busy.try_acquire(Stage::GenerateDraft)?;

        let payload: DraftPayload = self.gateway.call(Endpoint::GenerateDraft, &EmptyRequest {}).await?;
        let summary_chars = payload.summary.chars().count();
        let article_chars = payload.article.chars().count();
        {
            let mut session = self.session.write().await;
            session.draft.summary = payload.summary;
            session.draft.article = payload.article;
        }

        tracing::info!(summary_chars, article_chars, "Draft generated");
        self.event_bus.emit_lossy(WorkflowEvent::DraftUpdated {
            summary_chars,
            article_chars,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(WorkflowEvent::LayoutInvalidated { timestamp: Utc::now() });
        self.enter_step(WorkflowStep::Draft).await;
        Ok(())
    }

    /// Persist the reviewer's edit, then request the final text
    ///
    /// Both phases run under one busy period.
    pub async fn generate_final(&self) -> StageResult<()> {
        let outcome = self.generate_final_inner().await;
        self.report(Stage::GenerateFinal, outcome)
    }

    async fn generate_final_inner(&self) -> StageResult<()> {
        let _busy = self.busy.try_acquire(Stage::GenerateFinal)?;

        // Phase 1: persist edit (result ignored)
        let edit = {
            let session = self.session.read().await;
            DraftEditRequest {
                article: session.draft.article.clone(),
                instruction: session.draft.instruction.clone(),
            }
        };
        if let Err(e) = self.gateway.call::<_, Ack>(Endpoint::SaveDraftEdit, &edit).await {
            tracing::warn!(error = %e, "Saving draft edit failed, continuing with final generation");
        }

        // Phase 2: final text
        let payload: FinalPayload = self.gateway.call(Endpoint::GenerateFinal, &EmptyRequest {}).await?;
        let chars = payload.final_text.chars().count();
        self.session.write().await.draft.final_text = payload.final_text;

        tracing::info!(chars, "Final text generated");
        self.event_bus.emit_lossy(WorkflowEvent::FinalTextUpdated {
            chars,
            timestamp: Utc::now(),
        });
        self.event_bus.emit_lossy(WorkflowEvent::LayoutInvalidated { timestamp: Utc::now() });
        Ok(())
    }

    /// Replace the reviewer-edited draft article
    pub async fn set_draft_article(&self, article: impl Into<String>) {
        self.session.write().await.draft.article = article.into();
    }

    /// Set the extra instruction sent with the edit
    pub async fn set_instruction(&self, instruction: impl Into<String>) {
        self.session.write().await.draft.instruction = instruction.into();
    }

    pub async fn draft(&self) -> DraftFields {
        self.session.read().await.draft.clone()
    }

    /// Write the final text to `path` as UTF-8
    pub async fn export_final(&self, path: &Path) -> StageResult<usize> {
        let final_text = self.session.read().await.draft.final_text.clone();
        if final_text.trim().is_empty() {
            return Err(Error::InvalidInput("There is no final text to export yet.".to_string()).into());
        }

        tokio::fs::write(path, final_text.as_bytes()).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Export failed");
            StageError::from(Error::Io(e))
        })?;

        tracing::info!(path = %path.display(), bytes = final_text.len(), "Final text exported");
        self.event_bus.emit_lossy(WorkflowEvent::notice(
            NoticeLevel::Info,
            format!("Final text saved to {}", path.display()),
        ));
        Ok(final_text.len())
    }
}
