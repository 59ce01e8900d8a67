//! Workflow session state
//!
//! Process-scoped state owned by the orchestrator: the reviewer form, the
//! current candidate snapshot and its rendering, the history counter, the
//! active step and the draft pipeline fields.

use chrono::{DateTime, Utc};
use nsw_common::api::StageRequest;
use nsw_common::candidate::Candidate;
use nsw_common::config::FormConfig;
use nsw_common::events::WorkflowStep;
use nsw_common::params::ParameterSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{StageError, StageResult};
use crate::render::{render, DisplayTree};

/// Message shown when generation is triggered without the required fields
pub const MISSING_GENERATION_INPUT: &str = "API key and primary topic are required.";

/// History counter display text
pub fn history_label(count: u64) -> String {
    format!("Training samples: {}", count)
}

/// Credentials, topics and parameters sent with every candidate stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewForm {
    pub gemini_key: String,
    pub amplify_token: String,
    pub topic_main: String,
    pub topic_sub1: String,
    pub topic_sub2: String,
    pub params: ParameterSet,
}

impl From<FormConfig> for ReviewForm {
    fn from(config: FormConfig) -> Self {
        Self {
            gemini_key: config.gemini_key,
            amplify_token: config.amplify_token,
            topic_main: config.topic_main,
            topic_sub1: config.topic_sub1,
            topic_sub2: config.topic_sub2,
            params: config.params,
        }
    }
}

impl ReviewForm {
    /// Request body for generate, optimize and BBO step
    pub fn stage_request(&self) -> StageRequest {
        StageRequest {
            gemini_key: self.gemini_key.clone(),
            amplify_token: self.amplify_token.clone(),
            topic_main: self.topic_main.clone(),
            topic_sub1: self.topic_sub1.clone(),
            topic_sub2: self.topic_sub2.clone(),
            params: self.params.clone(),
        }
    }

    /// Whitespace-only counts as empty
    pub fn validate_for_generation(&self) -> StageResult<()> {
        if self.gemini_key.trim().is_empty() || self.topic_main.trim().is_empty() {
            return Err(StageError::Validation(MISSING_GENERATION_INPUT.to_string()));
        }
        Ok(())
    }

    /// Assign a text field or parameter by name
    ///
    /// Text fields: `gemini_key`, `amplify_token`, `topic_main`, `topic_sub1`,
    /// `topic_sub2`. Anything else is looked up as a parameter.
    pub fn set_field(&mut self, name: &str, value: &str) -> StageResult<()> {
        let slot = match name {
            "gemini_key" => &mut self.gemini_key,
            "amplify_token" => &mut self.amplify_token,
            "topic_main" => &mut self.topic_main,
            "topic_sub1" => &mut self.topic_sub1,
            "topic_sub2" => &mut self.topic_sub2,
            _ => {
                self.params.set_from_str(name, value)?;
                return Ok(());
            }
        };
        *slot = value.to_string();
        Ok(())
    }
}

/// Draft pipeline text fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub summary: String,
    /// Reviewer-editable
    pub article: String,
    /// Extra instruction for the final pass
    pub instruction: String,
    pub final_text: String,
}

#[derive(Debug, Clone)]
pub struct WorkflowSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub form: ReviewForm,
    pub candidates: Arc<[Candidate]>,
    pub display: Arc<DisplayTree>,
    pub history_count: u64,
    pub step: WorkflowStep,
    pub draft: DraftFields,
}

impl WorkflowSession {
    pub fn new(form: ReviewForm) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            form,
            candidates: Arc::from(Vec::new()),
            display: Arc::new(DisplayTree::default()),
            history_count: 0,
            step: WorkflowStep::default(),
            draft: DraftFields::default(),
        }
    }

    /// Swap in a new candidate snapshot and its rendering
    pub fn replace_candidates(&mut self, candidates: Vec<Candidate>) {
        let display = render(&candidates);
        self.candidates = Arc::from(candidates);
        self.display = Arc::new(display);
    }

    pub fn selected_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.selected).count()
    }
}
