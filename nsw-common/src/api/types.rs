//! Request and response bodies
//!
//! Field names match the backend's JSON keys exactly.

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateId, Rating};
use crate::params::ParameterSet;

/// Body of the three candidate stages (generate, optimize, BBO step)
///
/// Carries the shared reviewer credentials, the topic fields and the full
/// parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRequest {
    /// Generative-model API key
    pub gemini_key: String,
    /// Optimization solver token
    pub amplify_token: String,
    /// Primary topic (required for generation)
    pub topic_main: String,
    pub topic_sub1: String,
    pub topic_sub2: String,
    pub params: ParameterSet,
}

/// Empty JSON object body (`{}`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyRequest {}

/// Single rating edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRequest {
    pub id: CandidateId,
    pub rating: Rating,
}

/// Reviewer's edited draft plus the extra instruction for the final pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEditRequest {
    pub article: String,
    pub instruction: String,
}

/// Candidate collection returned by generate, optimize and BBO step
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateBatch {
    pub candidates: Vec<Candidate>,
    /// Only present on BBO step responses
    #[serde(default)]
    pub history_count: Option<u64>,
}

/// Draft stage result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DraftPayload {
    pub summary: String,
    pub article: String,
}

/// Final stage result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FinalPayload {
    pub final_text: String,
}

/// Success acknowledgement with no payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {}
