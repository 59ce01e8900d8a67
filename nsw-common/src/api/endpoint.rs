//! Backend endpoint identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path prefix shared by every backend endpoint
pub const API_PREFIX: &str = "/api";

/// One backend endpoint consumed by the controller (all JSON over POST)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    GenerateCandidates,
    Optimize,
    BboStep,
    BboReset,
    UpdateRating,
    GenerateDraft,
    SaveDraftEdit,
    GenerateFinal,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::GenerateCandidates,
        Endpoint::Optimize,
        Endpoint::BboStep,
        Endpoint::BboReset,
        Endpoint::UpdateRating,
        Endpoint::GenerateDraft,
        Endpoint::SaveDraftEdit,
        Endpoint::GenerateFinal,
    ];

    /// Endpoint name as it appears in the URL
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::GenerateCandidates => "generate_candidates",
            Endpoint::Optimize => "optimize",
            Endpoint::BboStep => "bbo_step",
            Endpoint::BboReset => "bbo_reset",
            Endpoint::UpdateRating => "update_rating",
            Endpoint::GenerateDraft => "generate_draft",
            Endpoint::SaveDraftEdit => "save_draft_edit",
            Endpoint::GenerateFinal => "generate_final",
        }
    }

    /// Absolute path below the backend base URL, e.g. `/api/bbo_step`
    pub fn path(self) -> String {
        format!("{}/{}", API_PREFIX, self.name())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
