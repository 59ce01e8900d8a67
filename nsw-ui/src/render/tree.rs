//! Display tree types
//!
//! Plain values describing what a reviewer sees. Emitters (HTML, terminal)
//! walk the tree; nothing here knows about output formats.

use nsw_common::candidate::{CandidateId, CandidateKind};
use serde::Serialize;

/// Notice shown when there is nothing to review
pub const PLACEHOLDER_NOTICE: &str = "No candidates yet. Generate candidates to start reviewing.";

/// Maximum attribute readouts per card
pub const MAX_ATTRIBUTE_READOUTS: usize = 3;

/// Number of rating positions per card (1..=5)
pub const RATING_POSITIONS: u8 = 5;

/// Rendered candidate collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayTree {
    /// Empty collection
    Placeholder { notice: String },
    /// One group per type present, in fixed order
    Groups { groups: Vec<CandidateGroup> },
}

impl Default for DisplayTree {
    fn default() -> Self {
        DisplayTree::Placeholder {
            notice: PLACEHOLDER_NOTICE.to_string(),
        }
    }
}

impl DisplayTree {
    pub fn groups(&self) -> &[CandidateGroup] {
        match self {
            DisplayTree::Placeholder { .. } => &[],
            DisplayTree::Groups { groups } => groups,
        }
    }

    pub fn header_count(&self) -> usize {
        self.groups().len()
    }

    pub fn placeholder_count(&self) -> usize {
        match self {
            DisplayTree::Placeholder { .. } => 1,
            DisplayTree::Groups { .. } => 0,
        }
    }

    /// All cards in display order
    pub fn cards(&self) -> impl Iterator<Item = &CandidateCard> {
        self.groups().iter().flat_map(|group| group.cards.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateGroup {
    pub kind: CandidateKind,
    pub header: GroupHeader,
    pub cards: Vec<CandidateCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupHeader {
    pub label: String,
}

/// Badge styling, one per candidate family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeClass {
    Scene,
    Character,
}

impl BadgeClass {
    /// Badge for a displayable family; `None` for unrecognized kinds
    pub fn for_kind(kind: CandidateKind) -> Option<Self> {
        match kind {
            CandidateKind::SceneCraft => Some(BadgeClass::Scene),
            CandidateKind::CharacterDynamics => Some(BadgeClass::Character),
            CandidateKind::Unknown => None,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            BadgeClass::Scene => "badge-scene",
            BadgeClass::Character => "badge-char",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub class: BadgeClass,
}

/// Five radio positions sharing one group name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingControl {
    pub group_name: String,
    pub options: Vec<RatingOption>,
}

impl RatingControl {
    /// Value of the pre-checked position, if any
    pub fn checked_value(&self) -> Option<u8> {
        self.options.iter().find(|option| option.checked).map(|option| option.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingOption {
    pub value: u8,
    pub control_id: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeReadout {
    /// Key with display prefixes stripped
    pub label: String,
    /// Score formatted with one decimal
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateCard {
    pub id: CandidateId,
    pub badge: Badge,
    pub rating: RatingControl,
    /// Backend recommends this candidate
    pub highlighted: bool,
    /// Relevance formatted with two decimals
    pub relevance: String,
    pub attributes: Vec<AttributeReadout>,
    pub text: String,
}
