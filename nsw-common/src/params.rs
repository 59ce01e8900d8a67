//! Generation parameter set
//!
//! Eleven slider dimensions (six Scene Craft, five Character Dynamics) plus a
//! target length. Sliders are floats in [0.0, 1.0]; length is an integer
//! character count. Field names are the wire keys the backend expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Which part of the form a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFamily {
    SceneCraft,
    CharacterDynamics,
    Common,
}

impl ParameterFamily {
    pub fn label(self) -> &'static str {
        match self {
            ParameterFamily::SceneCraft => "Scene Craft",
            ParameterFamily::CharacterDynamics => "Character Dynamics",
            ParameterFamily::Common => "Common",
        }
    }
}

/// Identifies one parameter of the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    DescStyle,
    Perspective,
    Sensory,
    Thought,
    Tension,
    Reality,
    CharCount,
    CharMental,
    CharBelief,
    CharTrauma,
    CharVoice,
    Length,
}

impl ParameterKey {
    /// Form order
    pub const ALL: [ParameterKey; 12] = [
        ParameterKey::DescStyle,
        ParameterKey::Perspective,
        ParameterKey::Sensory,
        ParameterKey::Thought,
        ParameterKey::Tension,
        ParameterKey::Reality,
        ParameterKey::CharCount,
        ParameterKey::CharMental,
        ParameterKey::CharBelief,
        ParameterKey::CharTrauma,
        ParameterKey::CharVoice,
        ParameterKey::Length,
    ];

    pub fn wire_key(self) -> &'static str {
        match self {
            ParameterKey::DescStyle => "p_desc_style",
            ParameterKey::Perspective => "p_perspective",
            ParameterKey::Sensory => "p_sensory",
            ParameterKey::Thought => "p_thought",
            ParameterKey::Tension => "p_tension",
            ParameterKey::Reality => "p_reality",
            ParameterKey::CharCount => "p_char_count",
            ParameterKey::CharMental => "p_char_mental",
            ParameterKey::CharBelief => "p_char_belief",
            ParameterKey::CharTrauma => "p_char_trauma",
            ParameterKey::CharVoice => "p_char_voice",
            ParameterKey::Length => "length",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParameterKey::DescStyle => "Description style (expository - descriptive)",
            ParameterKey::Perspective => "Perspective (observer - participant)",
            ParameterKey::Sensory => "Non-visual sensory detail",
            ParameterKey::Thought => "Disclosure of thought",
            ParameterKey::Tension => "Dialogue tension",
            ParameterKey::Reality => "Setting (realistic - fantastical)",
            ParameterKey::CharCount => "Number of characters",
            ParameterKey::CharMental => "Mental state",
            ParameterKey::CharBelief => "Belief",
            ParameterKey::CharTrauma => "Past trauma",
            ParameterKey::CharVoice => "Voice quirks",
            ParameterKey::Length => "Target length (characters)",
        }
    }

    pub fn family(self) -> ParameterFamily {
        match self {
            ParameterKey::DescStyle
            | ParameterKey::Perspective
            | ParameterKey::Sensory
            | ParameterKey::Thought
            | ParameterKey::Tension
            | ParameterKey::Reality => ParameterFamily::SceneCraft,
            ParameterKey::CharCount
            | ParameterKey::CharMental
            | ParameterKey::CharBelief
            | ParameterKey::CharTrauma
            | ParameterKey::CharVoice => ParameterFamily::CharacterDynamics,
            ParameterKey::Length => ParameterFamily::Common,
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

impl FromStr for ParameterKey {
    type Err = Error;

    /// Accepts the wire key with or without the `p_` prefix
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ParameterKey::ALL
            .into_iter()
            .find(|key| {
                let wire = key.wire_key();
                wire == wanted || wire.strip_prefix("p_") == Some(wanted)
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown parameter: {}", s)))
    }
}

/// Complete parameter payload sent with every candidate stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    // Scene Craft
    pub p_desc_style: f64,
    pub p_perspective: f64,
    pub p_sensory: f64,
    pub p_thought: f64,
    pub p_tension: f64,
    pub p_reality: f64,
    // Character Dynamics
    pub p_char_count: f64,
    pub p_char_mental: f64,
    pub p_char_belief: f64,
    pub p_char_trauma: f64,
    pub p_char_voice: f64,
    // Common
    pub length: u32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            p_desc_style: 0.5,
            p_perspective: 0.5,
            p_sensory: 0.5,
            p_thought: 0.5,
            p_tension: 0.5,
            p_reality: 0.5,
            // roughly one character
            p_char_count: 0.2,
            p_char_mental: 0.5,
            p_char_belief: 0.5,
            p_char_trauma: 0.0,
            p_char_voice: 0.5,
            length: 500,
        }
    }
}

impl ParameterSet {
    pub const SLIDER_MIN: f64 = 0.0;
    pub const SLIDER_MAX: f64 = 1.0;

    /// Read a parameter as a float (length is widened)
    pub fn get(&self, key: ParameterKey) -> f64 {
        match self.slider_ref(key) {
            Some(value) => *value,
            None => f64::from(self.length),
        }
    }

    /// Set a parameter, clamping sliders to [0, 1] and length to at least 1
    pub fn set(&mut self, key: ParameterKey, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidInput(format!("{} must be a finite number", key)));
        }
        match self.slider_mut(key) {
            Some(slot) => {
                let clamped = value.clamp(Self::SLIDER_MIN, Self::SLIDER_MAX);
                if clamped != value {
                    tracing::debug!(parameter = %key, value, clamped, "Slider value clamped");
                }
                *slot = clamped;
            }
            None => {
                self.length = value.round().clamp(1.0, f64::from(u32::MAX)) as u32;
            }
        }
        Ok(())
    }

    /// Parse `value` and assign it to the parameter named `key`
    ///
    /// Length is parsed as an integer, sliders as floats.
    pub fn set_from_str(&mut self, key: &str, value: &str) -> Result<ParameterKey> {
        let key: ParameterKey = key.parse()?;
        let parsed = match key {
            ParameterKey::Length => value
                .trim()
                .parse::<i64>()
                .map(|v| v as f64)
                .map_err(|e| Error::InvalidInput(format!("length must be an integer: {}", e)))?,
            _ => value
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::InvalidInput(format!("{} must be a number: {}", key, e)))?,
        };
        self.set(key, parsed)?;
        Ok(key)
    }

    fn slider_ref(&self, key: ParameterKey) -> Option<&f64> {
        let slot = match key {
            ParameterKey::DescStyle => &self.p_desc_style,
            ParameterKey::Perspective => &self.p_perspective,
            ParameterKey::Sensory => &self.p_sensory,
            ParameterKey::Thought => &self.p_thought,
            ParameterKey::Tension => &self.p_tension,
            ParameterKey::Reality => &self.p_reality,
            ParameterKey::CharCount => &self.p_char_count,
            ParameterKey::CharMental => &self.p_char_mental,
            ParameterKey::CharBelief => &self.p_char_belief,
            ParameterKey::CharTrauma => &self.p_char_trauma,
            ParameterKey::CharVoice => &self.p_char_voice,
            ParameterKey::Length => return None,
        };
        Some(slot)
    }

    fn slider_mut(&mut self, key: ParameterKey) -> Option<&mut f64> {
        let slot = match key {
            ParameterKey::DescStyle => &mut self.p_desc_style,
            ParameterKey::Perspective => &mut self.p_perspective,
            ParameterKey::Sensory => &mut self.p_sensory,
            ParameterKey::Thought => &mut self.p_thought,
            ParameterKey::Tension => &mut self.p_tension,
            ParameterKey::Reality => &mut self.p_reality,
            ParameterKey::CharCount => &mut self.p_char_count,
            ParameterKey::CharMental => &mut self.p_char_mental,
            ParameterKey::CharBelief => &mut self.p_char_belief,
            ParameterKey::CharTrauma => &mut self.p_char_trauma,
            ParameterKey::CharVoice => &mut self.p_char_voice,
            ParameterKey::Length => return None,
        };
        Some(slot)
    }
}
