//! Candidate model
//!
//! A candidate is one generated text block with backend-assigned scores and an
//! optional reviewer rating. The backend is authoritative for every field; the
//! controller only decodes, displays and replaces whole collections.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{Error, Result};

/// Keys that never appear in the attribute readout, even when the backend
/// mirrors them into the attribute map.
pub const RESERVED_ATTRIBUTE_KEYS: [&str; 6] =
    ["id", "text", "type", "relevance", "selected", "user_rating"];

/// Opaque candidate identifier, echoed back verbatim in rating submissions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Number(n) => write!(f, "{}", n),
            CandidateId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CandidateId {
    fn from(value: i64) -> Self {
        CandidateId::Number(value)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        CandidateId::Text(value.to_string())
    }
}

/// Candidate family
///
/// Grouping and badge styling key off the two known families. Any other wire
/// value decodes as [`CandidateKind::Unknown`] so the rest of a batch survives;
/// such candidates are never grouped for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    SceneCraft,
    CharacterDynamics,
    Unknown,
}

impl CandidateKind {
    /// Display order of the type groups
    pub const ALL: [CandidateKind; 2] = [CandidateKind::SceneCraft, CandidateKind::CharacterDynamics];

    /// Human-readable family name (also the wire value of the known families)
    pub fn label(self) -> &'static str {
        match self {
            CandidateKind::SceneCraft => "Scene Craft",
            CandidateKind::CharacterDynamics => "Character Dynamics",
            CandidateKind::Unknown => "Unknown",
        }
    }

    /// Exact-match lookup of a wire value
    pub fn from_wire(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == value)
            .unwrap_or(CandidateKind::Unknown)
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CandidateKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for CandidateKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CandidateKind::from_wire(&raw))
    }
}

/// Reviewer preference rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered attribute scores
///
/// Entries keep the order in which the backend wrote them; display truncation
/// depends on it, so this is a list rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, f64)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a score; a new key goes to the end
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to numeric scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Attributes, A::Error> {
                let mut attributes = Attributes(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((key, value)) = access.next_entry::<String, f64>()? {
                    attributes.insert(key, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

/// One generated text block under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(rename = "type")]
    pub kind: CandidateKind,
    pub text: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub relevance: f64,
    /// Set by the backend optimizer: "currently recommended"
    #[serde(default)]
    pub selected: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_user_rating",
        serialize_with = "serialize_user_rating"
    )]
    pub user_rating: Option<Rating>,
}

impl Candidate {
    /// Attribute entries eligible for display, in source order
    pub fn display_attributes(&self) -> impl Iterator<Item = (&str, f64)> {
        self.attributes
            .iter()
            .filter(|(key, _)| !RESERVED_ATTRIBUTE_KEYS.contains(key))
    }
}

// The backend writes 0 for "unrated"; anything outside 1..=5 decodes as absent.
fn deserialize_user_rating<'de, D>(deserializer: D) -> std::result::Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<f64> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        if value.fract() == 0.0 && value >= f64::from(Rating::MIN) && value <= f64::from(Rating::MAX) {
            Rating::new(value as u8).ok()
        } else {
            None
        }
    }))
}

fn serialize_user_rating<S>(rating: &Option<Rating>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(rating.map(Rating::value).unwrap_or(0))
}
