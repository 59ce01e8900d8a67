//! Candidate rendering engine
//!
//! [`render`] is a pure function from a candidate collection to a
//! [`DisplayTree`]. Candidates are partitioned into the two fixed type groups
//! (Scene Craft first), keeping their relative order; no other sorting
//! happens. The [`html`] and [`text`] emitters turn a tree into output.

pub mod html;
pub mod text;
mod tree;

pub use tree::{
    AttributeReadout, Badge, BadgeClass, CandidateCard, CandidateGroup, DisplayTree, GroupHeader, RatingControl,
    RatingOption, MAX_ATTRIBUTE_READOUTS, PLACEHOLDER_NOTICE, RATING_POSITIONS,
};

use nsw_common::candidate::{Candidate, CandidateKind};

/// Build the display tree for `candidates`
pub fn render(candidates: &[Candidate]) -> DisplayTree {
    if candidates.is_empty() {
        return DisplayTree::default();
    }

    let groups = CandidateKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let class = BadgeClass::for_kind(kind)?;
            let cards: Vec<CandidateCard> = candidates
                .iter()
                .filter(|candidate| candidate.kind == kind)
                .map(|candidate| render_card(candidate, class))
                .collect();
            if cards.is_empty() {
                return None;
            }
            Some(CandidateGroup {
                kind,
                header: GroupHeader { label: kind.label().to_string() },
                cards,
            })
        })
        .collect();

    DisplayTree::Groups { groups }
}

fn render_card(candidate: &Candidate, class: BadgeClass) -> CandidateCard {
    let checked = candidate.user_rating.map(|rating| rating.value());
    let group_name = format!("rating-{}", candidate.id);
    let options = (1..=RATING_POSITIONS)
        .map(|value| RatingOption {
            value,
            control_id: format!("{}-{}", group_name, value),
            checked: checked == Some(value),
        })
        .collect();

    let attributes = candidate
        .display_attributes()
        .take(MAX_ATTRIBUTE_READOUTS)
        .map(|(key, value)| AttributeReadout {
            label: strip_display_key(key).to_string(),
            value: to_fixed(value, 1),
        })
        .collect();

    CandidateCard {
        id: candidate.id.clone(),
        badge: Badge {
            label: candidate.kind.label().to_string(),
            class,
        },
        rating: RatingControl { group_name, options },
        highlighted: candidate.selected,
        relevance: to_fixed(candidate.relevance, 2),
        attributes,
        text: candidate.text.clone(),
    }
}

/// Digits needed to print any finite `f64` exactly in fixed notation
const EXACT_FRACTION_DIGITS: usize = 1100;

/// Fixed-point formatting with ties rounded away from zero
///
/// `format!("{:.N}")` rounds exact ties to even, which shows 0.125 as "0.12";
/// readouts follow the browser `toFixed` convention and show "0.13". Rounding
/// works on the exact decimal expansion, so 0.35 (stored just below the tie)
/// still shows as "0.3".
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(fraction.bytes().take(decimals))
        .collect();
    let round_up = fraction.as_bytes().get(decimals).is_some_and(|d| *d >= b'5');

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| char::from(*d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| char::from(*d)));
    }
    out
}

/// Attribute key as displayed: a leading `p_`, then a leading `char_`, removed
pub fn strip_display_key(key: &str) -> &str {
    let key = key.strip_prefix("p_").unwrap_or(key);
    key.strip_prefix("char_").unwrap_or(key)
}
