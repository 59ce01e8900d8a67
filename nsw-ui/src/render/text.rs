//! Plain-text emitter used by the console

use std::fmt::Write;

use super::tree::DisplayTree;

/// Emit `tree` for a terminal
///
/// Highlighted cards are prefixed with `*`; the checked rating position is
/// shown in brackets.
pub fn to_text(tree: &DisplayTree) -> String {
    let mut out = String::new();

    if let DisplayTree::Placeholder { notice } = tree {
        out.push_str(notice);
        out.push('\n');
        return out;
    }

    for group in tree.groups() {
        let _ = writeln!(out, "== {} ({}) ==", group.header.label, group.cards.len());
        for card in &group.cards {
            let marker = if card.highlighted { '*' } else { ' ' };
            let positions: Vec<String> = card
                .rating
                .options
                .iter()
                .map(|option| {
                    if option.checked {
                        format!("[{}]", option.value)
                    } else {
                        format!(" {} ", option.value)
                    }
                })
                .collect();
            let _ = write!(out, "{} #{} [{}] rel {}", marker, card.id, card.badge.label, card.relevance);
            for readout in &card.attributes {
                let _ = write!(out, "  {}: {}", readout.label, readout.value);
            }
            let _ = writeln!(out, "  rating:{}", positions.join(""));
            for line in card.text.lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
    }

    out
}
