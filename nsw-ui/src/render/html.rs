//! HTML emitter for the display tree
//!
//! Uses the review page's class vocabulary (`cluster-header`,
//! `card-candidate`, `optimized-selected`, `section-badge`) so the output
//! drops into the existing stylesheet. Every piece of candidate-supplied
//! text is escaped.

use super::tree::{CandidateCard, DisplayTree};

/// Emit `tree` as an HTML fragment
pub fn to_html(tree: &DisplayTree) -> String {
    let mut html = String::with_capacity(4096);

    match tree {
        DisplayTree::Placeholder { notice } => {
            html.push_str(&format!(
                "<div class=\"alert alert-light text-center p-5\">{}</div>\n",
                escape_html(notice)
            ));
        }
        DisplayTree::Groups { groups } => {
            for group in groups {
                html.push_str(&format!(
                    "<div class=\"cluster-header\">{}</div>\n",
                    escape_html(&group.header.label)
                ));
                for card in &group.cards {
                    push_card(&mut html, card);
                }
            }
        }
    }

    html
}

fn push_card(html: &mut String, card: &CandidateCard) {
    let modifier = if card.highlighted { " optimized-selected" } else { "" };
    html.push_str(&format!("<div class=\"card card-candidate p-3{}\">\n", modifier));

    // Badge and rating row
    html.push_str("<div class=\"d-flex justify-content-between align-items-start mb-2\">\n");
    html.push_str(&format!(
        "<span class=\"section-badge {}\">{}</span>\n",
        card.badge.class.css_class(),
        escape_html(&card.badge.label)
    ));
    html.push_str("<div class=\"rating-group\">\n");
    let group_name = escape_html(&card.rating.group_name);
    for option in &card.rating.options {
        let control_id = escape_html(&option.control_id);
        html.push_str(&format!(
            "<input class=\"form-check-input\" type=\"radio\" name=\"{}\" id=\"{}\" value=\"{}\"{}>\
             <label class=\"form-check-label small\" for=\"{}\">{}</label>\n",
            group_name,
            control_id,
            option.value,
            if option.checked { " checked" } else { "" },
            control_id,
            option.value
        ));
    }
    html.push_str("</div>\n</div>\n");

    // Scores
    html.push_str("<div class=\"d-flex gap-3 small text-muted mb-2 border-bottom pb-2\">\n");
    html.push_str(&format!("<span class=\"fw-bold text-primary\">Rel: {}</span>\n", card.relevance));
    for readout in &card.attributes {
        html.push_str(&format!(
            "<span>{}: {}</span>\n",
            escape_html(&readout.label),
            readout.value
        ));
    }
    html.push_str("</div>\n");

    html.push_str(&format!("<p class=\"card-text mb-0\">{}</p>\n", escape_html(&card.text)));
    html.push_str("</div>\n");
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
