//! Treeviz formatter for templates
//!
//! One line per node, with the nesting encoded as indentation of 2 characters
//! per level and box-drawing connectors:
//!
//! ```text
//! ├─ ¶ Dear
//! ├─ $ Name | ToUpper
//! └─ ? if Customer.IsVip
//!   └─ ✓ truthy
//!     └─ ↻ each offer in Offers
//!       └─ $ offer.Title
//! ```
//!
//! Labels are truncated to 30 characters.
//!
//! Icons
//!     Text: ¶
//!     Substitution: $
//!     Conditional: ?
//!     Repetition: ↻
//!     Truthy branch: ✓
//!     Falsy branch: ✗

use crate::ast::{Template, TemplateToken};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(template: &Template) -> String {
    let mut result = String::new();
    append_tokens(&mut result, template, "");
    result
}

fn append_tokens(result: &mut String, template: &Template, prefix: &str) {
    let tokens = template.tokens();
    for (i, token) in tokens.iter().enumerate() {
        let is_last = i == tokens.len() - 1;
        append_token(result, token, prefix, is_last);
    }
}

fn append_line(result: &mut String, prefix: &str, is_last: bool, icon: &str, label: &str) {
    let connector = if is_last { "└─" } else { "├─" };
    result.push_str(&format!(
        "{}{} {} {}\n",
        prefix,
        connector,
        icon,
        truncate(label, 30)
    ));
}

fn child_prefix(prefix: &str, is_last: bool) -> String {
    format!("{}{}", prefix, if is_last { "  " } else { "│ " })
}

fn append_token(result: &mut String, token: &TemplateToken, prefix: &str, is_last: bool) {
    match token {
        TemplateToken::Text(text) => {
            let label = text.text().replace('\n', "\\n");
            append_line(result, prefix, is_last, "¶", &label);
        }
        TemplateToken::Substitution(substitution) => {
            let label = substitution.expression().to_string();
            append_line(result, prefix, is_last, "$", &label);
        }
        TemplateToken::Conditional(conditional) => {
            let label = format!("{} {}", conditional.kind().keyword(), conditional.token());
            append_line(result, prefix, is_last, "?", &label);

            // Only populated branches are shown.
            let branches: Vec<(&str, &str, &Template)> = [
                ("✓", "truthy", conditional.truthy()),
                ("✗", "falsy", conditional.falsy()),
            ]
            .into_iter()
            .filter(|(_, _, branch)| !branch.is_empty())
            .collect();

            let prefix = child_prefix(prefix, is_last);
            for (i, (icon, name, branch)) in branches.iter().enumerate() {
                let is_last_branch = i == branches.len() - 1;
                append_line(result, &prefix, is_last_branch, icon, name);
                append_tokens(result, branch, &child_prefix(&prefix, is_last_branch));
            }
        }
        TemplateToken::Repetition(repetition) => {
            let label = format!(
                "each {} in {}",
                repetition.enumerator(),
                repetition.collection()
            );
            append_line(result, prefix, is_last, "↻", &label);
            append_tokens(result, repetition.body(), &child_prefix(prefix, is_last));
        }
    }
}
