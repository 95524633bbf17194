//! Small text helpers shared by posts, repository cards and the about page.

use std::{cmp::Ordering, collections::BTreeSet};

/// Character budget for post summaries derived from the body.
pub const POST_SUMMARY_BUDGET: usize = 280;
/// Character budget for the about page summary.
pub const ABOUT_SUMMARY_BUDGET: usize = 240;

const ELLIPSIS: &str = "...";

/// Case-insensitive ordinal comparison.
pub fn compare_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

/// Normalise a label list: trim, lower-case, drop blanks, dedupe, sort.
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| {
            let trimmed = label.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Returns the trimmed value when it carries any non-whitespace content.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// First non-blank paragraph of `text` with whitespace collapsed, cut to `budget` characters.
pub fn summarize(text: &str, budget: usize) -> String {
    let paragraph = first_paragraph(text);
    truncate_with_ellipsis(&paragraph, budget)
}

fn first_paragraph(text: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if words.is_empty() {
                continue;
            }
            break;
        }
        words.extend(line.split_whitespace());
    }
    words.join(" ")
}

fn truncate_with_ellipsis(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let cut: String = text.chars().take(budget).collect();
    format!("{}{ELLIPSIS}", cut.trim_end())
}
