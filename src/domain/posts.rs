use std::cmp::Ordering;

use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

use super::text::compare_ignore_case;

pub const ISO_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A parsed, validated blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    #[serde(with = "iso_date")]
    pub published_on: Date,
    pub summary: String,
    pub tags: Vec<String>,
    pub body_markdown: String,
    pub body_html: String,
}

/// Listing projection of [`Post`] without body fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    #[serde(with = "iso_date")]
    pub published_on: Date,
    pub summary: String,
    pub tags: Vec<String>,
}

impl Post {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            published_on: self.published_on,
            summary: self.summary.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl PostSummary {
    pub fn published_label(&self) -> String {
        self.published_on
            .format(ISO_DATE_FORMAT)
            .unwrap_or_else(|_| self.published_on.to_string())
    }
}

/// Newest first; ties ordered by title, ignoring case.
pub fn listing_order(left: &Post, right: &Post) -> Ordering {
    right
        .published_on
        .cmp(&left.published_on)
        .then_with(|| compare_ignore_case(&left.title, &right.title))
}
