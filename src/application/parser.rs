//! Front matter parsing and validation for markdown posts.
//!
//! A document starts with a `---` line, carries a YAML header, and closes the
//! header with another `---` line. Everything after that is the markdown body.

use std::{path::Path, sync::Arc};

use serde::Deserialize;
use thiserror::Error;
use time::Date;

use crate::application::render::{RenderError, RenderService};
use crate::domain::{
    posts::{ISO_DATE_FORMAT, Post},
    slug::derive_slug,
    text::{POST_SUMMARY_BUDGET, non_blank, normalize_labels, summarize},
};

const HEADER_MARKER: &str = "---";

/// Source text plus the identifier it was loaded from (a file name for disk sources).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub origin: String,
    pub contents: String,
}

impl RawDocument {
    pub fn new(origin: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            contents: contents.into(),
        }
    }
}

/// Header keys recognised in the front matter; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentHeader {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("document does not start with a `---` delimited header")]
    MissingHeader,
    #[error("header is missing a title")]
    MissingTitle,
    #[error("published date `{value}` is not a YYYY-MM-DD calendar date")]
    InvalidDate { value: String },
    #[error("no usable slug could be derived from `{candidate}`")]
    EmptySlug { candidate: String },
    #[error("header could not be deserialized: {message}")]
    Deserialization { message: String },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Turns raw documents into validated [`Post`] values.
#[derive(Clone)]
pub struct DocumentParser {
    renderer: Arc<dyn RenderService>,
}

impl DocumentParser {
    pub fn new(renderer: Arc<dyn RenderService>) -> Self {
        Self { renderer }
    }

    pub fn parse(&self, raw: &RawDocument) -> Result<Post, ParseError> {
        let (header_text, body) = split_header(&raw.contents)?;
        let header = deserialize_header(header_text)?;

        let title = non_blank(header.title.as_deref())
            .ok_or(ParseError::MissingTitle)?
            .to_string();

        let published_on = parse_published(header.published.as_deref())?;

        let candidate = non_blank(header.slug.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| origin_stem(&raw.origin));
        let slug = derive_slug(&candidate).map_err(|_| ParseError::EmptySlug {
            candidate: candidate.clone(),
        })?;

        let tags = header.tags.map(normalize_labels).unwrap_or_default();

        let summary = match non_blank(header.summary.as_deref()) {
            Some(explicit) => explicit.to_string(),
            None => summarize(body, POST_SUMMARY_BUDGET),
        };

        let body_html = self.renderer.render(body)?;

        Ok(Post {
            slug,
            title,
            published_on,
            summary,
            tags,
            body_markdown: body.to_string(),
            body_html,
        })
    }
}

/// Split `contents` into the header text and the body, both borrowed.
fn split_header(contents: &str) -> Result<(&str, &str), ParseError> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let mut lines = contents.split_inclusive('\n');
    let first = lines.next().ok_or(ParseError::MissingHeader)?;
    if first.trim() != HEADER_MARKER {
        return Err(ParseError::MissingHeader);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim() == HEADER_MARKER {
            let header = &contents[header_start..offset];
            let body = strip_leading_blank_lines(&contents[offset + line.len()..]);
            return Ok((header, body));
        }
        offset += line.len();
    }

    Err(ParseError::MissingHeader)
}

fn strip_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some(index) = rest.find('\n') {
        if !rest[..index].trim().is_empty() {
            break;
        }
        rest = &rest[index + 1..];
    }
    if rest.trim().is_empty() { "" } else { rest }
}

fn deserialize_header(text: &str) -> Result<DocumentHeader, ParseError> {
    if text.trim().is_empty() {
        return Ok(DocumentHeader::default());
    }

    serde_yaml::from_str(text).map_err(|err| ParseError::Deserialization {
        message: err.to_string(),
    })
}

fn parse_published(value: Option<&str>) -> Result<Date, ParseError> {
    let value = non_blank(value).ok_or_else(|| ParseError::InvalidDate {
        value: String::new(),
    })?;

    Date::parse(value, ISO_DATE_FORMAT).map_err(|_| ParseError::InvalidDate {
        value: value.to_string(),
    })
}

fn origin_stem(origin: &str) -> String {
    Path::new(origin)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
