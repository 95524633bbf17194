use std::collections::HashSet;

use ammonia::{Builder as AmmoniaBuilder, UrlRelative};
use comrak::options::{ListStyleType, Options};

/// Tags a post or the about page may produce after markdown rendering.
const ALLOWED_TAGS: &[&str] = &[
    "a", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "img", "input", "li", "ol", "p", "pre", "section", "strong", "sup", "table", "tbody", "td",
    "th", "thead", "tr", "ul",
];

const GENERIC_ATTRIBUTES: &[&str] = &[
    "id",
    "data-footnote-ref",
    "data-footnotes",
    "data-footnote-backref",
];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("img", &["alt", "title"]),
    ("code", &["class"]),
    ("pre", &["lang"]),
    ("th", &["align"]),
    ("td", &["align"]),
    ("input", &["type", "checked", "disabled"]),
    ("li", &["class"]),
    ("ul", &["class"]),
];

/// GFM with raw HTML passed through; the sanitizer owns filtering.
pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.footnotes = true;

    options.render.github_pre_lang = true;
    options.render.tasklist_classes = true;
    options.render.list_style = ListStyleType::Dash;
    options.render.r#unsafe = true;

    options
}

pub(crate) fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>())
        .generic_attributes(GENERIC_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some("noopener noreferrer"));
    for (tag, attributes) in TAG_ATTRIBUTES {
        builder.add_tag_attributes(*tag, attributes.iter().copied());
    }
    builder
}
