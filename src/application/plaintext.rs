//! Plain-text rendition of the whole site, served at `/text` for curl users.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::{about::AboutService, error::Cancelled, hero::HeroService};
use crate::cache::{PostCache, RepoCache};
use crate::domain::{
    about::AboutContent,
    github::RepoEntry,
    hero::HeroContent,
    posts::PostSummary,
};

pub const ABOUT_WRAP_WIDTH: usize = 78;
pub const ENTRY_WRAP_WIDTH: usize = 76;
pub const MAX_BLOG_ENTRIES: usize = 3;
pub const MAX_REPO_ENTRIES: usize = 4;

const ABOUT_PLACEHOLDER: &str = "Update content/about.md to share your story.";
const BLOG_PLACEHOLDER: &str = "No posts yet. Add markdown under content/blog to publish updates.";
const GITHUB_PLACEHOLDER: &str = "No repositories configured.";
const FOOTER: &str = "Powered by ascii-site. curl /text for this view.";
const INDENT: &str = "  ";

/// Which sections to include, plus the culture used for the hero tagline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub hero: bool,
    pub navigation: bool,
    pub about: bool,
    pub blog: bool,
    pub github: bool,
    pub culture: Option<String>,
}

impl Default for DocumentRequest {
    fn default() -> Self {
        Self {
            hero: true,
            navigation: true,
            about: true,
            blog: true,
            github: true,
            culture: None,
        }
    }
}

impl DocumentRequest {
    pub fn with_culture(culture: Option<String>) -> Self {
        Self {
            culture,
            ..Self::default()
        }
    }
}

pub struct PlainTextService {
    posts: Arc<PostCache>,
    repos: Arc<RepoCache>,
    about: Arc<AboutService>,
    hero: Arc<HeroService>,
}

impl PlainTextService {
    pub fn new(
        posts: Arc<PostCache>,
        repos: Arc<RepoCache>,
        about: Arc<AboutService>,
        hero: Arc<HeroService>,
    ) -> Self {
        Self {
            posts,
            repos,
            about,
            hero,
        }
    }

    pub async fn build_document(
        &self,
        request: &DocumentRequest,
        cancel: &CancellationToken,
    ) -> Result<String, Cancelled> {
        let hero = self.hero.hero(request.culture.as_deref());

        let about = if request.about {
            Some(self.about.load(cancel).await?)
        } else {
            None
        };
        let posts = if request.blog {
            Some(self.posts.summaries(cancel).await?)
        } else {
            None
        };
        let repos = if request.github {
            Some(self.repos.entries(cancel).await?)
        } else {
            None
        };

        let mut sections = Vec::new();
        if request.hero {
            sections.push(hero_section(&hero));
        }
        if request.navigation {
            sections.push(navigation_section(&hero));
        }
        if let Some(about) = about {
            sections.push(about_section(&about));
        }
        if let Some(posts) = posts {
            sections.push(blog_section(&posts));
        }
        if let Some(repos) = repos {
            sections.push(github_section(repos.entries()));
        }
        sections.push(FOOTER.to_string());

        let mut document = sections
            .iter()
            .map(|section| section.trim_end_matches('\n'))
            .collect::<Vec<_>>()
            .join("\n\n");
        document.push('\n');
        Ok(document)
    }
}

fn hero_section(hero: &HeroContent) -> String {
    let mut out = String::new();
    for line in &hero.lines {
        out.push_str(line.trim_end_matches(['\r', '\n']));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&hero.tagline);
    out.push('\n');
    out.push_str(&format!(
        "[{}] -> {}\n",
        hero.call_to_action_text, hero.call_to_action_url
    ));
    out
}

fn navigation_section(hero: &HeroContent) -> String {
    let mut out = String::from("NAVIGATION\n");
    for link in &hero.navigation {
        out.push_str(&format!("- {} :: {}\n", link.text, link.url));
    }
    out
}

fn about_section(about: &AboutContent) -> String {
    let mut out = String::from("ABOUT\n");
    if about.is_empty() {
        out.push_str(ABOUT_PLACEHOLDER);
        out.push('\n');
        return out;
    }
    for line in wrap(&about.summary, ABOUT_WRAP_WIDTH) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn blog_section(posts: &[PostSummary]) -> String {
    let mut out = String::from("BLOG\n");
    if posts.is_empty() {
        out.push_str(BLOG_PLACEHOLDER);
        out.push('\n');
        return out;
    }
    for post in posts.iter().take(MAX_BLOG_ENTRIES) {
        out.push_str(&format!("- {} ({})\n", post.title, post.published_label()));
        push_indented(&mut out, &post.summary);
        out.push_str(&format!("{INDENT}Read: /blog/{}\n\n", post.slug));
    }
    out
}

fn github_section(entries: &[RepoEntry]) -> String {
    let mut out = String::from("GITHUB\n");
    if entries.is_empty() {
        out.push_str(GITHUB_PLACEHOLDER);
        out.push('\n');
        return out;
    }
    for entry in entries.iter().take(MAX_REPO_ENTRIES) {
        out.push_str(&format!(
            "- {} ({}, {} stars)\n",
            entry.display_name, entry.language, entry.stars
        ));
        push_indented(&mut out, &entry.description);
        if !entry.topics.is_empty() {
            out.push_str(&format!("{INDENT}Topics: {}\n", entry.topics.join(", ")));
        }
        out.push_str(&format!("{INDENT}{}\n\n", entry.url));
    }
    out
}

fn push_indented(out: &mut String, text: &str) {
    for line in wrap(text, ENTRY_WRAP_WIDTH) {
        out.push_str(INDENT);
        out.push_str(&line);
        out.push('\n');
    }
}

/// Greedy word wrap at `width` characters.
///
/// Tokens at least `width` long flush the current line and are split into
/// `width`-sized chunks. A token joins the current line only when the line,
/// its separator, the token and one more separator still fit.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();

        if token_len >= width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = token.chars().collect();
            for chunk in chars.chunks(width) {
                lines.push(chunk.iter().collect());
            }
            continue;
        }

        let separator = usize::from(!current.is_empty());
        if current_len + separator + token_len + 1 > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(token);
        current_len += token_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_token_is_chunked() {
        let lines = wrap(&"x".repeat(100), 78);
        let lengths: Vec<_> = lines.iter().map(|line| line.len()).collect();
        assert_eq!(lengths, vec![78, 22]);
    }

    #[test]
    fn tight_width_puts_each_word_on_its_own_line() {
        assert_eq!(wrap("a b c", 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(wrap("", 10).is_empty());
        assert!(wrap("   \n\t", 10).is_empty());
    }

    #[test]
    fn words_fill_lines_greedily() {
        assert_eq!(wrap("one two three four", 10), vec!["one two", "three", "four"]);
    }

    #[test]
    fn long_token_flushes_pending_line() {
        assert_eq!(wrap("ab cdefgh ij", 4), vec!["ab", "cdef", "gh", "ij"]);
    }

    #[test]
    fn github_entries_list_topics_and_url() {
        let entry = RepoEntry {
            owner: "octo".into(),
            name: "site".into(),
            display_name: "Site".into(),
            description: "Terminal friendly site".into(),
            language: "Rust".into(),
            topics: vec!["ascii".into(), "web".into()],
            stars: 7,
            last_updated: None,
            url: "https://github.com/octo/site".into(),
            is_live: false,
        };
        let section = github_section(&[entry]);
        assert_eq!(
            section,
            "GITHUB\n- Site (Rust, 7 stars)\n  Terminal friendly site\n  Topics: ascii, web\n  https://github.com/octo/site\n\n"
        );
    }

    #[test]
    fn empty_sections_use_placeholders() {
        assert_eq!(blog_section(&[]), format!("BLOG\n{BLOG_PLACEHOLDER}\n"));
        assert_eq!(github_section(&[]), format!("GITHUB\n{GITHUB_PLACEHOLDER}\n"));
        assert_eq!(
            about_section(&AboutContent::empty()),
            format!("ABOUT\n{ABOUT_PLACEHOLDER}\n")
        );
    }
}
