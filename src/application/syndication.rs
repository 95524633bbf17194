//! RSS 2.0 feed over the cached post summaries.

use std::sync::Arc;

use time::{OffsetDateTime, Time, format_description::well_known::Rfc2822};
use tokio_util::sync::CancellationToken;

use crate::application::error::Cancelled;
use crate::cache::PostCache;

pub const MAX_FEED_ITEMS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub base_url: String,
}

pub struct SyndicationService {
    posts: Arc<PostCache>,
    channel: FeedChannel,
}

impl SyndicationService {
    pub fn new(posts: Arc<PostCache>, channel: FeedChannel) -> Self {
        Self { posts, channel }
    }

    /// Generate RSS 2.0 feed XML for the newest posts.
    pub async fn rss_feed(&self, cancel: &CancellationToken) -> Result<String, Cancelled> {
        let posts = self.posts.summaries(cancel).await?;
        let base = normalize_public_site_url(&self.channel.base_url);
        let built = OffsetDateTime::now_utc();

        let mut items = String::new();
        for post in posts.iter().take(MAX_FEED_ITEMS) {
            let published = post.published_on.with_time(Time::MIDNIGHT).assume_utc();
            let link = format!("{base}blog/{}", post.slug);
            items.push_str(&format!(
                "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <pubDate>{}</pubDate>\n      <description><![CDATA[{}]]></description>\n    </item>\n",
                xml_escape(&post.title),
                xml_escape(&link),
                xml_escape(&link),
                rfc2822(published),
                cdata_safe(&post.summary),
            ));
        }

        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n    <lastBuildDate>{}</lastBuildDate>\n{}  </channel>\n</rss>\n",
            xml_escape(&self.channel.title),
            xml_escape(&base),
            xml_escape(&self.channel.description),
            rfc2822(built),
            items
        ))
    }
}

fn rfc2822(value: OffsetDateTime) -> String {
    value.format(&Rfc2822).unwrap_or_else(|_| value.to_string())
}

fn normalize_public_site_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    format!("{trimmed}/")
}

/// A literal `]]>` would end the CDATA section early.
fn cdata_safe(input: &str) -> String {
    input.replace("]]>", "]]]]><![CDATA[>")
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::{parser::DocumentParser, render::render_service};
    use crate::infra::content::InMemoryDocumentSource;

    fn post(day: u32, title: &str) -> String {
        format!("---\ntitle: \"{title}\"\npublished: 2024-01-{day:02}\n---\nBody for {title}.\n")
    }

    fn service(documents: Vec<(String, String)>) -> SyndicationService {
        let source = Arc::new(InMemoryDocumentSource::with_documents(documents));
        let cache = Arc::new(PostCache::new(source, DocumentParser::new(render_service())));
        SyndicationService::new(
            cache,
            FeedChannel {
                title: "Notes & Logs".into(),
                description: "Plain text".into(),
                base_url: "https://example.com/".into(),
            },
        )
    }

    #[tokio::test]
    async fn feed_is_capped_and_escaped() {
        let documents = (1..=25)
            .map(|day| (format!("post-{day}.md"), post(day, &format!("Post <{day}>"))))
            .collect();
        let xml = service(documents)
            .rss_feed(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(xml.matches("<item>").count(), MAX_FEED_ITEMS);
        assert!(xml.contains("<title>Notes &amp; Logs</title>"));
        assert!(xml.contains("<title>Post &lt;25&gt;</title>"));
        assert!(!xml.contains("<title>Post &lt;1&gt;</title>"));
        assert!(xml.contains("<link>https://example.com/blog/post-25</link>"));
        assert!(xml.contains("<pubDate>Thu, 25 Jan 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<lastBuildDate>"));
    }

    #[test]
    fn cdata_terminator_is_split() {
        assert_eq!(cdata_safe("a]]>b"), "a]]]]><![CDATA[>b");
    }
}
