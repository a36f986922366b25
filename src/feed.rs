//! Channel feed fetching and parsing
//!
//! Each subscribed channel publishes a syndication feed of its latest uploads at
//! `/feeds/videos.xml?channel_id=<id>`. This module fetches that feed and reduces
//! it to the three attributes the filter needs: title, publish time and link.
//! Both RSS 2.0 and Atom documents are accepted.

use crate::config::FeedConfig;
use crate::error::{Error, FeedError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

/// Path of the per-channel feed on the feed host
const FEED_PATH: &str = "/feeds/videos.xml";

/// An item from a channel feed
#[derive(Clone, Debug, PartialEq)]
pub struct FeedItem {
    /// Item title
    pub title: String,

    /// Publication time (Atom `published`, falling back to `updated`; RSS `pubDate`)
    pub published: Option<DateTime<Utc>>,

    /// Canonical link to the item
    pub link: Option<String>,
}

/// Fetches channel feeds over HTTP
#[derive(Clone, Debug)]
pub struct FeedClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl FeedClient {
    /// Create a feed client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is invalid, or [`Error::Other`] if
    /// the HTTP client cannot be created.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid feed base URL '{}': {}", config.base_url, e),
            key: Some("feed.base_url".to_string()),
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Feed URL for a channel
    pub fn feed_url(&self, channel_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(FEED_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("channel_id", channel_id);
        url
    }

    /// Fetch and parse the feed of a channel
    ///
    /// Items are returned in feed order.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] if the request fails or times out
    /// - [`FeedError::Http`] if the server answers with a non-success status
    /// - [`FeedError::Parse`] if the body is neither RSS nor Atom
    pub async fn fetch(&self, channel_id: &str) -> Result<Vec<FeedItem>> {
        let url = self.feed_url(channel_id);
        debug!(url = %url, "fetching feed");

        let response = self.http_client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let content = response.text().await?;
        parse_feed(&content).map_err(|reason| {
            FeedError::Parse {
                url: url.to_string(),
                reason,
            }
            .into()
        })
    }
}

/// Parse feed content, trying RSS first and then Atom
///
/// On failure, returns both parser messages.
pub fn parse_feed(content: &str) -> std::result::Result<Vec<FeedItem>, String> {
    match parse_as_rss(content) {
        Ok(items) => {
            debug!("Successfully parsed as RSS, found {} items", items.len());
            Ok(items)
        }
        Err(rss_err) => {
            debug!("Failed to parse as RSS: {}, trying Atom", rss_err);
            match parse_as_atom(content) {
                Ok(items) => {
                    debug!("Successfully parsed as Atom, found {} items", items.len());
                    Ok(items)
                }
                Err(atom_err) => Err(format!(
                    "not RSS ({}) and not Atom ({})",
                    rss_err, atom_err
                )),
            }
        }
    }
}

fn parse_as_rss(content: &str) -> std::result::Result<Vec<FeedItem>, String> {
    let channel = content
        .parse::<rss::Channel>()
        .map_err(|e| e.to_string())?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or("").to_string(),
            published: item.pub_date().and_then(|date_str| {
                DateTime::parse_from_rfc2822(date_str)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
            link: item.link().map(|l| l.to_string()),
        })
        .collect();

    Ok(items)
}

fn parse_as_atom(content: &str) -> std::result::Result<Vec<FeedItem>, String> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes()).map_err(|e| e.to_string())?;

    let items = feed
        .entries()
        .iter()
        .map(|entry| {
            let published = entry.published().unwrap_or(entry.updated());
            let published = Some(published.with_timezone(&Utc));

            // Prefer the alternate (watch page) link
            let link = entry
                .links()
                .iter()
                .find(|link| link.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|link| link.href().to_string());

            FeedItem {
                title: entry.title().as_str().to_string(),
                published,
                link,
            }
        })
        .collect();

    Ok(items)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHANNEL_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <link rel="self" href="http://www.youtube.com/feeds/videos.xml?channel_id=UCabc"/>
 <id>yt:channel:UCabc</id>
 <yt:channelId>UCabc</yt:channelId>
 <title>Some Channel</title>
 <link rel="alternate" href="https://www.youtube.com/channel/UCabc"/>
 <published>2015-01-01T00:00:00+00:00</published>
 <updated>2024-03-02T10:00:00+00:00</updated>
 <entry>
  <id>yt:video:vid2</id>
  <yt:videoId>vid2</yt:videoId>
  <title>Second upload</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=vid2"/>
  <published>2024-03-02T09:00:00+00:00</published>
  <updated>2024-03-02T09:30:00+00:00</updated>
 </entry>
 <entry>
  <id>yt:video:vid1</id>
  <yt:videoId>vid1</yt:videoId>
  <title>First upload</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=vid1"/>
  <published>2024-03-01T09:00:00+00:00</published>
  <updated>2024-03-01T09:30:00+00:00</updated>
 </entry>
</feed>"#;

    const CHANNEL_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Some Channel</title>
        <link>https://example.com</link>
        <description>Uploads</description>
        <item>
            <title>Episode 12</title>
            <link>https://example.com/watch/12</link>
            <pubDate>Tue, 02 Jan 2024 14:30:00 +0000</pubDate>
        </item>
        <item>
            <title>Episode 11</title>
            <link>https://example.com/watch/11</link>
        </item>
    </channel>
</rss>"#;

    fn client_for(base_url: &str) -> FeedClient {
        FeedClient::new(&FeedConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn feed_url_carries_channel_id() {
        let client = FeedClient::new(&FeedConfig::default()).unwrap();
        assert_eq!(
            client.feed_url("UCabc").as_str(),
            "https://www.youtube.com/feeds/videos.xml?channel_id=UCabc"
        );
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = FeedClient::new(&FeedConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn parses_channel_atom_feed() {
        let items = parse_feed(CHANNEL_ATOM).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Second upload");
        assert_eq!(
            items[0].link.as_deref(),
            Some("https://www.youtube.com/watch?v=vid2")
        );
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap())
        );
        assert_eq!(items[1].title, "First upload");
    }

    #[test]
    fn atom_offsets_are_normalized_and_updated_is_fallback() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
 <id>yt:channel:UCabc</id>
 <title>Some Channel</title>
 <updated>2024-03-02T10:00:00+00:00</updated>
 <entry>
  <id>yt:video:vid3</id>
  <title>Offset upload</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=vid3"/>
  <published>2024-03-02T10:00:00+01:00</published>
  <updated>2024-03-02T12:00:00+01:00</updated>
 </entry>
 <entry>
  <id>yt:video:vid4</id>
  <title>Undated upload</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=vid4"/>
  <updated>2024-03-03T08:00:00-02:00</updated>
 </entry>
</feed>"#;

        let items = parse_feed(atom).unwrap();

        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap())
        );
        assert_eq!(
            items[1].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_rss_feed() {
        let items = parse_feed(CHANNEL_RSS).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Episode 12");
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap())
        );
        assert_eq!(items[1].published, None);
        assert_eq!(items[1].link.as_deref(), Some("https://example.com/watch/11"));
    }

    #[test]
    fn rejects_non_feed_content() {
        let err = parse_feed("<html><body>nope</body></html>").unwrap_err();
        assert!(err.contains("not RSS"));
        assert!(err.contains("not Atom"));
    }

    #[tokio::test]
    async fn fetches_feed_over_http() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/videos.xml"))
            .and(query_param("channel_id", "UCabc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CHANNEL_ATOM))
            .mount(&mock_server)
            .await;

        let items = client_for(&mock_server.uri()).fetch("UCabc").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "First upload");
    }

    #[tokio::test]
    async fn http_error_status_is_feed_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/videos.xml"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server.uri())
            .fetch("UCgone")
            .await
            .unwrap_err();

        match err {
            Error::Feed(FeedError::Http { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.contains("channel_id=UCgone"));
            }
            other => panic!("expected Http feed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds/videos.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"xml\"}"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server.uri())
            .fetch("UCabc")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Feed(FeedError::Parse { .. })));
        assert!(err.is_channel_scoped());
    }
}
