//! Feed documents, mock feed server and workspace setup

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytsub_dl::config::FeedConfig;
use ytsub_dl::{Config, FeedClient, Paths, SubscriptionStore};

/// Fixed "now" used by every run in these tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

/// Watch link of a video id, as it appears in feeds
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// One feed entry
pub struct Entry<'a> {
    pub video_id: &'a str,
    pub title: &'a str,
    pub published: &'a str,
}

pub const fn entry<'a>(video_id: &'a str, title: &'a str, published: &'a str) -> Entry<'a> {
    Entry {
        video_id,
        title,
        published,
    }
}

/// Atom document shaped like a channel upload feed, newest entry first
pub fn channel_feed(channel_id: &str, entries: &[Entry<'_>]) -> String {
    let body: String = entries
        .iter()
        .map(|e| {
            format!(
                r#"  <entry>
    <id>yt:video:{id}</id>
    <yt:videoId>{id}</yt:videoId>
    <yt:channelId>{channel_id}</yt:channelId>
    <title>{title}</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v={id}"/>
    <author><name>Test Channel</name></author>
    <published>{published}</published>
    <updated>{published}</updated>
  </entry>
"#,
                id = e.video_id,
                title = e.title,
                published = e.published,
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <id>yt:channel:{channel_id}</id>
  <yt:channelId>{channel_id}</yt:channelId>
  <title>Test Channel</title>
  <published>2020-01-01T00:00:00+00:00</published>
{body}</feed>
"#
    )
}

/// Serve `body` with `status` for the feed of `channel_id`
pub async fn mount_feed(server: &MockServer, channel_id: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .and(query_param("channel_id", channel_id))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Temporary data and video directories with a config pointed at them
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
    pub store: SubscriptionStore,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let video_dir = dir.path().join("videos");
        let config = Config {
            paths: Paths::resolve(
                Some(video_dir.to_str().unwrap()),
                Some(data_dir.to_str().unwrap()),
                None,
            ),
            ..Default::default()
        };
        let store = SubscriptionStore::new(&config.paths.data_dir);

        Self { dir, config, store }
    }

    /// Feed client talking to the mock server
    pub fn feed_client(&self, server: &MockServer) -> FeedClient {
        FeedClient::new(&FeedConfig {
            base_url: server.uri(),
            ..self.config.feed.clone()
        })
        .unwrap()
    }
}
