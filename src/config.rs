//! Configuration types for ytsub-dl

use crate::error::{Error, Result};
use crate::utils::expand_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional configuration file inside the data directory
pub const CONFIG_FILE: &str = "config.json";

/// Default video directory (expanded at runtime)
pub const DEFAULT_VIDEO_DIR: &str = "~/Videos/youtube";

/// Default data directory (expanded at runtime)
pub const DEFAULT_DATA_DIR: &str = "~/.config/ytsub-dl";

/// Default archive file name inside the data directory
pub const DEFAULT_ARCHIVE_FILE: &str = "download_archive";

/// Default feed host
pub const DEFAULT_FEED_BASE_URL: &str = "https://www.youtube.com";

/// Base retrieval settings handed to yt-dlp for every channel
///
/// Individual channels may override any field through [`ChannelOptions`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    /// Output template, relative to the video directory
    /// (default: "%(uploader)s_%(id)s.%(ext)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Format-selection expression (default prefers 1080p, then 720p, then best)
    #[serde(default = "default_format")]
    pub format: String,

    /// Write subtitle files next to the video (default: true)
    #[serde(default = "default_true")]
    pub write_subtitles: bool,

    /// Subtitle languages to request (yt-dlp `--sub-langs` syntax)
    #[serde(default)]
    pub subtitle_langs: Option<String>,

    /// Write directly to the final file instead of a `.part` file (default: true)
    #[serde(default = "default_true")]
    pub no_part: bool,

    /// Location of the ffmpeg binary or its directory (yt-dlp discovers it if None)
    #[serde(default)]
    pub ffmpeg_location: Option<PathBuf>,

    /// SponsorBlock categories to cut from the video (default: ["all"])
    ///
    /// Only `.ass` and `.lrc` subtitles are re-timed alongside the cuts.
    #[serde(default = "default_sponsorblock_remove")]
    pub sponsorblock_remove: Vec<String>,

    /// Force keyframes at cut points for exact cuts (default: true)
    #[serde(default = "default_true")]
    pub force_keyframes_at_cuts: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            output_template: default_output_template(),
            format: default_format(),
            write_subtitles: true,
            subtitle_langs: None,
            no_part: true,
            ffmpeg_location: None,
            sponsorblock_remove: default_sponsorblock_remove(),
            force_keyframes_at_cuts: true,
        }
    }
}

impl RetrievalOptions {
    /// Return a copy of these options with `overrides` applied
    ///
    /// Every field set in `overrides` replaces the base value.
    #[must_use]
    pub fn merged(&self, overrides: &ChannelOptions) -> Self {
        let mut merged = self.clone();
        if let Some(template) = &overrides.output_template {
            merged.output_template = template.clone();
        }
        if let Some(format) = &overrides.format {
            merged.format = format.clone();
        }
        if let Some(write) = overrides.write_subtitles {
            merged.write_subtitles = write;
        }
        if let Some(langs) = &overrides.subtitle_langs {
            merged.subtitle_langs = Some(langs.clone());
        }
        if let Some(no_part) = overrides.no_part {
            merged.no_part = no_part;
        }
        if let Some(location) = &overrides.ffmpeg_location {
            merged.ffmpeg_location = Some(location.clone());
        }
        if let Some(categories) = &overrides.sponsorblock_remove {
            merged.sponsorblock_remove = categories.clone();
        }
        if let Some(force) = overrides.force_keyframes_at_cuts {
            merged.force_keyframes_at_cuts = force;
        }
        merged
    }
}

/// Per-channel overrides of [`RetrievalOptions`]
///
/// Stored as the `opts` object of a subscription. Unknown keys are rejected so a
/// typo in the subscription file fails loudly instead of being ignored. yt-dlp's
/// own option names are accepted as aliases.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelOptions {
    /// Output template override
    #[serde(default, alias = "outtmpl", skip_serializing_if = "Option::is_none")]
    pub output_template: Option<String>,

    /// Format-selection override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Subtitle writing override
    #[serde(
        default,
        alias = "writesubtitles",
        skip_serializing_if = "Option::is_none"
    )]
    pub write_subtitles: Option<bool>,

    /// Subtitle languages override
    #[serde(
        default,
        alias = "subtitleslangs",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtitle_langs: Option<String>,

    /// `.part` file override
    #[serde(default, alias = "nopart", skip_serializing_if = "Option::is_none")]
    pub no_part: Option<bool>,

    /// ffmpeg location override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_location: Option<PathBuf>,

    /// SponsorBlock categories override (an empty list disables removal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsorblock_remove: Option<Vec<String>>,

    /// Keyframe forcing override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_keyframes_at_cuts: Option<bool>,
}

impl ChannelOptions {
    /// Whether no field is overridden
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Feed fetching configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Scheme and host serving `/feeds/videos.xml` (default: "https://www.youtube.com")
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    /// HTTP timeout in seconds (default: 30)
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_feed_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Filesystem locations used by a run, already expanded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    /// Where downloaded media is written
    pub video_dir: PathBuf,
    /// Where `subs.json` and `config.json` live
    pub data_dir: PathBuf,
    /// yt-dlp download archive
    pub archive_file: PathBuf,
}

impl Paths {
    /// Resolve paths from optional user input, falling back to defaults
    ///
    /// Every input (and default) goes through [`expand_path`]. The archive file
    /// defaults to `download_archive` inside the resolved data directory.
    pub fn resolve(
        video_dir: Option<&str>,
        data_dir: Option<&str>,
        archive_file: Option<&str>,
    ) -> Self {
        let video_dir = expand_path(video_dir.unwrap_or(DEFAULT_VIDEO_DIR));
        let data_dir = expand_path(data_dir.unwrap_or(DEFAULT_DATA_DIR));
        let archive_file = match archive_file {
            Some(path) => expand_path(path),
            None => data_dir.join(DEFAULT_ARCHIVE_FILE),
        };

        Self {
            video_dir,
            data_dir,
            archive_file,
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::resolve(None, None, None)
    }
}

/// Main configuration for a ytsub-dl invocation
///
/// Built once per run from the optional `config.json` and the command line, then
/// passed by reference to every component. Paths and the dry-run flag only come
/// from the command line and are never read from or written to the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Resolved filesystem locations
    #[serde(skip)]
    pub paths: Paths,

    /// Only items published within this many days are considered (default: 3)
    #[serde(default = "default_days_back")]
    pub days_back: u32,

    /// Ask yt-dlp to simulate instead of downloading
    #[serde(skip)]
    pub dry_run: bool,

    /// Base retrieval options
    #[serde(default)]
    pub download: RetrievalOptions,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Feed fetching settings
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Paths::default(),
            days_back: default_days_back(),
            dry_run: false,
            download: RetrievalOptions::default(),
            tools: ToolsConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// A missing file yields the defaults. Keys absent from the file take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Config {
                    message: format!("failed to read {}: {}", path.display(), e),
                    key: None,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("invalid configuration in {}: {}", path.display(), e),
            key: None,
        })
    }
}

fn default_output_template() -> String {
    "%(uploader)s_%(id)s.%(ext)s".to_string()
}

fn default_format() -> String {
    concat!(
        "best[height=1080]",
        "/(bestvideo*[height=1080]+bestaudio)",
        "/best[height=720]",
        "/(bestvideo*[height=720]+bestaudio)",
        "/(bestvideo*+bestaudio)/best",
    )
    .to_string()
}

fn default_sponsorblock_remove() -> Vec<String> {
    vec!["all".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_days_back() -> u32 {
    3
}

fn default_feed_base_url() -> String {
    DEFAULT_FEED_BASE_URL.to_string()
}

fn default_feed_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("ytsub-dl/", env!("CARGO_PKG_VERSION")).to_string()
}
