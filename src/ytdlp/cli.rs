//! yt-dlp invoked as an external process

use super::parser::{check_download_status, parse_probe_output};
use super::request::RetrievalRequest;
use super::traits::{ChannelResolver, Retriever};
use crate::config::ToolsConfig;
use crate::types::ResolvedChannel;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Name of the yt-dlp executable searched in PATH
const BINARY_NAME: &str = "yt-dlp";

/// yt-dlp driven through its command line
///
/// One process is spawned per call; nothing is retried.
///
/// # Examples
///
/// ```no_run
/// use ytsub_dl::ytdlp::YtDlp;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let tool = YtDlp::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let tool = YtDlp::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary_path: PathBuf,
}

impl YtDlp {
    /// Create a handle for an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which(BINARY_NAME).ok().map(Self::new)
    }

    /// Locate yt-dlp as configured
    ///
    /// An explicit `ytdlp_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExternalTool`](crate::Error::ExternalTool) if no binary
    /// can be located.
    pub fn from_config(tools: &ToolsConfig) -> crate::Result<Self> {
        if let Some(path) = &tools.ytdlp_path {
            return Ok(Self::new(path.clone()));
        }

        if tools.search_path
            && let Some(tool) = Self::from_path()
        {
            return Ok(tool);
        }

        Err(crate::Error::ExternalTool(
            "yt-dlp not found. Configure tools.ytdlp_path or ensure yt-dlp is in PATH.".into(),
        ))
    }

    /// Path of the binary this handle runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

#[async_trait]
impl ChannelResolver for YtDlp {
    async fn resolve(&self, url: &str) -> crate::Result<ResolvedChannel> {
        debug!(url, binary = %self.binary_path.display(), "probing channel metadata");

        let output = Command::new(&self.binary_path)
            .arg("--skip-download")
            .args(["--playlist-items", "1"])
            .args(["--print", "channel_id"])
            .args(["--print", "channel"])
            .arg("--no-warnings")
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        parse_probe_output(url, &output.stdout, &output.stderr, output.status.code())
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

#[async_trait]
impl Retriever for YtDlp {
    async fn retrieve(&self, url: &str, request: &RetrievalRequest) -> crate::Result<()> {
        let args = request.to_args(url);
        debug!(url, ?args, "running yt-dlp");

        // Progress goes straight to the terminal; stderr is kept to classify failures
        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        check_download_status(url, &output.stderr, output.status.code())
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
