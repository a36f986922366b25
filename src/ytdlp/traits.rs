//! Traits for the external retrieval tool

use super::request::RetrievalRequest;
use crate::types::ResolvedChannel;
use async_trait::async_trait;

/// Extracts channel metadata from a user-supplied URL
///
/// # Examples
///
/// ```no_run
/// use ytsub_dl::ytdlp::{ChannelResolver, YtDlp};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tool = YtDlp::from_path().expect("yt-dlp not found in PATH");
/// let channel = tool.resolve("https://www.youtube.com/@example").await?;
/// println!("{} is {}", channel.name, channel.id);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    /// Resolve `url` into a channel id and display name
    ///
    /// Probes at most one item and never downloads media.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError`](crate::error::ResolutionError) if the probe exits
    ///   with an unexpected status or prints no id and name
    /// - [`Error::ExternalTool`](crate::Error::ExternalTool) if the tool cannot run
    async fn resolve(&self, url: &str) -> crate::Result<ResolvedChannel>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Retrieves a single item
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the item at `url` with the given request settings
    ///
    /// # Errors
    ///
    /// - [`DownloadError::ItemFailed`](crate::error::DownloadError::ItemFailed) if
    ///   this item could not be retrieved; callers may continue with other items
    /// - Any other error means the tool itself is unusable and the run should stop
    async fn retrieve(&self, url: &str, request: &RetrievalRequest) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
