//! # ytsub-dl
//!
//! Subscribe to video channels and retrieve their new uploads with `yt-dlp`.
//!
//! A run reads the subscription list, fetches each channel's feed, keeps the
//! items published within the look-back window whose titles pass the channel's
//! patterns, and hands their links to `yt-dlp` one at a time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytsub_dl::{Config, FeedClient, SubscriptionStore, YtDlp, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = SubscriptionStore::new(&config.paths.data_dir);
//!     let ytdlp = YtDlp::from_config(&config.tools)?;
//!
//!     app::subscribe(&store, &ytdlp, "https://www.youtube.com/@example", None, None).await?;
//!
//!     let feeds = FeedClient::new(&config.feed)?;
//!     let summary = app::run_downloads(&config, &store, &feeds, &ytdlp, chrono::Utc::now()).await?;
//!     println!("retrieved {} items", summary.items_retrieved);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Subscribe and download flows
pub mod app;
/// Command-line interface
pub mod cli;
/// Configuration types
pub mod config;
/// Sequential item dispatch
pub mod dispatcher;
/// Error types
pub mod error;
/// Channel feed fetching
pub mod feed;
/// Title and age filtering
pub mod filter;
/// Subscription persistence
pub mod subscriptions;
/// Core types
pub mod types;
/// Path expansion helpers
pub mod utils;
/// yt-dlp integration
pub mod ytdlp;

pub use app::{Acknowledgment, RunSummary, SubscribeOutcome};
pub use cli::Cli;
pub use config::{ChannelOptions, Config, Paths, RetrievalOptions};
pub use dispatcher::{DispatchReport, Dispatcher, ItemOutcome};
pub use error::{DownloadError, Error, FeedError, ResolutionError, Result};
pub use feed::{FeedClient, FeedItem};
pub use filter::ChannelFilter;
pub use subscriptions::SubscriptionStore;
pub use types::{ChannelRecord, ResolvedChannel};
pub use ytdlp::{ChannelResolver, RetrievalRequest, Retriever, YtDlp};
