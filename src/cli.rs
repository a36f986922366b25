//! Command-line interface

use crate::app::{self, Acknowledgment};
use crate::config::{CONFIG_FILE, Config, Paths};
use crate::error::Result;
use crate::feed::FeedClient;
use crate::subscriptions::SubscriptionStore;
use crate::ytdlp::YtDlp;
use clap::Parser;
use tracing::{debug, info, warn};

/// Subscribe to video channels and retrieve their new uploads with yt-dlp
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subscribe to the channel behind this URL
    #[arg(long, value_name = "URL")]
    pub subscribe: Option<String>,

    /// Only retrieve titles starting with this pattern (case-insensitive)
    #[arg(long, value_name = "REGEX", requires = "subscribe")]
    pub filter: Option<String>,

    /// Skip titles starting with this pattern (case-insensitive)
    #[arg(long, value_name = "REGEX", requires = "subscribe")]
    pub ignore: Option<String>,

    /// Retrieve new items of every subscribed channel
    #[arg(long)]
    pub download: bool,

    /// Only consider items published within this many days [default: 3]
    #[arg(long, value_name = "DAYS")]
    pub days_back: Option<u32>,

    /// Ask yt-dlp to simulate instead of downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Where media is written [default: ~/Videos/youtube]
    #[arg(long, value_name = "DIR")]
    pub video_dir: Option<String>,

    /// Where subs.json and config.json live [default: ~/.config/ytsub-dl]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<String>,

    /// yt-dlp download archive [default: <data-dir>/download_archive]
    #[arg(long, value_name = "FILE")]
    pub archive_file: Option<String>,

    /// Wait for Enter (or a termination signal) before exiting
    #[arg(long)]
    pub wait: bool,
}

impl Cli {
    /// Build the run configuration
    ///
    /// Paths are expanded first, then `config.json` is loaded from the data
    /// directory, then command-line values are applied on top.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config.json` exists but
    /// cannot be read or parsed.
    pub fn config(&self) -> Result<Config> {
        let paths = Paths::resolve(
            self.video_dir.as_deref(),
            self.data_dir.as_deref(),
            self.archive_file.as_deref(),
        );

        let mut config = Config::load(&paths.data_dir.join(CONFIG_FILE))?;
        config.paths = paths;
        if let Some(days_back) = self.days_back {
            config.days_back = days_back;
        }
        config.dry_run = self.dry_run;

        Ok(config)
    }

    /// Execute the requested flows
    ///
    /// Subscribing happens before downloading, so a newly added channel is
    /// included in the same run. With `--wait`, the process blocks for
    /// acknowledgment whether or not the flows succeeded.
    ///
    /// # Errors
    ///
    /// Returns the first unrecovered error of either flow.
    pub async fn run(self) -> Result<()> {
        self.run_then(app::wait_for_acknowledgment).await
    }

    /// [`run`](Self::run) with the acknowledgment wait supplied by the caller
    ///
    /// # Errors
    ///
    /// Returns the first unrecovered error of either flow.
    pub async fn run_then<W, F>(self, wait: W) -> Result<()>
    where
        W: FnOnce() -> F,
        F: Future<Output = Acknowledgment>,
    {
        let result = self.run_flows().await;

        if self.wait {
            let acknowledgment = wait().await;
            debug!(?acknowledgment, "wait finished");
        }

        result
    }

    async fn run_flows(&self) -> Result<()> {
        let config = self.config()?;
        let store = SubscriptionStore::new(&config.paths.data_dir);

        if self.subscribe.is_none() && !self.download {
            info!("nothing to do, pass --subscribe <URL> or --download");
            return Ok(());
        }

        let ytdlp = YtDlp::from_config(&config.tools)?;

        if let Some(url) = &self.subscribe {
            app::subscribe(
                &store,
                &ytdlp,
                url,
                self.filter.as_deref(),
                self.ignore.as_deref(),
            )
            .await?;
        }

        if self.download {
            let feeds = FeedClient::new(&config.feed)?;
            let summary =
                app::run_downloads(&config, &store, &feeds, &ytdlp, chrono::Utc::now()).await?;

            for failure in &summary.channel_failures {
                warn!(channel = %failure.channel, reason = %failure.reason, "channel was not processed");
            }
        }

        Ok(())
    }
}
