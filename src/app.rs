//! Subscribe and download flows
//!
//! These functions tie the components together for one invocation. They take
//! every collaborator by reference so tests can swap in fake resolvers,
//! retrievers and a mock feed server.

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::feed::FeedClient;
use crate::filter::{ChannelFilter, cutoff_time};
use crate::subscriptions::SubscriptionStore;
use crate::types::ChannelRecord;
use crate::ytdlp::{ChannelResolver, RetrievalRequest, Retriever};
use chrono::{DateTime, Utc};
use std::io::BufRead;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Result of the subscribe flow
#[derive(Clone, Debug, PartialEq)]
pub struct SubscribeOutcome {
    /// The record built from the resolved channel
    pub record: ChannelRecord,
    /// `false` if an identical record was already stored
    pub added: bool,
}

/// A channel whose feed could not be processed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelFailure {
    /// Channel display name
    pub channel: String,
    /// Rendered error
    pub reason: String,
}

/// Per-channel outcomes of one download run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Channels whose feed was fetched and filtered
    pub channels_checked: usize,
    /// Channels with no eligible items
    pub channels_skipped: usize,
    /// Channels that failed before dispatch
    pub channel_failures: Vec<ChannelFailure>,
    /// Items the retrieval tool completed
    pub items_retrieved: usize,
    /// Items the retrieval tool failed on
    pub items_failed: usize,
}

impl RunSummary {
    /// Whether every channel and item completed
    pub fn is_clean(&self) -> bool {
        self.channel_failures.is_empty() && self.items_failed == 0
    }
}

/// Resolve `url` and add the channel to the subscription list
///
/// Patterns are compiled before the resolver runs so a typo fails fast.
///
/// # Errors
///
/// - [`Error::InvalidPattern`](crate::Error::InvalidPattern) for a bad pattern
/// - [`Error::Resolution`](crate::Error::Resolution) if the probe fails
/// - any error from reading or writing the subscription file
pub async fn subscribe(
    store: &SubscriptionStore,
    resolver: &dyn ChannelResolver,
    url: &str,
    filter: Option<&str>,
    ignore: Option<&str>,
) -> Result<SubscribeOutcome> {
    ChannelFilter::new(filter, ignore)?;

    info!(url, resolver = resolver.name(), "resolving channel");
    let resolved = resolver.resolve(url).await?;

    let record = ChannelRecord::from(resolved)
        .with_filter(filter.map(str::to_string))
        .with_ignore(ignore.map(str::to_string));

    let added = store.subscribe(record.clone()).await?;

    Ok(SubscribeOutcome { record, added })
}

/// Fetch, filter and dispatch every subscribed channel
///
/// Channels are processed in subscription order. A feed or pattern failure is
/// recorded in the summary and the run moves to the next channel.
///
/// # Errors
///
/// Returns an error if the subscription file cannot be read, or if the
/// retrieval tool fails in a way that is not confined to one item.
pub async fn run_downloads(
    config: &Config,
    store: &SubscriptionStore,
    feeds: &FeedClient,
    retriever: &dyn Retriever,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let channels = store.read().await?;
    let cutoff = cutoff_time(now, config.days_back);
    let base = RetrievalRequest::from_config(config);
    let dispatcher = Dispatcher::new(retriever);
    let mut summary = RunSummary::default();

    info!(
        channels = channels.len(),
        days_back = config.days_back,
        dry_run = config.dry_run,
        "checking subscriptions"
    );

    for channel in &channels {
        let urls = match select_channel_items(feeds, channel, cutoff).await {
            Ok(urls) => urls,
            Err(e) if e.is_channel_scoped() => {
                error!(channel = %channel.name, id = %channel.id, error = %e, code = e.error_code(), "skipping channel");
                summary.channel_failures.push(ChannelFailure {
                    channel: channel.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };
        summary.channels_checked += 1;

        if urls.is_empty() {
            debug!(channel = %channel.name, "no new items");
            summary.channels_skipped += 1;
            continue;
        }

        info!(channel = %channel.name, items = urls.len(), "retrieving new items");
        let report = dispatcher
            .dispatch(&urls, &base, channel.opts.as_ref())
            .await?;
        summary.items_retrieved += report.retrieved();
        summary.items_failed += report.failed();
    }

    info!(
        checked = summary.channels_checked,
        failed_channels = summary.channel_failures.len(),
        retrieved = summary.items_retrieved,
        failed_items = summary.items_failed,
        "run complete"
    );

    Ok(summary)
}

async fn select_channel_items(
    feeds: &FeedClient,
    channel: &ChannelRecord,
    cutoff: DateTime<Utc>,
) -> Result<Vec<String>> {
    let filter = ChannelFilter::for_channel(channel)?;
    let items = feeds.fetch(&channel.id).await?;
    debug!(channel = %channel.name, items = items.len(), "feed fetched");
    Ok(filter.select(&items, cutoff))
}

/// What ended a [`wait_for_acknowledgment`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acknowledgment {
    /// A line (or end of input) was read
    Input,
    /// SIGINT or SIGTERM (Ctrl+C elsewhere) arrived
    Signal,
}

/// Block until a line is read from stdin or a termination signal arrives
pub async fn wait_for_acknowledgment() -> Acknowledgment {
    eprintln!("Press Enter to exit.");
    wait_until(
        line_on_thread(std::io::BufReader::new(std::io::stdin())),
        wait_for_signal(),
    )
    .await
}

/// Resolve with whichever of `input` and `signal` completes first
pub async fn wait_until<I, S>(input: I, signal: S) -> Acknowledgment
where
    I: Future<Output = ()>,
    S: Future<Output = ()>,
{
    tokio::select! {
        () = input => Acknowledgment::Input,
        () = signal => Acknowledgment::Signal,
    }
}

/// Read one line from `reader` on a dedicated thread
///
/// The read cannot be cancelled, so it is kept off the runtime's blocking pool:
/// the runtime shuts down without waiting for it.
pub fn line_on_thread<R>(reader: R) -> impl Future<Output = ()>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("ytsub-dl-stdin".to_string())
        .spawn(move || {
            let mut reader = reader;
            let mut line = String::new();
            if let Err(e) = reader.read_line(&mut line) {
                warn!(error = %e, "could not read from stdin");
            }
            let _ = tx.send(());
        });

    if let Err(e) = &spawned {
        warn!(error = %e, "could not start stdin reader, waiting for a signal only");
    }

    async move {
        match (spawned, rx.await) {
            (Ok(_), Ok(())) => {}
            // Without a reader only a signal can end the wait
            _ => std::future::pending::<()>().await,
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Handlers may fail to register in restricted environments
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
