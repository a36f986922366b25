//! Sequential hand-off of selected items to the retrieval tool
//!
//! The dispatcher is where per-item failures stop. A
//! [`DownloadError::ItemFailed`] is logged, recorded in the [`DispatchReport`] and
//! the next URL is tried. Every other error means the retrieval tool itself is
//! broken (missing binary, usage error, killed) and is returned immediately.

use crate::config::ChannelOptions;
use crate::error::{DownloadError, Error, Result};
use crate::ytdlp::{RetrievalRequest, Retriever};
use tracing::{debug, info, warn};

/// Outcome of one item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The retrieval tool completed for this item
    Retrieved,
    /// The retrieval tool failed for this item only
    Failed {
        /// Reason reported by the tool
        reason: String,
    },
}

/// Per-item results of one dispatch, in dispatch order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// `(url, outcome)` pairs
    pub items: Vec<(String, ItemOutcome)>,
}

impl DispatchReport {
    /// Number of items the tool completed
    pub fn retrieved(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, outcome)| *outcome == ItemOutcome::Retrieved)
            .count()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.items.len() - self.retrieved()
    }
}

/// Hands URLs to a [`Retriever`] one at a time
pub struct Dispatcher<'a> {
    retriever: &'a dyn Retriever,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher for `retriever`
    pub fn new(retriever: &'a dyn Retriever) -> Self {
        Self { retriever }
    }

    /// Retrieve every URL in order
    ///
    /// `overrides` are merged onto a copy of `base` once; the merged request is
    /// used for every URL.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not an item failure. URLs after it are not
    /// attempted.
    pub async fn dispatch(
        &self,
        urls: &[String],
        base: &RetrievalRequest,
        overrides: Option<&ChannelOptions>,
    ) -> Result<DispatchReport> {
        let request = match overrides {
            Some(overrides) if !overrides.is_empty() => {
                debug!(?overrides, "applying channel overrides");
                base.with_overrides(overrides)
            }
            _ => base.clone(),
        };

        let mut report = DispatchReport::default();

        for url in urls {
            debug!(url = %url, retriever = self.retriever.name(), "dispatching item");

            match self.retriever.retrieve(url, &request).await {
                Ok(()) => {
                    info!(url = %url, "item retrieved");
                    report.items.push((url.clone(), ItemOutcome::Retrieved));
                }
                Err(Error::Download(DownloadError::ItemFailed { reason, code, .. })) => {
                    warn!(url = %url, ?code, reason = %reason, "item failed, continuing with next");
                    report
                        .items
                        .push((url.clone(), ItemOutcome::Failed { reason }));
                }
                Err(e) => {
                    warn!(url = %url, error = %e, code = e.error_code(), "retrieval tool failed");
                    return Err(e);
                }
            }
        }

        Ok(report)
    }
}
