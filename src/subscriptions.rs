//! Subscription list persistence
//!
//! The subscription list is the entire persistent state of ytsub-dl: an ordered
//! JSON array of [`ChannelRecord`]s in `subs.json` inside the data directory. The
//! file is meant to be edited by hand, so it is written pretty-printed.
//!
//! Every [`SubscriptionStore::write`] replaces the whole file. The new contents
//! are written to a temporary sibling first and renamed into place, so a crash
//! mid-write leaves the previous list intact. There is no lock file: two
//! invocations running at the same time may overwrite each other's changes.

use crate::error::{Error, Result};
use crate::types::ChannelRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the subscription file inside the data directory
pub const SUBSCRIPTIONS_FILE: &str = "subs.json";

/// Reads and writes the subscription list of one data directory
#[derive(Clone, Debug)]
pub struct SubscriptionStore {
    data_dir: PathBuf,
}

impl SubscriptionStore {
    /// Create a store for `data_dir`
    ///
    /// Nothing is touched on disk until [`read`](Self::read) or
    /// [`write`](Self::write) is called.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data directory backing this store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of the subscription file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SUBSCRIPTIONS_FILE)
    }

    /// Read the subscription list
    ///
    /// Returns an empty list when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] if the file exists but is not a valid subscription list
    /// - [`Error::Io`] if the file cannot be read
    pub async fn read(&self) -> Result<Vec<ChannelRecord>> {
        let path = self.path();
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no subscription file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let records: Vec<ChannelRecord> =
            serde_json::from_str(&contents).map_err(|e| Error::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), count = records.len(), "loaded subscriptions");
        Ok(records)
    }

    /// Replace the subscription list with `records`
    ///
    /// Creates the data directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created or the file cannot
    /// be written.
    pub async fn write(&self, records: &[ChannelRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let path = self.path();
        let tmp_path = path.with_extension("json.tmp");
        let mut contents = serde_json::to_string_pretty(records)?;
        contents.push('\n');

        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(path = %path.display(), count = records.len(), "wrote subscriptions");
        Ok(())
    }

    /// Add `record` to the list unless an identical record is already present
    ///
    /// Returns `true` if the list changed. The file is only rewritten when it did.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`read`](Self::read) and [`write`](Self::write).
    pub async fn subscribe(&self, record: ChannelRecord) -> Result<bool> {
        let mut records = self.read().await?;

        if records.contains(&record) {
            info!(channel = %record, "already subscribed");
            return Ok(false);
        }

        info!(channel = %record, "subscribing");
        records.push(record);
        self.write(&records).await?;
        Ok(true)
    }
}
