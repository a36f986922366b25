//! Core types for ytsub-dl

use crate::config::ChannelOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A subscribed channel, as stored in `subs.json`
///
/// Records are compared by their full content: two subscriptions to the same
/// channel with different filters are distinct records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Stable channel identifier of the video service (e.g. `UC...`)
    pub id: String,

    /// Display name, used in logs
    pub name: String,

    /// Only titles matching this pattern (at the start, case-insensitive) are retrieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Titles matching this pattern (at the start, case-insensitive) are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,

    /// Retrieval option overrides for this channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opts: Option<ChannelOptions>,
}

impl ChannelRecord {
    /// Create a record without patterns or overrides
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filter: None,
            ignore: None,
            opts: None,
        }
    }

    /// Set the filter pattern
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the ignore pattern
    #[must_use]
    pub fn with_ignore(mut self, ignore: Option<String>) -> Self {
        self.ignore = ignore;
        self
    }
}

impl fmt::Display for ChannelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Channel metadata extracted from a user-supplied URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedChannel {
    /// Stable channel identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl From<ResolvedChannel> for ChannelRecord {
    fn from(channel: ResolvedChannel) -> Self {
        ChannelRecord::new(channel.id, channel.name)
    }
}
