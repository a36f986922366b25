//! Title and age filtering of feed items
//!
//! Feeds list the newest item first. Items are selected oldest-first so that the
//! retrieval tool downloads them in publication order.
//!
//! Filtering rules, applied to each item in turn:
//! 1. Items published strictly before the cutoff are dropped
//! 2. Items whose title matches the ignore pattern are dropped
//! 3. If a filter pattern is set, items whose title does not match it are dropped
//!
//! Patterns match at the start of the title and ignore case, so `news` selects
//! "News at ten" but not "Breaking news".

use crate::error::{Error, Result};
use crate::feed::FeedItem;
use crate::types::ChannelRecord;
use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Compiled-size limit for user patterns
const PATTERN_SIZE_LIMIT: usize = 1024 * 1024;

/// Earliest publish time eligible for a run
pub fn cutoff_time(now: DateTime<Utc>, days_back: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days_back))
}

/// Compiled filter and ignore patterns of one channel
#[derive(Clone, Debug, Default)]
pub struct ChannelFilter {
    filter: Option<Regex>,
    ignore: Option<Regex>,
}

impl ChannelFilter {
    /// Compile the given patterns
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if either pattern does not compile.
    pub fn new(filter: Option<&str>, ignore: Option<&str>) -> Result<Self> {
        Ok(Self {
            filter: filter.map(compile_pattern).transpose()?,
            ignore: ignore.map(compile_pattern).transpose()?,
        })
    }

    /// Compile the patterns of a subscription
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if either pattern does not compile.
    pub fn for_channel(channel: &ChannelRecord) -> Result<Self> {
        Self::new(channel.filter.as_deref(), channel.ignore.as_deref())
    }

    /// Whether a title passes the ignore and filter patterns
    pub fn accepts_title(&self, title: &str) -> bool {
        if let Some(ignore) = &self.ignore
            && ignore.is_match(title)
        {
            debug!(title, "rejected: matched ignore pattern");
            return false;
        }

        if let Some(filter) = &self.filter
            && !filter.is_match(title)
        {
            debug!(title, "rejected: filter pattern did not match");
            return false;
        }

        true
    }

    /// Select the links of eligible items, oldest first
    ///
    /// `items` is expected in feed order (newest first) and is walked in reverse.
    /// Items without a publish time or without a link are never selected.
    pub fn select(&self, items: &[FeedItem], cutoff: DateTime<Utc>) -> Vec<String> {
        items
            .iter()
            .rev()
            .filter(|item| {
                match item.published {
                    Some(published) if published >= cutoff => {}
                    Some(_) => {
                        debug!(title = %item.title, "rejected: published before cutoff");
                        return false;
                    }
                    None => {
                        debug!(title = %item.title, "rejected: no publish time");
                        return false;
                    }
                }
                self.accepts_title(&item.title)
            })
            .filter_map(|item| item.link.clone())
            .collect()
    }
}

/// Select the links of eligible items with freshly compiled patterns
///
/// Convenience wrapper around [`ChannelFilter::new`] and [`ChannelFilter::select`].
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] if either pattern does not compile.
pub fn select(
    items: &[FeedItem],
    filter: Option<&str>,
    ignore: Option<&str>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<String>> {
    Ok(ChannelFilter::new(filter, ignore)?.select(items, cutoff))
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
