//! In-process stand-ins for yt-dlp

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use ytsub_dl::{
    ChannelResolver, DownloadError, Error, ResolutionError, ResolvedChannel, RetrievalRequest,
    Retriever,
};

/// Resolves URLs from a fixed table and counts calls
#[derive(Default)]
pub struct FakeResolver {
    channels: HashMap<String, ResolvedChannel>,
    calls: Mutex<usize>,
}

impl FakeResolver {
    pub fn with_channel(mut self, url: &str, id: &str, name: &str) -> Self {
        self.channels.insert(
            url.to_string(),
            ResolvedChannel {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChannelResolver for FakeResolver {
    async fn resolve(&self, url: &str) -> ytsub_dl::Result<ResolvedChannel> {
        *self.calls.lock().unwrap() += 1;
        self.channels.get(url).cloned().ok_or_else(|| {
            ResolutionError::ToolFailed {
                url: url.to_string(),
                code: Some(1),
                stderr: format!("ERROR: Unsupported URL: {}", url),
            }
            .into()
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// How the fake retriever answers for a URL
#[derive(Clone, Copy)]
pub enum Scripted {
    ItemFailure,
    ToolFailure,
}

/// Records every retrieval and fails as scripted
#[derive(Default)]
pub struct FakeRetriever {
    script: HashMap<String, Scripted>,
    calls: Mutex<Vec<(String, RetrievalRequest)>>,
}

impl FakeRetriever {
    pub fn scripted(mut self, url: &str, outcome: Scripted) -> Self {
        self.script.insert(url.to_string(), outcome);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<(String, RetrievalRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FakeRetriever {
    async fn retrieve(&self, url: &str, request: &RetrievalRequest) -> ytsub_dl::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), request.clone()));

        match self.script.get(url) {
            None => Ok(()),
            Some(Scripted::ItemFailure) => Err(DownloadError::ItemFailed {
                url: url.to_string(),
                code: Some(1),
                reason: "ERROR: Video unavailable".to_string(),
            }
            .into()),
            Some(Scripted::ToolFailure) => Err(Error::ExternalTool(
                "yt-dlp was terminated by a signal".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
