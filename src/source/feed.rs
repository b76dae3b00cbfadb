// src/source/feed.rs
use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ureq::Agent;

use super::PriceSource;
use crate::config::options::FetchOptions;
use crate::core::net;
use crate::error::FetchFailure;
use crate::model::FetchResult;
use crate::registry::Province;
use crate::specs::feed::Feed;

/// A single combined feed, downloaded once per run and shared by all workers.
/// `location` is an http(s) URL or a local file path.
pub struct FeedSource {
    location: String,
    agent: Agent,
    max_attempts: u32,
    backoff: Duration,
    /// The outcome of the one download, success or failure.
    cache: Mutex<Option<Result<Arc<Feed>, FetchFailure>>>,
}

impl FeedSource {
    pub fn new(location: &str, fetch: &FetchOptions) -> Self {
        Self {
            location: s!(location),
            agent: net::agent(fetch.request_timeout(), &fetch.user_agent),
            max_attempts: fetch.max_attempts.max(1),
            backoff: fetch.backoff(),
            cache: Mutex::new(None),
        }
    }

    /// The parsed feed. The first caller downloads (with retries) while the
    /// others wait; every later call gets the cached outcome, so a dead feed
    /// costs one download per run, not one per province.
    fn feed(&self) -> Result<Arc<Feed>, FetchFailure> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(outcome) = cache.as_ref() {
            return outcome.clone();
        }

        let outcome = self.download().map(Arc::new);
        match &outcome {
            Ok(feed) => tracing::info!(location = %self.location, records = feed.len(), "Feed loaded"),
            Err(e) => tracing::warn!(location = %self.location, error = %e, "Feed unavailable for this run"),
        }
        *cache = Some(outcome.clone());
        outcome
    }

    fn download(&self) -> Result<Feed, FetchFailure> {
        let mut delay = self.backoff;
        let mut attempt = 1;
        loop {
            match self.download_once() {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::debug!(location = %self.location, attempt, error = %e, "Feed download failed; retrying");
                    thread::sleep(delay);
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    fn download_once(&self) -> Result<Feed, FetchFailure> {
        let body = if self.location.starts_with("http://") || self.location.starts_with("https://") {
            net::http_get(&self.agent, &self.location)?
        } else {
            fs::read_to_string(&self.location).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchFailure::NotFound,
                _ => FetchFailure::Network(e.to_string()),
            })?
        };
        Feed::parse(&body)
    }
}

impl PriceSource for FeedSource {
    fn name(&self) -> &str {
        &self.location
    }

    fn fetch(&self, province: &Province) -> FetchResult {
        self.feed()?.record_for(province)
    }
}
