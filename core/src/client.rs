//! Fetch-and-parse client for the earthquake feed.
//!
//! # Design
//! `QuakeClient` holds only its `FeedConfig` and a [`Fetcher`]; it carries
//! no state between calls. Hosts that do their own networking use
//! `build_request` and `parse_response`; everyone else calls
//! `fetch_record`, which never fails loudly.

use tracing::warn;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::fetch::Fetcher;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::parse::parse_record;
use crate::types::Record;

#[derive(Debug, Clone)]
pub struct QuakeClient {
    config: FeedConfig,
    fetcher: Fetcher,
}

impl Default for QuakeClient {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl QuakeClient {
    pub fn new(config: FeedConfig) -> Self {
        let fetcher = Fetcher::new(&config);
        Self { config, fetcher }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn build_request(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.config.url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_response(&self, response: HttpResponse) -> Result<Record, FeedError> {
        if response.status != 200 {
            return Err(FeedError::HttpStatus {
                status: response.status,
            });
        }
        parse_record(&response.body)
    }

    /// Raw feed text, empty on failure.
    pub fn fetch_text(&self) -> String {
        self.fetcher.fetch(&self.config.url)
    }

    pub fn try_fetch_record(&self) -> Result<Record, FeedError> {
        let body = self.fetcher.try_fetch(&self.config.url)?;
        parse_record(&body)
    }

    /// Fetch then parse; `None` for every failure kind, each one logged.
    pub fn fetch_record(&self) -> Option<Record> {
        match self.try_fetch_record() {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(url = %self.config.url, kind = err.kind(), error = %err, "no earthquake to show");
                None
            }
        }
    }
}
