//! Blocking HTTP GET against the feed.
//!
//! # Design
//! `Fetcher` wraps a `ureq::Agent` configured with the connect and read
//! timeouts from [`FeedConfig`]. Non-2xx statuses come back as data rather
//! than transport errors so they can be reported as `HttpStatus`. The
//! response and its body reader are owned locals, so the connection is
//! released on every return path.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl Fetcher {
    pub fn new(config: &FeedConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout))
            .timeout_recv_response(Some(config.read_timeout))
            // Bounds the whole body download, not each individual read.
            .timeout_recv_body(Some(config.read_timeout))
            .build()
            .new_agent();
        Self {
            agent,
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
        }
    }

    /// GET `url` and return the body, or an empty string on any failure.
    pub fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url) {
            Ok(body) => body,
            Err(err) => {
                warn!(url, kind = err.kind(), error = %err, "error fetching feed");
                String::new()
            }
        }
    }

    /// GET `url` and return the body of a 200 response.
    pub fn try_fetch(&self, url: &str) -> Result<String, FeedError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        };
        let response = self.execute(&request)?;
        if response.status != 200 {
            return Err(FeedError::HttpStatus {
                status: response.status,
            });
        }
        Ok(response.body)
    }

    /// Run a plain-data request and return whatever the server answered.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FeedError> {
        let url = checked_url(&request.url)?;

        let mut builder = match request.method {
            HttpMethod::Get => self.agent.get(url.as_str()),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let mut response = builder
            .call()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        // Error bodies are still read so the host sees what the server said.
        // Invalid UTF-8 is replaced rather than rejected.
        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(url = url.as_str(), status, bytes = body.len(), "feed response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Only absolute http(s) URLs are accepted.
fn checked_url(raw: &str) -> Result<Url, FeedError> {
    let url = Url::parse(raw).map_err(|e| FeedError::MalformedUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FeedError::MalformedUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FeedConfig::default())
    }

    #[test]
    fn empty_url_yields_empty_text() {
        assert_eq!(fetcher().fetch(""), "");
    }

    #[test]
    fn relative_url_is_malformed() {
        let err = fetcher().try_fetch("/fdsnws/event/1/query").unwrap_err();
        assert!(matches!(err, FeedError::MalformedUrl { .. }));
    }

    #[test]
    fn non_http_scheme_is_malformed() {
        let err = fetcher().try_fetch("ftp://earthquake.usgs.gov/feed").unwrap_err();
        assert!(matches!(err, FeedError::MalformedUrl { .. }));
        assert_eq!(fetcher().fetch("ftp://earthquake.usgs.gov/feed"), "");
    }

    #[test]
    fn checked_url_accepts_usgs_query() {
        let url = checked_url(crate::config::USGS_QUERY_URL).unwrap();
        assert_eq!(url.host_str(), Some("earthquake.usgs.gov"));
        assert_eq!(url.path(), "/fdsnws/event/1/query");
    }

    #[test]
    fn debug_omits_agent_internals() {
        let text = format!("{:?}", fetcher());
        assert!(text.contains("connect_timeout: 15s"));
    }
}
