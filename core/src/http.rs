//! HTTP transport types for hosts that run the request themselves.
//!
//! # Design
//! These types describe the feed request and its response as plain data.
//! A host with its own networking stack takes the `HttpRequest` from
//! `QuakeClient::build_request`, performs it, and hands an `HttpResponse`
//! back to `QuakeClient::parse_response`. The core's own [`Fetcher`]
//! accepts the same `HttpRequest`, so both paths share one description.
//!
//! All fields use owned types so values can cross the FFI boundary without
//! lifetime concerns.
//!
//! [`Fetcher`]: crate::fetch::Fetcher

/// HTTP method for a request. The feed is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
