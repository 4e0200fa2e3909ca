//! Client core for the USGS earthquake feed.
//!
//! # Overview
//! Fetches the FDSN event query as GeoJSON, decodes the first event into a
//! [`Record`] and formats it into the three strings a screen displays. All
//! failures are logged and collapse into "nothing to show" at the lenient
//! entry points, while the `try_*` variants keep the failure kind.
//!
//! # Design
//! - `QuakeClient` is stateless apart from its config and a pooled agent.
//! - The request can be executed by the core ([`Fetcher`]) or by the host
//!   (`build_request` / `parse_response`), so a host with its own
//!   networking stack only needs the parser.
//! - [`spawn_fetch`] runs one fetch on a worker thread and drops the
//!   result if the caller cancelled in the meantime.

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod http;
pub mod parse;
pub mod task;
pub mod types;

pub use client::QuakeClient;
pub use config::{FeedConfig, USGS_QUERY_URL};
pub use display::{alert_text, format_time, format_time_in, EventView};
pub use error::FeedError;
pub use fetch::Fetcher;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use parse::{parse, parse_record};
pub use task::{spawn_fetch, CancellationToken, FetchTask};
pub use types::{Record, TsunamiAlert};
