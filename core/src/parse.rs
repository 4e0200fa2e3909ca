//! GeoJSON feed text to [`Record`].
//!
//! Only the first feature is decoded. Later entries are never looked at,
//! so a malformed tail does not hide a good first event.

use tracing::{debug, warn};

use crate::error::FeedError;
use crate::types::{Feature, FeatureCollection, Record};

/// Decode the first event of a feed, keeping the failure kind.
pub fn parse_record(text: &str) -> Result<Record, FeedError> {
    if text.trim().is_empty() {
        return Err(FeedError::EmptyBody);
    }

    let collection: FeatureCollection = serde_json::from_str(text)?;
    let first = collection
        .features
        .into_iter()
        .next()
        .ok_or(FeedError::NoFeatures)?;
    let feature: Feature = serde_json::from_value(first)?;

    let record = Record::from(feature.properties);
    debug!(title = record.title(), time = record.occurred_at_millis(), "parsed feed record");
    Ok(record)
}

/// Decode the first event of a feed, or `None` for any failure.
///
/// Empty input is the normal outcome of a failed fetch and is not logged as
/// a warning; structural problems are.
pub fn parse(text: &str) -> Option<Record> {
    match parse_record(text) {
        Ok(record) => Some(record),
        Err(FeedError::EmptyBody) => {
            debug!("nothing to parse");
            None
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "error parsing feed JSON");
            None
        }
    }
}
