//! The three strings a screen shows for a [`Record`].

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{Record, TsunamiAlert};

/// `EEE, d MMM yyyy 'at' HH:mm:ss z` in chrono notation.
pub const DATE_FORMAT: &str = "%a, %-d %b %Y at %H:%M:%S %Z";

pub const ALERT_NO: &str = "No tsunami alert issued";
pub const ALERT_YES: &str = "Tsunami alert issued";
pub const ALERT_NOT_AVAILABLE: &str = "Tsunami alert not available";

pub fn alert_text(alert_level: i32) -> &'static str {
    match TsunamiAlert::from_code(alert_level) {
        TsunamiAlert::None => ALERT_NO,
        TsunamiAlert::Issued => ALERT_YES,
        TsunamiAlert::Unknown(_) => ALERT_NOT_AVAILABLE,
    }
}

/// Render epoch milliseconds in UTC. `None` if out of chrono's range.
pub fn format_time(millis: i64) -> Option<String> {
    format_time_in(millis, &Utc)
}

pub fn format_time_in<Tz>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(utc.with_timezone(tz).format(DATE_FORMAT).to_string())
}

/// Display slots for one event. The default is the blank screen shown when
/// nothing could be loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventView {
    pub title: String,
    pub date: String,
    pub alert: String,
}

impl EventView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.title().to_string(),
            date: format_time(record.occurred_at_millis()).unwrap_or_default(),
            alert: alert_text(record.alert_level()).to_string(),
        }
    }
}

impl From<Option<&Record>> for EventView {
    fn from(record: Option<&Record>) -> Self {
        record.map(EventView::from_record).unwrap_or_default()
    }
}
