//! Timestamp formatting for plan headers.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A plan timestamp shown in a given time zone, to the minute
/// (`2026-03-14 09:30 CET`).
///
/// Plans loaded from a file without a stamp carry the Unix epoch; those
/// print as `unknown` rather than a 1970 date.
pub struct LocalDateTime<'a> {
    timestamp: &'a Timestamp,
    zone: TimeZone,
}

impl<'a> LocalDateTime<'a> {
    /// Formats in the system time zone.
    pub fn new(timestamp: &'a Timestamp) -> Self {
        Self::in_zone(timestamp, TimeZone::system())
    }

    pub fn in_zone(timestamp: &'a Timestamp, zone: TimeZone) -> Self {
        Self { timestamp, zone }
    }
}

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self.timestamp == Timestamp::UNIX_EPOCH {
            return f.write_str("unknown");
        }
        let zoned = self.timestamp.to_zoned(self.zone.clone());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M %Z"))
    }
}
