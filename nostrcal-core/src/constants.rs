//! Protocol constants and client defaults.

use std::time::Duration;

/// Date-based calendar event (all-day, `YYYY-MM-DD` start/end).
pub const KIND_DATE_EVENT: u16 = 31922;
/// Time-based calendar event (unix-second start/end).
pub const KIND_TIME_EVENT: u16 = 31923;
/// Calendar: a named list of event coordinates.
pub const KIND_CALENDAR: u16 = 31924;
/// RSVP to a calendar event.
pub const KIND_RSVP: u16 = 31925;

/// Ceiling for a single relay query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishing waits on relay acceptance, which can be slower than a read.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_RECENT_LIMIT: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// The broad text-search query fetches this many times the requested limit,
/// since matching happens client-side.
pub const SEARCH_OVERFETCH: usize = 5;

/// Range queries fetch broadly and filter locally.
pub const RANGE_QUERY_LIMIT: usize = 500;
