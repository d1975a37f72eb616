//! Turning a relay's unordered result set into calendar views.
//!
//! Everything here is a pure function of its input plus the `now`/zone it
//! is handed. Events failing validation or parsing are dropped, never
//! reported.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::Calendar;
use crate::calendar_event::{CalendarEvent, EventStart, date_start_timestamp};
use crate::codec::{parse_calendar, parse_calendar_event, parse_calendar_event_rsvp};
use crate::coordinate::Coordinate;
use crate::error::ValidationError;
use crate::event::RawEvent;
use crate::rsvp::CalendarEventRsvp;
use crate::validate::{check_calendar, check_calendar_event, check_calendar_event_rsvp};

pub fn decode_events(raw: &[RawEvent]) -> Vec<CalendarEvent> {
    decode(raw, check_calendar_event, parse_calendar_event)
}

pub fn decode_calendars(raw: &[RawEvent]) -> Vec<Calendar> {
    decode(raw, check_calendar, parse_calendar)
}

pub fn decode_rsvps(raw: &[RawEvent]) -> Vec<CalendarEventRsvp> {
    decode(raw, check_calendar_event_rsvp, parse_calendar_event_rsvp)
}

fn decode<T>(
    raw: &[RawEvent],
    check: fn(&RawEvent) -> Result<(), ValidationError>,
    parse: fn(&RawEvent) -> Option<T>,
) -> Vec<T> {
    raw.iter()
        .filter_map(|event| match check(event) {
            Ok(()) => {
                let parsed = parse(event);
                if parsed.is_none() {
                    tracing::debug!(id = %event.id, kind = event.kind, "Dropping unparsable event");
                }
                parsed
            }
            Err(reason) => {
                tracing::debug!(id = %event.id, kind = event.kind, %reason, "Dropping invalid event");
                None
            }
        })
        .collect()
}

/// Chronological order by start. Date-based starts count as local midnight
/// in `tz`; ties fall back to creation time, then id.
pub fn compare_chronologically_in<Tz: TimeZone>(
    a: &CalendarEvent,
    b: &CalendarEvent,
    tz: &Tz,
) -> Ordering {
    sort_key(a, tz).cmp(&sort_key(b, tz))
}

/// Sorts by a total key so mixed kinds never produce an inconsistent order.
/// Dates that are not real calendar days sort last, by their text.
fn sort_key<'a, Tz: TimeZone>(
    event: &'a CalendarEvent,
    tz: &Tz,
) -> (bool, i64, &'a str, i64, &'a str) {
    let (instant, text) = match event.start() {
        EventStart::Time(ts) => (Some(ts), ""),
        EventStart::Date(date) => (date_start_timestamp(date, tz), date),
    };
    (
        instant.is_none(),
        instant.unwrap_or_default(),
        text,
        event.created_at(),
        event.id(),
    )
}

pub fn sort_chronologically_in<Tz: TimeZone>(events: &mut [CalendarEvent], tz: &Tz) {
    events.sort_by(|a, b| compare_chronologically_in(a, b, tz));
}

/// Keep only events that have not started yet: time-based starts strictly
/// after `now`, date-based starts today or later in `tz`.
pub fn retain_upcoming_in<Tz: TimeZone>(events: &mut Vec<CalendarEvent>, now: DateTime<Utc>, tz: &Tz) {
    let now_ts = now.timestamp();
    let today = now.with_timezone(tz).date_naive().format("%Y-%m-%d").to_string();

    events.retain(|event| match event.start() {
        EventStart::Time(start) => start > now_ts,
        EventStart::Date(start) => start >= today.as_str(),
    });
}

/// Drop later occurrences of an id, keeping first-seen order.
pub fn dedup_by_id(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert(event.id().to_string()))
        .collect()
}

/// Collapse replaceable versions: the newest per coordinate wins. Output
/// order follows the first appearance of each coordinate.
pub fn latest_versions(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut order: Vec<Coordinate> = Vec::new();
    let mut latest: HashMap<Coordinate, CalendarEvent> = HashMap::new();

    for event in events {
        let coordinate = event.coordinate();
        match latest.get(&coordinate) {
            Some(existing) if existing.created_at() >= event.created_at() => {}
            Some(_) => {
                latest.insert(coordinate, event);
            }
            None => {
                order.push(coordinate.clone());
                latest.insert(coordinate, event);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|coordinate| latest.remove(&coordinate))
        .collect()
}

/// Same as `latest_versions`, for calendars.
pub fn latest_calendars(calendars: Vec<Calendar>) -> Vec<Calendar> {
    let mut order: Vec<Coordinate> = Vec::new();
    let mut latest: HashMap<Coordinate, Calendar> = HashMap::new();

    for calendar in calendars {
        let coordinate = calendar.coordinate();
        match latest.get(&coordinate) {
            Some(existing) if existing.created_at >= calendar.created_at => {}
            Some(_) => {
                latest.insert(coordinate, calendar);
            }
            None => {
                order.push(coordinate.clone());
                latest.insert(coordinate, calendar);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|coordinate| latest.remove(&coordinate))
        .collect()
}

/// A normalized search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerms {
    /// Trimmed, lowercased query used for substring matching.
    pub text: String,
    /// Set when the query starts with `#`.
    pub hashtag: Option<String>,
}

impl SearchTerms {
    pub fn parse(query: &str) -> Self {
        let text = query.trim().to_lowercase();
        let hashtag = text
            .strip_prefix('#')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string);
        SearchTerms { text, hashtag }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Hashtag hits first, then text matches from the broad set, each id once.
pub fn merge_search(
    hashtag_hits: Vec<CalendarEvent>,
    broad: Vec<CalendarEvent>,
    terms: &SearchTerms,
    limit: usize,
) -> Vec<CalendarEvent> {
    let text_hits = broad.into_iter().filter(|event| event.matches_text(&terms.text));
    let mut merged = dedup_by_id(hashtag_hits.into_iter().chain(text_hits).collect());
    merged.truncate(limit);
    merged
}

/// Cursor for the next page: strictly older than everything the relay
/// returned for this one, whether or not it made it onto the page.
pub fn next_cursor(window: &[RawEvent]) -> Option<i64> {
    window.iter().map(|event| event.created_at).min().map(|oldest| oldest - 1)
}
