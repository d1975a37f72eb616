//! Relay filters for each access pattern.

use crate::constants::{KIND_CALENDAR, KIND_DATE_EVENT, KIND_RSVP, KIND_TIME_EVENT};
use crate::coordinate::Coordinate;
use crate::relay::Filter;

const EVENT_KINDS: [u16; 2] = [KIND_DATE_EVENT, KIND_TIME_EVENT];

pub fn recent(limit: usize) -> Filter {
    Filter::new().kinds(EVENT_KINDS).limit(limit)
}

/// One filter per kind, each paged by creation time.
pub fn upcoming(limit: usize, until: Option<i64>) -> [Filter; 2] {
    [KIND_TIME_EVENT, KIND_DATE_EVENT].map(|kind| {
        let filter = Filter::new().kinds([kind]).limit(limit);
        match until {
            Some(until) => filter.until(until),
            None => filter,
        }
    })
}

pub fn range(limit: usize) -> Filter {
    Filter::new().kinds(EVENT_KINDS).limit(limit)
}

pub fn hashtag(tag: &str, limit: usize) -> Filter {
    Filter::new().kinds(EVENT_KINDS).tag("t", [tag]).limit(limit)
}

/// Unfiltered fetch for client-side text matching.
pub fn broad(limit: usize) -> Filter {
    Filter::new().kinds(EVENT_KINDS).limit(limit)
}

/// All versions of one replaceable event.
pub fn coordinate(coordinate: &Coordinate) -> Filter {
    Filter::new()
        .kinds([coordinate.kind])
        .authors([coordinate.pubkey.as_str()])
        .tag("d", [coordinate.identifier.as_str()])
}

pub fn calendars(author: Option<&str>, limit: usize) -> Filter {
    let filter = Filter::new().kinds([KIND_CALENDAR]).limit(limit);
    match author {
        Some(author) => filter.authors([author]),
        None => filter,
    }
}

pub fn rsvps(coordinate: &Coordinate) -> Filter {
    Filter::new()
        .kinds([KIND_RSVP])
        .tag("a", [coordinate.to_string()])
}
