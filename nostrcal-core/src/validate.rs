//! Structural validation of raw NIP-52 events.
//!
//! Each kind has a `check_*` function that reports why an event is unusable
//! and an `is_valid_*` predicate for callers that only need a yes/no. Neither
//! ever panics on malformed input.

use crate::constants::{KIND_CALENDAR, KIND_DATE_EVENT, KIND_RSVP, KIND_TIME_EVENT};
use crate::error::ValidationError;
use crate::event::RawEvent;
use crate::tags::{first_value, has_tag};
use crate::timezone::is_valid_timezone;

pub fn is_valid_calendar_event(event: &RawEvent) -> bool {
    check_calendar_event(event).is_ok()
}

pub fn is_valid_calendar(event: &RawEvent) -> bool {
    check_calendar(event).is_ok()
}

pub fn is_valid_calendar_event_rsvp(event: &RawEvent) -> bool {
    check_calendar_event_rsvp(event).is_ok()
}

/// Kinds 31922 and 31923.
pub fn check_calendar_event(event: &RawEvent) -> Result<(), ValidationError> {
    if event.kind != KIND_DATE_EVENT && event.kind != KIND_TIME_EVENT {
        return Err(ValidationError::WrongKind(event.kind));
    }

    let tags = &event.tags;
    require(first_value(tags, "d"), "d")?;
    require(first_value(tags, "title"), "title")?;
    let start = require(first_value(tags, "start"), "start")?;
    let end = first_value(tags, "end");

    if event.kind == KIND_DATE_EVENT {
        if !is_date_string(start) {
            return Err(ValidationError::MalformedDate(start.to_string()));
        }
        if let Some(end) = end {
            if !is_date_string(end) {
                return Err(ValidationError::MalformedDate(end.to_string()));
            }
            // Zero-padded ISO dates order lexicographically.
            if end <= start {
                return Err(ValidationError::EndNotAfterStart);
            }
        }
        return Ok(());
    }

    let start_ts = parse_positive_timestamp(start)
        .ok_or_else(|| ValidationError::InvalidTimestamp(start.to_string()))?;
    if let Some(end) = end {
        let end_ts = parse_positive_timestamp(end)
            .ok_or_else(|| ValidationError::InvalidTimestamp(end.to_string()))?;
        if end_ts <= start_ts {
            return Err(ValidationError::EndNotAfterStart);
        }
    }

    for key in ["start_tzid", "end_tzid"] {
        if let Some(tzid) = first_value(tags, key)
            && !is_valid_timezone(tzid)
        {
            return Err(ValidationError::UnknownTimezone(tzid.to_string()));
        }
    }

    Ok(())
}

/// Kind 31924.
pub fn check_calendar(event: &RawEvent) -> Result<(), ValidationError> {
    if event.kind != KIND_CALENDAR {
        return Err(ValidationError::WrongKind(event.kind));
    }
    require(first_value(&event.tags, "d"), "d")?;
    require(first_value(&event.tags, "title"), "title")?;
    Ok(())
}

/// Kind 31925.
pub fn check_calendar_event_rsvp(event: &RawEvent) -> Result<(), ValidationError> {
    if event.kind != KIND_RSVP {
        return Err(ValidationError::WrongKind(event.kind));
    }

    let tags = &event.tags;
    require(first_value(tags, "d"), "d")?;
    let status = require(first_value(tags, "status"), "status")?;
    if !has_tag(tags, "a") {
        return Err(ValidationError::MissingTag("a"));
    }

    if !matches!(status, "accepted" | "declined" | "tentative") {
        return Err(ValidationError::UnknownStatus(status.to_string()));
    }

    if has_tag(tags, "fb") {
        if status == "declined" {
            return Err(ValidationError::FreeBusyOnDeclined);
        }
        let fb = first_value(tags, "fb").unwrap_or_default();
        if !matches!(fb, "free" | "busy") {
            return Err(ValidationError::UnknownFreeBusy(fb.to_string()));
        }
    }

    let coordinate = first_value(tags, "a").unwrap_or_default();
    if !is_event_coordinate(coordinate) {
        return Err(ValidationError::InvalidCoordinate(coordinate.to_string()));
    }

    Ok(())
}

fn require<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ValidationError> {
    value.ok_or(ValidationError::MissingTag(key))
}

/// `^\d{4}-\d{2}-\d{2}$`, shape only; `2025-02-30` passes.
pub fn is_date_string(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Base-10 unix seconds, strictly positive.
pub fn parse_positive_timestamp(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|ts| *ts > 0)
}

/// At least three `:`-separated parts, the first naming a calendar event kind.
fn is_event_coordinate(coordinate: &str) -> bool {
    let parts: Vec<&str> = coordinate.split(':').collect();
    parts.len() >= 3
        && matches!(
            parts[0].parse::<u16>(),
            Ok(KIND_DATE_EVENT) | Ok(KIND_TIME_EVENT)
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tag;

    fn raw(kind: u16, tags: &[&[&str]]) -> RawEvent {
        RawEvent {
            id: "id".into(),
            pubkey: "pub".into(),
            kind,
            created_at: 1_700_000_000,
            content: String::new(),
            tags: tags.iter().map(|t| Tag::new(t.iter().copied())).collect(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_date_event_with_end_after_start() {
        let event = raw(
            31922,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"], &["end", "2025-06-03"]],
        );
        assert!(is_valid_calendar_event(&event));
    }

    #[test]
    fn test_date_event_end_before_start() {
        let event = raw(
            31922,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"], &["end", "2025-05-30"]],
        );
        assert_eq!(check_calendar_event(&event), Err(ValidationError::EndNotAfterStart));
    }

    #[test]
    fn test_date_event_end_equal_start() {
        let event = raw(
            31922,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"], &["end", "2025-06-01"]],
        );
        assert!(!is_valid_calendar_event(&event));
    }

    #[test]
    fn test_date_event_malformed_dates() {
        for start in ["2025-6-01", "2025/06/01", "20250601", "2025-06-01T10:00", "２０２５-06-01"] {
            let event = raw(31922, &[&["d", "abc"], &["title", "Meetup"], &["start", start]]);
            assert!(!is_valid_calendar_event(&event), "{start} should be rejected");
        }

        let bad_end = raw(
            31922,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"], &["end", "soon"]],
        );
        assert!(!is_valid_calendar_event(&bad_end));
    }

    #[test]
    fn test_time_event_end_equal_start() {
        let event = raw(
            31923,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "1717200000"], &["end", "1717200000"]],
        );
        assert_eq!(check_calendar_event(&event), Err(ValidationError::EndNotAfterStart));
    }

    #[test]
    fn test_time_event_timestamps() {
        let ok = raw(
            31923,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "1717200000"], &["end", "1717203600"]],
        );
        assert!(is_valid_calendar_event(&ok));

        for start in ["0", "-5", "tomorrow", "", "17172e5"] {
            let event = raw(31923, &[&["d", "abc"], &["title", "Meetup"], &["start", start]]);
            assert!(!is_valid_calendar_event(&event), "{start:?} should be rejected");
        }

        let bad_end = raw(
            31923,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "1717200000"], &["end", "later"]],
        );
        assert!(!is_valid_calendar_event(&bad_end));
    }

    #[test]
    fn test_time_event_timezones() {
        let ok = raw(
            31923,
            &[
                &["d", "abc"],
                &["title", "Meetup"],
                &["start", "1717200000"],
                &["start_tzid", "Europe/Berlin"],
                &["end_tzid", "America/Chicago"],
            ],
        );
        assert!(is_valid_calendar_event(&ok));

        let bad_end_zone = raw(
            31923,
            &[
                &["d", "abc"],
                &["title", "Meetup"],
                &["start", "1717200000"],
                &["start_tzid", "Europe/Berlin"],
                &["end_tzid", "Europe/Atlantis"],
            ],
        );
        assert_eq!(
            check_calendar_event(&bad_end_zone),
            Err(ValidationError::UnknownTimezone("Europe/Atlantis".into()))
        );
    }

    #[test]
    fn test_missing_required_tags() {
        let full: [&[&str]; 3] = [&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"]];
        for skip in 0..full.len() {
            let tags: Vec<&[&str]> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, t)| *t)
                .collect();
            assert!(!is_valid_calendar_event(&raw(31922, &tags)));
        }
        assert!(!is_valid_calendar_event(&raw(31923, &[&["d", "abc"], &["title", "x"]])));
    }

    #[test]
    fn test_calendar_event_wrong_kind() {
        let event = raw(1, &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"]]);
        assert_eq!(check_calendar_event(&event), Err(ValidationError::WrongKind(1)));
    }

    #[test]
    fn test_calendar() {
        assert!(is_valid_calendar(&raw(31924, &[&["d", "cal"], &["title", "Community"]])));
        assert!(!is_valid_calendar(&raw(31924, &[&["d", "cal"]])));
        assert!(!is_valid_calendar(&raw(31924, &[&["title", "Community"]])));
        assert!(!is_valid_calendar(&raw(31923, &[&["d", "cal"], &["title", "Community"]])));
    }

    #[test]
    fn test_rsvp_declined_with_free_busy() {
        let event = raw(
            31925,
            &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status", "declined"], &["fb", "busy"]],
        );
        assert_eq!(check_calendar_event_rsvp(&event), Err(ValidationError::FreeBusyOnDeclined));

        let valueless_fb = raw(
            31925,
            &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status", "declined"], &["fb"]],
        );
        assert!(!is_valid_calendar_event_rsvp(&valueless_fb));
    }

    #[test]
    fn test_rsvp_accepted_with_free_busy() {
        let event = raw(
            31925,
            &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status", "accepted"], &["fb", "busy"]],
        );
        assert!(is_valid_calendar_event_rsvp(&event));
    }

    #[test]
    fn test_rsvp_rejects_bad_values() {
        let bad_status = raw(31925, &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status", "maybe"]]);
        assert!(!is_valid_calendar_event_rsvp(&bad_status));

        let bad_fb = raw(
            31925,
            &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status", "tentative"], &["fb", "away"]],
        );
        assert!(!is_valid_calendar_event_rsvp(&bad_fb));

        let no_a = raw(31925, &[&["d", "r1"], &["status", "accepted"]]);
        assert_eq!(check_calendar_event_rsvp(&no_a), Err(ValidationError::MissingTag("a")));

        let no_d = raw(31925, &[&["a", "31923:pub1:ev1"], &["status", "accepted"]]);
        assert!(!is_valid_calendar_event_rsvp(&no_d));
    }

    #[test]
    fn test_rsvp_missing_status() {
        let no_status = raw(31925, &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["fb", "free"]]);
        assert_eq!(
            check_calendar_event_rsvp(&no_status),
            Err(ValidationError::MissingTag("status"))
        );
        assert!(!is_valid_calendar_event_rsvp(&no_status));

        let valueless = raw(31925, &[&["a", "31923:pub1:ev1"], &["d", "r1"], &["status"]]);
        assert!(!is_valid_calendar_event_rsvp(&valueless));
    }

    #[test]
    fn test_rsvp_coordinate_shape() {
        for coordinate in ["31923:pub1", "31924:pub1:cal", "x:pub1:ev1"] {
            let event = raw(31925, &[&["a", coordinate], &["d", "r1"], &["status", "accepted"]]);
            assert!(!is_valid_calendar_event_rsvp(&event), "{coordinate} should be rejected");
        }
        let date_event = raw(31925, &[&["a", "31922:pub1:ev1"], &["d", "r1"], &["status", "accepted"]]);
        assert!(is_valid_calendar_event_rsvp(&date_event));
    }

    #[test]
    fn test_is_date_string() {
        assert!(is_date_string("2025-06-01"));
        assert!(is_date_string("2025-02-30"));
        assert!(!is_date_string("2025-06-1"));
        assert!(!is_date_string(" 2025-06-01"));
    }
}
