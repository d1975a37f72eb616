//! Raw event → domain type.
//!
//! These enforce only the fields they need to build a value. Full schema
//! checks live in `validate`; the query paths run both.

use crate::calendar::Calendar;
use crate::calendar_event::{
    CalendarEvent, DateBasedCalendarEvent, EventDetails, TimeBasedCalendarEvent,
};
use crate::coordinate::Coordinate;
use crate::event::{Kind, RawEvent};
use crate::rsvp::{CalendarEventRsvp, RsvpStatus};
use crate::tags::{Participant, all_values, first_value};

/// Parse a kind 31922/31923 event.
///
/// An unparsable time-based `start` drops the event; an unparsable `end` is
/// dropped on its own and the event kept.
pub fn parse_calendar_event(event: &RawEvent) -> Option<CalendarEvent> {
    let kind = Kind::from_u16(event.kind).filter(|k| k.is_calendar_event())?;
    let tags = &event.tags;

    let identifier = first_value(tags, "d")?;
    let title = first_value(tags, "title")?;
    let start = first_value(tags, "start")?;
    let end = first_value(tags, "end");

    let details = EventDetails {
        id: event.id.clone(),
        pubkey: event.pubkey.clone(),
        created_at: event.created_at,
        identifier: identifier.to_string(),
        title: title.to_string(),
        content: event.content.clone(),
        summary: first_value(tags, "summary").map(str::to_string),
        image: first_value(tags, "image").map(str::to_string),
        locations: owned(all_values(tags, "location")),
        geohash: first_value(tags, "g").map(str::to_string),
        participants: tags.iter().filter_map(Participant::from_tag).collect(),
        hashtags: owned(all_values(tags, "t")),
        references: owned(all_values(tags, "r")),
        calendar_refs: owned(all_values(tags, "a")),
    };

    match kind {
        Kind::DateEvent => Some(CalendarEvent::DateBased(DateBasedCalendarEvent {
            details,
            start: start.to_string(),
            end: end.map(str::to_string),
        })),
        Kind::TimeEvent => Some(CalendarEvent::TimeBased(TimeBasedCalendarEvent {
            details,
            start: start.parse().ok()?,
            end: end.and_then(|e| e.parse().ok()),
            start_tzid: first_value(tags, "start_tzid").map(str::to_string),
            end_tzid: first_value(tags, "end_tzid").map(str::to_string),
        })),
        Kind::Calendar | Kind::Rsvp => None,
    }
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

/// Parse a kind 31924 calendar. `a` tags that are not coordinates are skipped.
pub fn parse_calendar(event: &RawEvent) -> Option<Calendar> {
    if Kind::from_u16(event.kind) != Some(Kind::Calendar) {
        return None;
    }

    Some(Calendar {
        id: event.id.clone(),
        pubkey: event.pubkey.clone(),
        created_at: event.created_at,
        identifier: first_value(&event.tags, "d")?.to_string(),
        title: first_value(&event.tags, "title")?.to_string(),
        content: event.content.clone(),
        events: event.tags.iter().filter_map(Coordinate::from_tag).collect(),
    })
}

/// Parse a kind 31925 RSVP. A free/busy value on a declined RSVP is ignored.
pub fn parse_calendar_event_rsvp(event: &RawEvent) -> Option<CalendarEventRsvp> {
    if Kind::from_u16(event.kind) != Some(Kind::Rsvp) {
        return None;
    }
    let tags = &event.tags;

    let status: RsvpStatus = first_value(tags, "status")?.parse().ok()?;
    let free_busy = match status {
        RsvpStatus::Declined => None,
        _ => first_value(tags, "fb").and_then(|fb| fb.parse().ok()),
    };

    Some(CalendarEventRsvp {
        id: event.id.clone(),
        pubkey: event.pubkey.clone(),
        created_at: event.created_at,
        identifier: first_value(tags, "d")?.to_string(),
        coordinate: first_value(tags, "a")?.to_string(),
        status,
        free_busy,
        event_id: first_value(tags, "e").map(str::to_string),
        event_author: first_value(tags, "p").map(str::to_string),
        content: event.content.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tag;
    use crate::rsvp::FreeBusy;

    fn raw(kind: u16, tags: &[&[&str]]) -> RawEvent {
        RawEvent {
            id: "ev1".into(),
            pubkey: "pub1".into(),
            kind,
            created_at: 1_700_000_000,
            content: "Details inside".into(),
            tags: tags.iter().map(|t| Tag::new(t.iter().copied())).collect(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_parse_date_event() {
        let event = raw(
            31922,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "2025-06-01"], &["end", "2025-06-03"]],
        );

        let Some(CalendarEvent::DateBased(parsed)) = parse_calendar_event(&event) else {
            panic!("expected a date-based event");
        };
        assert_eq!(parsed.start, "2025-06-01");
        assert_eq!(parsed.end.as_deref(), Some("2025-06-03"));
        assert_eq!(parsed.details.title, "Meetup");
        assert_eq!(parsed.details.content, "Details inside");
    }

    #[test]
    fn test_parse_collects_lists_and_participants() {
        let event = raw(
            31923,
            &[
                &["d", "abc"],
                &["title", "Meetup"],
                &["start", "1717200000"],
                &["location", "Room A"],
                &["location", "Online"],
                &["g", "u33d"],
                &["p", "pk1"],
                &["p", "pk2", "wss://relay", "host"],
                &["t", "rust"],
                &["r", "https://example.com"],
                &["a", "31924:pub1:community"],
                &["image", "https://example.com/a.png"],
            ],
        );

        let parsed = parse_calendar_event(&event).unwrap();
        let details = parsed.details();
        assert_eq!(details.locations, vec!["Room A", "Online"]);
        assert_eq!(details.geohash.as_deref(), Some("u33d"));
        assert_eq!(details.participants.len(), 2);
        assert_eq!(details.participants[1].role.as_deref(), Some("host"));
        assert_eq!(details.hashtags, vec!["rust"]);
        assert_eq!(details.references, vec!["https://example.com"]);
        assert_eq!(details.calendar_refs, vec!["31924:pub1:community"]);
        assert_eq!(details.image.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_time_event_unparsable_start_drops_event() {
        let event = raw(31923, &[&["d", "abc"], &["title", "Meetup"], &["start", "noon"]]);
        assert_eq!(parse_calendar_event(&event), None);
    }

    #[test]
    fn test_time_event_unparsable_end_drops_only_end() {
        let event = raw(
            31923,
            &[&["d", "abc"], &["title", "Meetup"], &["start", "1717200000"], &["end", "later"]],
        );

        let Some(CalendarEvent::TimeBased(parsed)) = parse_calendar_event(&event) else {
            panic!("expected a time-based event");
        };
        assert_eq!(parsed.start, 1_717_200_000);
        assert_eq!(parsed.end, None);
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(parse_calendar_event(&raw(31922, &[&["d", "abc"], &["start", "2025-06-01"]])), None);
        assert_eq!(
            parse_calendar_event(&raw(31924, &[&["d", "abc"], &["title", "x"], &["start", "2025-06-01"]])),
            None
        );
    }

    #[test]
    fn test_parse_calendar() {
        let event = raw(
            31924,
            &[
                &["d", "community"],
                &["title", "Community"],
                &["a", "31923:pub2:ev1", "wss://relay"],
                &["a", "not-a-coordinate"],
                &["a", "31922:pub3:ev2"],
            ],
        );

        let calendar = parse_calendar(&event).unwrap();
        assert_eq!(calendar.title, "Community");
        assert_eq!(calendar.events.len(), 2);
        assert_eq!(calendar.events[0].relay.as_deref(), Some("wss://relay"));
        assert_eq!(calendar.coordinate().to_string(), "31924:pub1:community");
    }

    #[test]
    fn test_parse_rsvp() {
        let event = raw(
            31925,
            &[
                &["a", "31923:pub2:ev1"],
                &["d", "r1"],
                &["status", "tentative"],
                &["e", "eventid"],
                &["fb", "free"],
                &["p", "pub2"],
            ],
        );

        let rsvp = parse_calendar_event_rsvp(&event).unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Tentative);
        assert_eq!(rsvp.free_busy, Some(FreeBusy::Free));
        assert_eq!(rsvp.event_id.as_deref(), Some("eventid"));
        assert_eq!(rsvp.event_author.as_deref(), Some("pub2"));
        assert_eq!(rsvp.coordinate, "31923:pub2:ev1");
    }

    #[test]
    fn test_parse_declined_rsvp_ignores_free_busy() {
        let event = raw(
            31925,
            &[&["a", "31923:pub2:ev1"], &["d", "r1"], &["status", "declined"], &["fb", "busy"]],
        );
        assert_eq!(parse_calendar_event_rsvp(&event).unwrap().free_busy, None);
    }
}
