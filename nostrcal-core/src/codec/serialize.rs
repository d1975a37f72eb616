//! Domain type → unsigned wire event.
//!
//! Tag order is fixed so the same value always produces the same event.
//! Id, pubkey, created_at and the signature are left to the publisher.

use crate::calendar::Calendar;
use crate::calendar_event::{CalendarEvent, EventDetails};
use crate::constants::{KIND_CALENDAR, KIND_RSVP};
use crate::event::{Tag, UnsignedEvent};
use crate::rsvp::{CalendarEventRsvp, RsvpStatus};

pub fn serialize_calendar_event(event: &CalendarEvent) -> UnsignedEvent {
    let mut tags = detail_tags(event.details());

    match event {
        CalendarEvent::DateBased(e) => {
            tags.push(Tag::new(["start", e.start.as_str()]));
            if let Some(ref end) = e.end {
                tags.push(Tag::new(["end", end.as_str()]));
            }
        }
        CalendarEvent::TimeBased(e) => {
            tags.push(Tag::new(["start".to_string(), e.start.to_string()]));
            if let Some(end) = e.end {
                tags.push(Tag::new(["end".to_string(), end.to_string()]));
            }
            if let Some(ref tzid) = e.start_tzid {
                tags.push(Tag::new(["start_tzid", tzid.as_str()]));
            }
            if let Some(ref tzid) = e.end_tzid {
                tags.push(Tag::new(["end_tzid", tzid.as_str()]));
            }
        }
    }

    UnsignedEvent {
        kind: event.kind().as_u16(),
        content: event.details().content.clone(),
        tags,
    }
}

/// d, title, [summary], [image], location*, [g], p*, t*, r*, a*
fn detail_tags(details: &EventDetails) -> Vec<Tag> {
    let mut tags = vec![
        Tag::new(["d", details.identifier.as_str()]),
        Tag::new(["title", details.title.as_str()]),
    ];

    if let Some(ref summary) = details.summary {
        tags.push(Tag::new(["summary", summary.as_str()]));
    }
    if let Some(ref image) = details.image {
        tags.push(Tag::new(["image", image.as_str()]));
    }
    for location in &details.locations {
        tags.push(Tag::new(["location", location.as_str()]));
    }
    if let Some(ref geohash) = details.geohash {
        tags.push(Tag::new(["g", geohash.as_str()]));
    }
    tags.extend(details.participants.iter().map(|p| p.to_tag()));
    for hashtag in &details.hashtags {
        tags.push(Tag::new(["t", hashtag.as_str()]));
    }
    for reference in &details.references {
        tags.push(Tag::new(["r", reference.as_str()]));
    }
    for calendar in &details.calendar_refs {
        tags.push(Tag::new(["a", calendar.as_str()]));
    }

    tags
}

/// a, d, status, [e], [fb], [p]
///
/// A free/busy value on a declined RSVP is dropped rather than rejected;
/// `draft::RsvpDraft` is where that combination is refused.
pub fn serialize_calendar_rsvp(rsvp: &CalendarEventRsvp) -> UnsignedEvent {
    let mut tags = vec![
        Tag::new(["a", rsvp.coordinate.as_str()]),
        Tag::new(["d", rsvp.identifier.as_str()]),
        Tag::new(["status", rsvp.status.as_str()]),
    ];

    if let Some(ref event_id) = rsvp.event_id {
        tags.push(Tag::new(["e", event_id.as_str()]));
    }
    if let Some(fb) = rsvp.free_busy
        && rsvp.status != RsvpStatus::Declined
    {
        tags.push(Tag::new(["fb", fb.as_str()]));
    }
    if let Some(ref author) = rsvp.event_author {
        tags.push(Tag::new(["p", author.as_str()]));
    }

    UnsignedEvent {
        kind: KIND_RSVP,
        content: rsvp.content.clone(),
        tags,
    }
}

/// d, title, a*
pub fn serialize_calendar(calendar: &Calendar) -> UnsignedEvent {
    let mut tags = vec![
        Tag::new(["d", calendar.identifier.as_str()]),
        Tag::new(["title", calendar.title.as_str()]),
    ];
    tags.extend(calendar.events.iter().map(|c| c.to_tag()));

    UnsignedEvent {
        kind: KIND_CALENDAR,
        content: calendar.content.clone(),
        tags,
    }
}
