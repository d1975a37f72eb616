//! Authoring new events and RSVPs.
//!
//! A draft is checked before any wire event is built, so a caller learns
//! which precondition failed instead of publishing something that every
//! reader would drop.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::calendar_event::{
    CalendarEvent, DateBasedCalendarEvent, EventDetails, TimeBasedCalendarEvent,
};
use crate::constants::{KIND_DATE_EVENT, KIND_TIME_EVENT};
use crate::coordinate::Coordinate;
use crate::error::DraftError;
use crate::rsvp::{CalendarEventRsvp, FreeBusy, RsvpStatus};
use crate::tags::Participant;
use crate::timezone::is_valid_timezone;
use crate::validate::is_date_string;

/// Fresh random `d` identifier. Public, so uniqueness per author is all
/// that matters.
pub fn new_identifier() -> String {
    Uuid::new_v4().simple().to_string()
}

/// When an event happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTiming {
    /// All-day, `YYYY-MM-DD`, end exclusive.
    Dates { start: String, end: Option<String> },
    /// Unix seconds, end exclusive.
    Times {
        start: i64,
        end: Option<i64>,
        start_tzid: Option<String>,
        end_tzid: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Reuse an existing identifier to supersede that event.
    pub identifier: Option<String>,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub locations: Vec<String>,
    pub geohash: Option<String>,
    pub participants: Vec<Participant>,
    pub hashtags: Vec<String>,
    pub references: Vec<String>,
    pub calendar_refs: Vec<String>,
    pub timing: DraftTiming,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, timing: DraftTiming) -> Self {
        EventDraft {
            identifier: None,
            title: title.into(),
            content: String::new(),
            summary: None,
            image: None,
            locations: Vec::new(),
            geohash: None,
            participants: Vec::new(),
            hashtags: Vec::new(),
            references: Vec::new(),
            calendar_refs: Vec::new(),
            timing,
        }
    }

    /// Start an edit of an existing event. Building it keeps the identifier,
    /// so the published result replaces `event`.
    pub fn from_event(event: &CalendarEvent) -> Self {
        let details = event.details().clone();
        let timing = match event {
            CalendarEvent::DateBased(e) => DraftTiming::Dates {
                start: e.start.clone(),
                end: e.end.clone(),
            },
            CalendarEvent::TimeBased(e) => DraftTiming::Times {
                start: e.start,
                end: e.end,
                start_tzid: e.start_tzid.clone(),
                end_tzid: e.end_tzid.clone(),
            },
        };

        EventDraft {
            identifier: Some(details.identifier),
            title: details.title,
            content: details.content,
            summary: details.summary,
            image: details.image,
            locations: details.locations,
            geohash: details.geohash,
            participants: details.participants,
            hashtags: details.hashtags,
            references: details.references,
            calendar_refs: details.calendar_refs,
            timing,
        }
    }

    /// Check preconditions and produce the event value. Id, pubkey and
    /// created_at stay empty until the relay returns the signed event.
    pub fn build(self) -> Result<CalendarEvent, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        check_timing(&self.timing)?;

        let details = EventDetails {
            id: String::new(),
            pubkey: String::new(),
            created_at: 0,
            identifier: self.identifier.unwrap_or_else(new_identifier),
            title: self.title,
            content: self.content,
            summary: self.summary,
            image: self.image,
            locations: self.locations,
            geohash: self.geohash,
            participants: self.participants.into_iter().map(Participant::normalized).collect(),
            hashtags: self.hashtags,
            references: self.references,
            calendar_refs: self.calendar_refs,
        };

        Ok(match self.timing {
            DraftTiming::Dates { start, end } => {
                CalendarEvent::DateBased(DateBasedCalendarEvent { details, start, end })
            }
            DraftTiming::Times {
                start,
                end,
                start_tzid,
                end_tzid,
            } => CalendarEvent::TimeBased(TimeBasedCalendarEvent {
                details,
                start,
                end,
                start_tzid,
                end_tzid,
            }),
        })
    }
}

fn check_timing(timing: &DraftTiming) -> Result<(), DraftError> {
    match timing {
        DraftTiming::Dates { start, end } => {
            check_date(start)?;
            if let Some(end) = end {
                check_date(end)?;
                if end <= start {
                    return Err(DraftError::EndNotAfterStart);
                }
            }
        }
        DraftTiming::Times {
            start,
            end,
            start_tzid,
            end_tzid,
        } => {
            if *start <= 0 {
                return Err(DraftError::NonPositiveTimestamp(*start));
            }
            if let Some(end) = end
                && end <= start
            {
                return Err(DraftError::EndNotAfterStart);
            }
            for tzid in [start_tzid, end_tzid].into_iter().flatten() {
                if !is_valid_timezone(tzid) {
                    return Err(DraftError::UnknownTimezone(tzid.clone()));
                }
            }
        }
    }
    Ok(())
}

/// Shape and a real calendar day.
fn check_date(date: &str) -> Result<(), DraftError> {
    if is_date_string(date) && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(DraftError::MalformedDate(date.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpDraft {
    /// Reuse an earlier RSVP's identifier to change the answer.
    pub identifier: Option<String>,
    pub coordinate: String,
    pub status: RsvpStatus,
    pub free_busy: Option<FreeBusy>,
    pub event_id: Option<String>,
    pub event_author: Option<String>,
    pub content: String,
}

impl RsvpDraft {
    pub fn new(coordinate: impl Into<String>, status: RsvpStatus) -> Self {
        RsvpDraft {
            identifier: None,
            coordinate: coordinate.into(),
            status,
            free_busy: None,
            event_id: None,
            event_author: None,
            content: String::new(),
        }
    }

    /// Respond to a fetched event, referencing it by coordinate, id and author.
    pub fn for_event(event: &CalendarEvent, status: RsvpStatus) -> Self {
        let details = event.details();
        let mut draft = RsvpDraft::new(event.coordinate().to_string(), status);
        draft.event_id = (!details.id.is_empty()).then(|| details.id.clone());
        draft.event_author = Some(details.pubkey.clone());
        draft
    }

    pub fn with_free_busy(mut self, free_busy: FreeBusy) -> Self {
        self.free_busy = Some(free_busy);
        self
    }

    pub fn build(self) -> Result<CalendarEventRsvp, DraftError> {
        if self.status == RsvpStatus::Declined && self.free_busy.is_some() {
            return Err(DraftError::FreeBusyOnDeclined);
        }

        let coordinate: Coordinate = self
            .coordinate
            .parse()
            .map_err(|_| DraftError::InvalidCoordinate(self.coordinate.clone()))?;
        if coordinate.kind != KIND_DATE_EVENT && coordinate.kind != KIND_TIME_EVENT {
            return Err(DraftError::InvalidCoordinate(self.coordinate));
        }

        Ok(CalendarEventRsvp {
            id: String::new(),
            pubkey: String::new(),
            created_at: 0,
            identifier: self.identifier.unwrap_or_else(new_identifier),
            coordinate: self.coordinate,
            status: self.status,
            free_busy: self.free_busy,
            event_id: self.event_id,
            event_author: self.event_author,
            content: self.content,
        })
    }
}
