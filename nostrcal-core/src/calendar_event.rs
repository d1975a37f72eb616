//! Calendar event domain types (kinds 31922 and 31923).
//!
//! Values are immutable once parsed. An edit is a new event with the same
//! `d` identifier and a later `created_at`.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::event::Kind;
use crate::tags::Participant;

/// Attributes shared by date- and time-based events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    /// The `d` tag, unique per author.
    pub identifier: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub locations: Vec<String>,
    pub geohash: Option<String>,
    pub participants: Vec<Participant>,
    pub hashtags: Vec<String>,
    pub references: Vec<String>,
    /// Coordinates of calendars this event declares itself part of.
    pub calendar_refs: Vec<String>,
}

/// All-day event. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBasedCalendarEvent {
    #[serde(flatten)]
    pub details: EventDetails,
    /// `YYYY-MM-DD`
    pub start: String,
    pub end: Option<String>,
}

/// Event at a point in time. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBasedCalendarEvent {
    #[serde(flatten)]
    pub details: EventDetails,
    /// Unix seconds
    pub start: i64,
    pub end: Option<i64>,
    pub start_tzid: Option<String>,
    pub end_tzid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarEvent {
    DateBased(DateBasedCalendarEvent),
    TimeBased(TimeBasedCalendarEvent),
}

/// Borrowed view of an event's start, for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart<'a> {
    Date(&'a str),
    Time(i64),
}

impl CalendarEvent {
    pub fn details(&self) -> &EventDetails {
        match self {
            CalendarEvent::DateBased(e) => &e.details,
            CalendarEvent::TimeBased(e) => &e.details,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            CalendarEvent::DateBased(_) => Kind::DateEvent,
            CalendarEvent::TimeBased(_) => Kind::TimeEvent,
        }
    }

    pub fn id(&self) -> &str {
        &self.details().id
    }

    pub fn title(&self) -> &str {
        &self.details().title
    }

    pub fn created_at(&self) -> i64 {
        self.details().created_at
    }

    pub fn coordinate(&self) -> Coordinate {
        let details = self.details();
        Coordinate::new(self.kind().as_u16(), &details.pubkey, &details.identifier)
    }

    pub fn start(&self) -> EventStart<'_> {
        match self {
            CalendarEvent::DateBased(e) => EventStart::Date(&e.start),
            CalendarEvent::TimeBased(e) => EventStart::Time(e.start),
        }
    }

    /// Start as unix seconds. Date-based events start at midnight in `tz`.
    pub fn start_timestamp_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<i64> {
        match self.start() {
            EventStart::Time(ts) => Some(ts),
            EventStart::Date(date) => date_start_timestamp(date, tz),
        }
    }

    /// Case-insensitive substring match over title, content, summary and
    /// locations. `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        let details = self.details();
        let hit = |s: &str| s.to_lowercase().contains(needle);

        hit(&details.title)
            || hit(&details.content)
            || details.summary.as_deref().is_some_and(hit)
            || details.locations.iter().any(|l| hit(l))
    }
}

impl From<DateBasedCalendarEvent> for CalendarEvent {
    fn from(event: DateBasedCalendarEvent) -> Self {
        CalendarEvent::DateBased(event)
    }
}

impl From<TimeBasedCalendarEvent> for CalendarEvent {
    fn from(event: TimeBasedCalendarEvent) -> Self {
        CalendarEvent::TimeBased(event)
    }
}

/// Unix seconds at the start of `date` (`YYYY-MM-DD`) in `tz`.
///
/// Uses the earliest instance when midnight is ambiguous and `None` when it
/// does not exist or the date is not a real calendar date.
pub fn date_start_timestamp<Tz: TimeZone>(date: &str, tz: &Tz) -> Option<i64> {
    let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    midnight
        .and_local_timezone(tz.clone())
        .earliest()
        .map(|dt| dt.timestamp())
}
