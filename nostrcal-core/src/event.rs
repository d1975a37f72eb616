//! Raw Nostr wire events.
//!
//! These mirror the JSON a relay hands back. Nothing here is validated; the
//! `validate` module decides whether an event is usable, and the `codec`
//! module turns usable events into domain types.

use serde::{Deserialize, Serialize};

use crate::constants::{KIND_CALENDAR, KIND_DATE_EVENT, KIND_RSVP, KIND_TIME_EVENT};

/// A single tag: `[name, value, ...extras]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Tag(parts.into_iter().map(Into::into).collect())
    }

    /// First element, the tag key.
    pub fn name(&self) -> Option<&str> {
        self.get(0)
    }

    /// Second element, the primary value.
    pub fn value(&self) -> Option<&str> {
        self.get(1)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// A signed event as returned by a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub pubkey: String,
    pub kind: u16,
    pub created_at: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub sig: String,
}

/// The caller-controlled part of an event. Id, pubkey, created_at and the
/// signature are filled in by whoever publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub kind: u16,
    pub content: String,
    pub tags: Vec<Tag>,
}

/// The four NIP-52 kinds this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    DateEvent,
    TimeEvent,
    Calendar,
    Rsvp,
}

impl Kind {
    pub fn from_u16(kind: u16) -> Option<Self> {
        match kind {
            KIND_DATE_EVENT => Some(Kind::DateEvent),
            KIND_TIME_EVENT => Some(Kind::TimeEvent),
            KIND_CALENDAR => Some(Kind::Calendar),
            KIND_RSVP => Some(Kind::Rsvp),
            _ => None,
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Kind::DateEvent => KIND_DATE_EVENT,
            Kind::TimeEvent => KIND_TIME_EVENT,
            Kind::Calendar => KIND_CALENDAR,
            Kind::Rsvp => KIND_RSVP,
        }
    }

    /// Whether this kind is one of the two calendar event kinds.
    pub fn is_calendar_event(self) -> bool {
        matches!(self, Kind::DateEvent | Kind::TimeEvent)
    }
}

impl From<Kind> for u16 {
    fn from(kind: Kind) -> Self {
        kind.as_u16()
    }
}
