//! RSVPs (kind 31925) to calendar events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Accepted,
    Declined,
    Tentative,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Accepted => "accepted",
            RsvpStatus::Declined => "declined",
            RsvpStatus::Tentative => "tentative",
        }
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(RsvpStatus::Accepted),
            "declined" => Ok(RsvpStatus::Declined),
            "tentative" => Ok(RsvpStatus::Tentative),
            other => Err(format!("unknown RSVP status '{other}'")),
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the attendee expects to be busy during the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeBusy {
    Free,
    Busy,
}

impl FreeBusy {
    pub fn as_str(self) -> &'static str {
        match self {
            FreeBusy::Free => "free",
            FreeBusy::Busy => "busy",
        }
    }
}

impl FromStr for FreeBusy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(FreeBusy::Free),
            "busy" => Ok(FreeBusy::Busy),
            other => Err(format!("unknown free/busy value '{other}'")),
        }
    }
}

impl fmt::Display for FreeBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response to one calendar event.
///
/// One RSVP per author and event is a protocol convention (the `d` tag is
/// reused); nothing here deduplicates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRsvp {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub identifier: String,
    /// `kind:pubkey:identifier` of the event responded to.
    pub coordinate: String,
    pub status: RsvpStatus,
    /// Always `None` when `status` is declined.
    pub free_busy: Option<FreeBusy>,
    pub event_id: Option<String>,
    pub event_author: Option<String>,
    pub content: String,
}
