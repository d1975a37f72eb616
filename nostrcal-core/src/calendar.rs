//! Calendars (kind 31924): named lists of event coordinates.
//!
//! A calendar does not own its events. Referenced events are authored and
//! stored independently, and references to events that no relay returns are
//! expected.

use serde::{Deserialize, Serialize};

use crate::constants::KIND_CALENDAR;
use crate::coordinate::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub identifier: String,
    pub title: String,
    pub content: String,
    pub events: Vec<Coordinate>,
}

impl Calendar {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(KIND_CALENDAR, &self.pubkey, &self.identifier)
    }
}
