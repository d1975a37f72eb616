//! Mapping between raw tag-based events and domain types.

mod parse;
mod serialize;

pub use parse::{parse_calendar, parse_calendar_event, parse_calendar_event_rsvp};
pub use serialize::{serialize_calendar, serialize_calendar_event, serialize_calendar_rsvp};
