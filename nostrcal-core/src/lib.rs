//! Core types for nostrcal.
//!
//! This crate turns raw NIP-52 calendar events fetched from Nostr relays into
//! typed, filtered and ordered calendar views, and builds the wire events for
//! authoring:
//! - `validate` decides whether a raw event satisfies its kind's schema
//! - `codec` maps between raw tag-based events and the domain types
//! - `query` plans relay filters and merges results into calendar views
//! - `relay` is the boundary to whatever actually talks to relays

pub mod calendar;
pub mod calendar_event;
pub mod codec;
pub mod config;
pub mod constants;
pub mod coordinate;
pub mod date_range;
pub mod draft;
pub mod error;
pub mod event;
pub mod query;
pub mod relay;
pub mod rsvp;
pub mod tags;
pub mod timezone;
pub mod validate;

pub use calendar::Calendar;
pub use calendar_event::{CalendarEvent, DateBasedCalendarEvent, TimeBasedCalendarEvent};
pub use coordinate::Coordinate;
pub use error::{CalResult, CalendarError};
pub use event::{Kind, RawEvent, Tag, UnsignedEvent};
pub use rsvp::{CalendarEventRsvp, FreeBusy, RsvpStatus};
