pub mod calendars;
pub mod events;
pub mod new;
pub mod rsvp;
pub mod rsvps;
pub mod search;
pub mod show;
