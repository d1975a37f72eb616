//! Timezone identifier validation.
//!
//! The IANA database compiled into `chrono-tz` is the source of truth for
//! which `start_tzid`/`end_tzid` values are acceptable.

use chrono_tz::Tz;

/// Whether `tzid` names a zone in the IANA database.
pub fn is_valid_timezone(tzid: &str) -> bool {
    resolve(tzid).is_some()
}

/// Resolve an IANA identifier, e.g. `"Europe/Berlin"`.
pub fn resolve(tzid: &str) -> Option<Tz> {
    tzid.parse::<Tz>().ok()
}
