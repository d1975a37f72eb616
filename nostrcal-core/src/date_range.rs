//! Half-open date range for range queries.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::calendar_event::{CalendarEvent, EventStart};

/// `[from, to)`. Time-based events are compared on unix seconds and
/// date-based events on `YYYY-MM-DD` strings of the bounds in the
/// observer's zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Parse CLI-style dates. `from` is the start of its day and `to` the
    /// start of the day after it, both in the local zone, so `--to` is
    /// inclusive of the named day.
    pub fn from_args(from: &str, to: &str) -> Result<Self, String> {
        Self::from_args_in(from, to, &Local)
    }

    pub fn from_args_in<Tz: TimeZone>(from: &str, to: &str, tz: &Tz) -> Result<Self, String> {
        let from_date = parse_date(from)?;
        let to_date = parse_date(to)?
            .succ_opt()
            .ok_or_else(|| format!("Date '{to}' is out of range"))?;

        let range = DateRange {
            from: start_of_day(from_date, tz)?,
            to: start_of_day(to_date, tz)?,
        };
        if range.to <= range.from {
            return Err(format!("'{to}' is before '{from}'"));
        }
        Ok(range)
    }

    /// Whether `event` overlaps the range, using `tz` for date bounds.
    ///
    /// An event with an end overlaps when it starts before `to` and ends
    /// after `from`. One without an end is a point at its start.
    pub fn overlaps_in<Tz: TimeZone>(&self, event: &CalendarEvent, tz: &Tz) -> bool {
        match (event, event.start()) {
            (CalendarEvent::TimeBased(e), EventStart::Time(start)) => {
                overlaps(start, e.end, self.from.timestamp(), self.to.timestamp())
            }
            (CalendarEvent::DateBased(e), EventStart::Date(start)) => {
                let from = date_string(&self.from, tz);
                let to = date_string(&self.to, tz);
                overlaps(start, e.end.as_deref(), from.as_str(), to.as_str())
            }
            _ => false,
        }
    }

    pub fn overlaps(&self, event: &CalendarEvent) -> bool {
        self.overlaps_in(event, &Local)
    }
}

fn overlaps<T: PartialOrd>(start: T, end: Option<T>, from: T, to: T) -> bool {
    match end {
        Some(end) => start < to && end > from,
        None => start >= from && start < to,
    }
}

fn date_string<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, String> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(tz.clone()).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("No local midnight on {date}"))
}
