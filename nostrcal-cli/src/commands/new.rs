use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use nostrcal_core::draft::{DraftTiming, EventDraft};
use nostrcal_core::relay::Cancellation;
use nostrcal_core::timezone;
use nostrcal_core::validate::{is_date_string, parse_positive_timestamp};
use owo_colors::OwoColorize;

use crate::Query;
use crate::utils::tui::relay_spinner;

pub struct NewArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub tz: Option<String>,
    pub locations: Vec<String>,
    pub hashtags: Vec<String>,
    pub summary: Option<String>,
    pub description: String,
}

/// A parsed `--start`/`--end` value.
#[derive(Debug, PartialEq, Eq)]
enum When {
    Date(String),
    Time(i64),
}

pub async fn run(query: &Query, args: NewArgs, cancel: &Cancellation) -> Result<()> {
    let tzid = match args.tz {
        Some(tzid) => tzid,
        None => system_timezone(),
    };
    let tz = timezone::resolve(&tzid).with_context(|| format!("Unknown timezone '{tzid}'"))?;

    let timing = timing(&args.start, args.end.as_deref(), &tz, &tzid)?;

    let mut draft = EventDraft::new(args.title, timing);
    draft.locations = args.locations;
    draft.hashtags = args
        .hashtags
        .into_iter()
        .map(|t| t.trim_start_matches('#').to_lowercase())
        .collect();
    draft.summary = args.summary;
    draft.content = args.description;

    let spinner = relay_spinner(query.relay().name());
    let event = query.publish_event(draft, cancel).await;
    spinner.finish_and_clear();
    let event = event?;

    println!("{}", format!("Created: {}", event.title()).green());
    println!("{}", format!("  {}", event.coordinate()).dimmed());
    Ok(())
}

fn system_timezone() -> String {
    iana_time_zone::get_timezone()
        .ok()
        .filter(|tzid| timezone::is_valid_timezone(tzid))
        .unwrap_or_else(|| "UTC".to_string())
}

fn timing(start: &str, end: Option<&str>, tz: &Tz, tzid: &str) -> Result<DraftTiming> {
    let start = parse_when(start, tz)?;
    let end = end.map(|end| parse_when(end, tz)).transpose()?;

    match (start, end) {
        (When::Date(start), None) => Ok(DraftTiming::Dates { start, end: None }),
        (When::Date(start), Some(When::Date(end))) => Ok(DraftTiming::Dates {
            start,
            end: Some(end),
        }),
        (When::Time(start), None) => Ok(times(start, None, tzid)),
        (When::Time(start), Some(When::Time(end))) => Ok(times(start, Some(end), tzid)),
        _ => anyhow::bail!("--start and --end must both be dates or both be times"),
    }
}

fn times(start: i64, end: Option<i64>, tzid: &str) -> DraftTiming {
    DraftTiming::Times {
        start,
        end,
        start_tzid: Some(tzid.to_string()),
        end_tzid: None,
    }
}

/// Accepts `YYYY-MM-DD`, a local `YYYY-MM-DDTHH:MM` (or with a space), or a
/// unix timestamp.
fn parse_when(input: &str, tz: &Tz) -> Result<When> {
    let input = input.trim();

    if is_date_string(input) {
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .with_context(|| format!("Not a calendar date: \"{input}\""))?;
        return Ok(When::Date(input.to_string()));
    }

    if let Some(ts) = parse_positive_timestamp(input) {
        return Ok(When::Time(ts));
    }

    let local = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .with_context(|| format!("Could not parse date/time: \"{input}\""))?;

    let instant = tz
        .from_local_datetime(&local)
        .earliest()
        .with_context(|| format!("\"{input}\" does not exist in {}", tz.name()))?;
    Ok(When::Time(instant.timestamp()))
}
