//! Terminal rendering for nostrcal-core types.
//!
//! Extension traits that add colored output to calendar events, calendars
//! and RSVPs using owo_colors.

use chrono::{DateTime, Local, NaiveDate};
use nostrcal_core::calendar::Calendar;
use nostrcal_core::calendar_event::{CalendarEvent, EventStart};
use nostrcal_core::rsvp::{CalendarEventRsvp, RsvpStatus};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let mut line = format!("{} {}", format_time(self), self.title());
        if let Some(location) = self.details().locations.first() {
            line.push(' ');
            line.push_str(&format!("@ {location}").dimmed().to_string());
        }
        line
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        let count = format!("({} {})", self.events.len(), pluralize("event", self.events.len()));
        format!("📅 {} {}", self.title, count.dimmed())
    }
}

impl Render for RsvpStatus {
    fn render(&self) -> String {
        match self {
            RsvpStatus::Accepted => self.as_str().green().to_string(),
            RsvpStatus::Tentative => self.as_str().yellow().to_string(),
            RsvpStatus::Declined => self.as_str().red().to_string(),
        }
    }
}

impl Render for CalendarEventRsvp {
    fn render(&self) -> String {
        let mut line = format!("{:<9} {}", self.status.render(), short_key(&self.pubkey));
        if let Some(fb) = self.free_busy {
            line.push_str(&format!(" [{fb}]").dimmed().to_string());
        }
        if !self.content.is_empty() {
            line.push_str(&format!(" \"{}\"", self.content));
        }
        line
    }
}

/// Events grouped under day headings, in the order given.
pub fn render_agenda(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut lines = Vec::new();
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = format_date_label(event);
        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date_label.bold().to_string());
            current_date = Some(date_label);
        }
        lines.push(format!("  {}", event.render()));
    }

    lines.join("\n")
}

/// Every field worth showing for a single event.
pub fn render_details(event: &CalendarEvent) -> String {
    let details = event.details();
    let mut lines = vec![
        event.title().bold().to_string(),
        format!("{} {}", "when:".dimmed(), format_span(event)),
    ];

    for location in &details.locations {
        lines.push(format!("{} {location}", "where:".dimmed()));
    }
    if let Some(summary) = &details.summary {
        lines.push(format!("{} {summary}", "summary:".dimmed()));
    }
    if !details.hashtags.is_empty() {
        let tags: Vec<String> = details.hashtags.iter().map(|t| format!("#{t}")).collect();
        lines.push(format!("{} {}", "tags:".dimmed(), tags.join(" ")));
    }
    for participant in &details.participants {
        let role = participant.role.as_deref().unwrap_or("participant");
        lines.push(format!("{} {} ({role})", "with:".dimmed(), short_key(&participant.pubkey)));
    }
    for reference in &details.references {
        lines.push(format!("{} {reference}", "link:".dimmed()));
    }
    if !details.content.is_empty() {
        lines.push(String::new());
        lines.push(details.content.clone());
    }
    lines.push(String::new());
    lines.push(event.coordinate().to_string().dimmed().to_string());

    lines.join("\n")
}

/// Day heading for an event (e.g. "Today", "Tomorrow", "Wed Feb 25").
fn format_date_label(event: &CalendarEvent) -> String {
    let Some(date) = start_date(event) else {
        return "Unknown date".to_string();
    };
    let today = Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Time column of an agenda line (e.g. "  15:00" or "all-day").
fn format_time(event: &CalendarEvent) -> String {
    match event.start() {
        EventStart::Date(_) => "all-day".to_string(),
        EventStart::Time(ts) => match local_time(ts) {
            Some(dt) => format!("{:>7}", dt.format("%H:%M")),
            None => format!("{:>7}", "?"),
        },
    }
}

fn format_span(event: &CalendarEvent) -> String {
    match event {
        CalendarEvent::DateBased(e) => match &e.end {
            Some(end) => format!("{} until {end}", e.start),
            None => e.start.clone(),
        },
        CalendarEvent::TimeBased(e) => {
            let show = |ts: i64| match local_time(ts) {
                Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
                None => ts.to_string(),
            };
            let mut span = show(e.start);
            if let Some(end) = e.end {
                span.push_str(&format!(" - {}", show(end)));
            }
            if let Some(tzid) = &e.start_tzid {
                span.push_str(&format!(" ({tzid})"));
            }
            span
        }
    }
}

fn start_date(event: &CalendarEvent) -> Option<NaiveDate> {
    match event.start() {
        EventStart::Date(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        EventStart::Time(ts) => local_time(ts).map(|dt| dt.date_naive()),
    }
}

fn local_time(ts: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&Local))
}

/// First and last few characters of a hex key.
pub fn short_key(key: &str) -> String {
    if key.len() <= 16 || !key.is_ascii() {
        return key.to_string();
    }
    format!("{}…{}", &key[..8], &key[key.len() - 4..])
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 { word.to_string() } else { format!("{word}s") }
}
