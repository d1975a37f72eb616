use anyhow::Result;
use nostrcal_core::relay::Cancellation;
use owo_colors::OwoColorize;

use crate::Query;
use crate::render::{Render, render_agenda};
use crate::utils::tui::relay_spinner;

pub async fn run(
    query: &Query,
    author: Option<&str>,
    with_events: bool,
    limit: usize,
    cancel: &Cancellation,
) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let calendars = query.calendars(author, limit, cancel).await;
    spinner.finish_and_clear();
    let calendars = calendars?;

    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for (i, calendar) in calendars.iter().enumerate() {
        if i > 0 && with_events {
            println!();
        }
        println!("{}", calendar.render());
        println!("   {}", calendar.coordinate().to_string().dimmed());

        if with_events {
            let events = query.calendar_events(calendar, cancel).await?;
            println!();
            println!("{}", render_agenda(&events));
        }
    }
    Ok(())
}
