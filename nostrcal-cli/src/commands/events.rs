use anyhow::Result;
use nostrcal_core::date_range::DateRange;
use nostrcal_core::relay::Cancellation;
use owo_colors::OwoColorize;

use crate::Query;
use crate::render::render_agenda;
use crate::utils::tui::relay_spinner;

pub async fn recent(query: &Query, limit: usize, cancel: &Cancellation) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let events = query.recent(limit, cancel).await;
    spinner.finish_and_clear();

    println!("{}", render_agenda(&events?));
    Ok(())
}

pub async fn upcoming(
    query: &Query,
    limit: usize,
    until: Option<i64>,
    cancel: &Cancellation,
) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let page = query.upcoming(limit, until, cancel).await;
    spinner.finish_and_clear();
    let page = page?;

    println!("{}", render_agenda(&page.events));
    if let Some(cursor) = page.next_cursor {
        println!();
        println!("{}", format!("More: nostrcal upcoming --until {cursor}").dimmed());
    }
    Ok(())
}

pub async fn range(query: &Query, range: &DateRange, cancel: &Cancellation) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let events = query.in_range(range, cancel).await;
    spinner.finish_and_clear();

    println!("{}", render_agenda(&events?));
    Ok(())
}
