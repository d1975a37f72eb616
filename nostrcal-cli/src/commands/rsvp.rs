use anyhow::Result;
use nostrcal_core::coordinate::Coordinate;
use nostrcal_core::draft::RsvpDraft;
use nostrcal_core::relay::Cancellation;
use nostrcal_core::rsvp::{FreeBusy, RsvpStatus};
use owo_colors::OwoColorize;

use crate::Query;
use crate::render::Render;
use crate::utils::tui::relay_spinner;

pub async fn run(
    query: &Query,
    coordinate: &Coordinate,
    status: RsvpStatus,
    free_busy: Option<FreeBusy>,
    note: String,
    cancel: &Cancellation,
) -> Result<()> {
    if status == RsvpStatus::Declined && free_busy.is_some() {
        anyhow::bail!("--fb cannot be used when declining");
    }

    let spinner = relay_spinner(query.relay().name());
    let event = query.event(coordinate, cancel).await;
    spinner.finish_and_clear();
    let Some(event) = event? else {
        anyhow::bail!("Event '{coordinate}' not found");
    };

    let mut draft = RsvpDraft::for_event(&event, status);
    draft.free_busy = free_busy;
    draft.content = note;

    let spinner = relay_spinner(query.relay().name());
    let rsvp = query.publish_rsvp(draft, cancel).await;
    spinner.finish_and_clear();
    let rsvp = rsvp?;

    println!("{} {}", rsvp.status.render(), event.title().bold());
    println!("{}", format!("  {}", rsvp.id).dimmed());
    Ok(())
}
