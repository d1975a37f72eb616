use anyhow::Result;
use nostrcal_core::coordinate::Coordinate;
use nostrcal_core::relay::Cancellation;
use nostrcal_core::rsvp::RsvpStatus;
use owo_colors::OwoColorize;

use crate::Query;
use crate::render::Render;
use crate::utils::tui::relay_spinner;

pub async fn run(query: &Query, coordinate: &Coordinate, cancel: &Cancellation) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let rsvps = query.rsvps(coordinate, cancel).await;
    spinner.finish_and_clear();
    let rsvps = rsvps?;

    if rsvps.is_empty() {
        println!("{}", "No RSVPs yet".dimmed());
        return Ok(());
    }

    for rsvp in &rsvps {
        println!("  {}", rsvp.render());
    }

    let count = |status: RsvpStatus| rsvps.iter().filter(|r| r.status == status).count();
    println!();
    println!(
        "{}",
        format!(
            "{} accepted, {} tentative, {} declined",
            count(RsvpStatus::Accepted),
            count(RsvpStatus::Tentative),
            count(RsvpStatus::Declined)
        )
        .dimmed()
    );
    Ok(())
}
