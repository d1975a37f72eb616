use anyhow::Result;
use nostrcal_core::coordinate::Coordinate;
use nostrcal_core::relay::Cancellation;

use crate::Query;
use crate::render::render_details;
use crate::utils::tui::relay_spinner;

pub async fn run(query: &Query, coordinate: &Coordinate, cancel: &Cancellation) -> Result<()> {
    let spinner = relay_spinner(query.relay().name());
    let event = query.event(coordinate, cancel).await;
    spinner.finish_and_clear();

    match event? {
        Some(event) => println!("{}", render_details(&event)),
        None => anyhow::bail!("Event '{coordinate}' not found"),
    }
    Ok(())
}
