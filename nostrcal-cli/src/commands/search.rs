use anyhow::Result;
use nostrcal_core::relay::Cancellation;
use owo_colors::OwoColorize;

use crate::Query;
use crate::render::Render;
use crate::utils::tui::relay_spinner;

pub async fn run(query: &Query, text: &str, limit: usize, cancel: &Cancellation) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Search query is empty");
    }

    let spinner = relay_spinner(query.relay().name());
    let events = query.search(text, limit, cancel).await;
    spinner.finish_and_clear();
    let events = events?;

    if events.is_empty() {
        println!("{}", format!("No events match \"{text}\"").dimmed());
        return Ok(());
    }

    // Relevance order: hashtag hits first, then text matches.
    for event in &events {
        println!("{}", event.render());
        println!("        {}", event.coordinate().to_string().dimmed());
    }
    Ok(())
}
