use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{msg} {spinner}") {
        spinner.set_style(style.tick_strings(&["-", "\\", "|", "/"]));
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Spinner shown while a relay call runs.
pub fn relay_spinner(relay: &str) -> ProgressBar {
    create_spinner(format!("Asking {relay}"))
}
