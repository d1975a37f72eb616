mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nostrcal_core::config::NostrcalConfig;
use nostrcal_core::coordinate::Coordinate;
use nostrcal_core::date_range::DateRange;
use nostrcal_core::query::CalendarQuery;
use nostrcal_core::relay::{Cancellation, RelayProvider};
use nostrcal_core::rsvp::{FreeBusy, RsvpStatus};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub type Query = CalendarQuery<RelayProvider>;

#[derive(Parser)]
#[command(name = "nostrcal")]
#[command(about = "Browse, search and RSVP to Nostr calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest calendar events, in start order
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Events that have not started yet
    Upcoming {
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only events created at or before this unix timestamp (the cursor
        /// printed after each page)
        #[arg(long)]
        until: Option<i64>,
    },
    /// Events overlapping a date range
    Range {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },
    /// Free-text search; a leading '#' also matches that hashtag
    Search {
        query: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one event (kind:pubkey:identifier)
    Show { coordinate: Coordinate },
    /// List calendars
    Calendars {
        /// Only calendars by this pubkey
        #[arg(short, long)]
        author: Option<String>,

        /// Also list each calendar's events
        #[arg(short, long)]
        events: bool,
    },
    /// List RSVPs to an event
    Rsvps { coordinate: Coordinate },
    /// Publish a new calendar event
    New {
        title: String,

        /// Start: a date (2025-03-20), a local time (2025-03-20T15:00) or a unix timestamp
        #[arg(short, long)]
        start: String,

        /// End, in the same form as --start
        #[arg(short, long)]
        end: Option<String>,

        /// IANA timezone for timed events (defaults to the system zone)
        #[arg(long)]
        tz: Option<String>,

        #[arg(short, long)]
        location: Vec<String>,

        #[arg(long = "hashtag")]
        hashtags: Vec<String>,

        #[arg(long)]
        summary: Option<String>,

        /// Event description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Respond to an event
    Rsvp {
        coordinate: Coordinate,

        /// accepted, declined or tentative
        #[arg(short, long, default_value = "accepted")]
        status: RsvpStatus,

        /// free or busy (not allowed when declining)
        #[arg(long)]
        fb: Option<FreeBusy>,

        /// Note to attach
        #[arg(short, long, default_value = "")]
        note: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = NostrcalConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let query = CalendarQuery::new(config.relay_provider()).with_timeout(config.query_timeout());
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Recent { limit } => {
            commands::events::recent(&query, limit.unwrap_or(config.recent_limit), &cancel).await
        }
        Commands::Upcoming { limit, until } => {
            commands::events::upcoming(&query, limit.unwrap_or(config.page_size), until, &cancel).await
        }
        Commands::Range { from, to } => {
            let range = DateRange::from_args(&from, &to).map_err(|e| anyhow::anyhow!(e))?;
            commands::events::range(&query, &range, &cancel).await
        }
        Commands::Search { query: text, limit } => {
            commands::search::run(&query, &text, limit.unwrap_or(config.search_limit), &cancel).await
        }
        Commands::Show { coordinate } => commands::show::run(&query, &coordinate, &cancel).await,
        Commands::Calendars { author, events } => {
            commands::calendars::run(&query, author.as_deref(), events, config.recent_limit, &cancel)
                .await
        }
        Commands::Rsvps { coordinate } => commands::rsvps::run(&query, &coordinate, &cancel).await,
        Commands::New {
            title,
            start,
            end,
            tz,
            location,
            hashtags,
            summary,
            description,
        } => {
            let args = commands::new::NewArgs {
                title,
                start,
                end,
                tz,
                locations: location,
                hashtags,
                summary,
                description,
            };
            commands::new::run(&query, args, &cancel).await
        }
        Commands::Rsvp {
            coordinate,
            status,
            fb,
            note,
        } => commands::rsvp::run(&query, &coordinate, status, fb, note, &cancel).await,
    }
}

/// The first Ctrl-C cancels whatever relay call is in flight.
fn cancel_on_ctrl_c() -> Cancellation {
    let (canceller, cancel) = Cancellation::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupted, cancelling relay calls");
            canceller.cancel();
        }
    });
    cancel
}
