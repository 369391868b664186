//! farewatch - flight-price watcher
//!
//! Stores standing flight searches, polls the pricing provider on a daily
//! cadence and notifies users by email or Telegram when a matching flight
//! appears.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod app;
mod daemon;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use farewatch_core::request::DATE_FORMAT;
use farewatch_core::{
    AirportDirectory, Contact, PreferenceExtras, PreferenceStore, RawSearchRequest, TripWindow,
    submit_preference,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use settings::{Secrets, Settings};

#[derive(Parser)]
#[command(name = "farewatch")]
#[command(about = "Watch flight prices and get notified when your flight shows up")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one pass over all pending preferences
    Run,

    /// Run once now, then on the configured cron cadence
    Daemon {
        /// Cron expression with seconds, overriding the settings file
        #[arg(long)]
        cron: Option<String>,
    },

    /// Save a standing flight search
    Add(AddArgs),

    /// Look up airports by code, city or name
    Airports {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List pending preferences
    Pending {
        /// Date to list from, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(clap::Args)]
struct AddArgs {
    /// Departure airport code
    #[arg(long)]
    from: String,
    /// Arrival airport code
    #[arg(long)]
    to: String,
    /// Departure date, YYYY-MM-DD
    #[arg(long, requires = "return_date", conflicts_with = "month")]
    departure: Option<String>,
    /// Return date, YYYY-MM-DD
    #[arg(long = "return", requires = "departure")]
    return_date: Option<String>,
    /// Depart on the first day of this month instead (e.g. "august")
    #[arg(long)]
    month: Option<String>,
    /// Year for --month (defaults to the current year)
    #[arg(long, requires = "month")]
    year: Option<i32>,
    /// Trip length in days for --month
    #[arg(long, default_value_t = 7, requires = "month")]
    days: u32,
    /// Currency code
    #[arg(long, default_value = "PLN")]
    currency: String,
    /// Seat class: 1 economy, 2 premium economy, 3 business, 4 first
    #[arg(long, default_value = "1")]
    seat_class: String,
    /// Email address to notify
    #[arg(long)]
    email: Option<String>,
    /// Telegram chat ID or handle to notify
    #[arg(long)]
    telegram: Option<String>,
    /// Highest acceptable price
    #[arg(long)]
    max_price: Option<f64>,
    /// Only notify for this airline
    #[arg(long)]
    airline: Option<String>,
}

const DEFAULT_LOG_FILTER: &str = "farewatch=info,farewatch_core=info,farewatch_provider=info";

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, RUST_LOG may come from it
    let env_file = dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => {
            let store = app::open_store(&settings).await?;
            let scheduler = app::build_scheduler(&settings, &Secrets::from_env(), store)?;
            let report = scheduler.run_once().await.context("Run failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Daemon { cron } => {
            info!("Starting farewatch daemon");
            let store = app::open_store(&settings).await?;
            let scheduler = app::build_scheduler(&settings, &Secrets::from_env(), store)?;
            let cron = cron.unwrap_or_else(|| settings.scheduler.cron.clone());
            daemon::run(Arc::new(scheduler), &cron).await?;
        }
        Commands::Add(args) => add(&settings, args).await?,
        Commands::Airports { query, limit } => {
            let directory = app::load_airports(&settings)?;
            print_airports(&directory, &query, limit);
        }
        Commands::Pending { as_of } => {
            let as_of = match as_of {
                Some(value) => NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
                    .with_context(|| format!("Invalid date '{value}', use YYYY-MM-DD"))?,
                None => Local::now().date_naive(),
            };
            let store = app::open_store(&settings).await?;
            let pending = store.list_pending(as_of).await?;
            if pending.is_empty() {
                println!("No pending preferences");
            }
            for item in pending {
                let request = &item.preference.request;
                let channels: Vec<&str> = item.owner.channels.iter().map(|c| c.as_str()).collect();
                println!(
                    "#{} {} -> {} {}..{} {} {} [{}]",
                    item.preference.id,
                    request.departure_airport(),
                    request.arrival_airport(),
                    request.target_departure(),
                    request.return_date(),
                    request.seat_class(),
                    request.currency(),
                    channels.join(", ")
                );
            }
        }
    }

    Ok(())
}

async fn add(settings: &Settings, args: AddArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let mut raw = RawSearchRequest {
        target_departure: args.departure.unwrap_or_default(),
        return_date: args.return_date.unwrap_or_default(),
        departure_airport: args.from,
        arrival_airport: args.to,
        currency: args.currency,
        seat_class: args.seat_class,
    };
    if let Some(month) = &args.month {
        let year = args.year.unwrap_or_else(|| today.year());
        let window = TripWindow::from_month(month, year, args.days)?;
        window.apply_to(&mut raw);
    }

    let contact = Contact {
        email: args.email,
        telegram_handle: args.telegram,
    };
    let extras = PreferenceExtras {
        max_price: args.max_price,
        preferred_airline: args.airline,
    };

    let directory = app::load_airports(settings)?;
    let store = app::open_store(settings).await?;
    let id =
        submit_preference(store.as_ref(), &directory, &raw, &contact, &extras, today).await?;
    println!("Saved preference #{id}");
    Ok(())
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

fn print_airports(directory: &AirportDirectory, query: &str, limit: usize) {
    let results = directory.search(query, limit);
    if results.is_empty() {
        println!("No airports match '{query}'");
    }
    for airport in results {
        println!("{}", airport.display());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_filter_reads_rust_log_loaded_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "RUST_LOG=farewatch=trace").unwrap();

        dotenvy::from_path_override(file.path()).unwrap();
        assert_eq!(log_filter().to_string(), "farewatch=trace");
    }
}
