//! # Vacancy Grabber
//!
//! A periodic scraper for job vacancies. Every run fetches a fixed
//! number of listing pages from career.habr.com, extracts one [`Post`]
//! per vacancy card (following each card's link for the long
//! description), and persists the batch with duplicate suppression keyed
//! on the vacancy link. Accumulated records are served as a plain-text
//! dump to anyone who connects to the result port.
//!
//! ## Usage
//!
//! ```sh
//! vacancy_grabber --interval 60 --port 9000 --database-url sqlite:vacancies.db
//! ```
//!
//! ## Architecture
//!
//! Two long-lived tasks share one store and nothing else:
//! 1. **Scheduler** ([`Grabber`]): fetch → extract → save, once per
//!    interval, starting immediately. A failed run waits for the next tick.
//! 2. **Result server** ([`ResultServer`]): accept loop that dumps every
//!    stored post to each client.
//!
//! [`Post`]: models::Post

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod datetime;
mod error;
mod fetch;
mod models;
mod parse;
mod scheduler;
mod server;
mod store;

use cli::Cli;
use datetime::HabrDateTimeParser;
use fetch::HttpFetcher;
use parse::HabrCareerParse;
use scheduler::Grabber;
use server::ResultServer;
use store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    info!(
        page_url = %args.page_url,
        pages = args.pages,
        interval_secs = args.interval,
        port = args.port,
        "vacancy_grabber starting up"
    );

    let store = Arc::new(SqliteStore::connect(&args.database_url).await?);
    let parse = HabrCareerParse::new(HttpFetcher::new(), HabrDateTimeParser);
    let grabber = Grabber::new(
        parse,
        Arc::clone(&store),
        args.page_url,
        args.pages,
        Duration::from_secs(args.interval),
    );

    let server = ResultServer::new(Arc::clone(&store), args.port);
    let listener = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            error!(error = %e, "Result server stopped");
        }
    });

    // The grab loop runs until an external shutdown signal arrives.
    tokio::select! {
        _ = grabber.run() => {}
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received; stopping"),
    }
    listener.abort();

    Ok(())
}
