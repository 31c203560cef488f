//! Command-line interface for the vacancy grabber.
//!
//! Every knob the core needs arrives here: listing URL, page count, poll
//! interval, listener port and database URL. All of them can come from
//! flags or environment variables; the parsed value is decomposed in
//! `main` and threaded explicitly into the components, never looked up
//! globally afterwards.

use clap::Parser;

/// Runtime configuration for the grabber.
///
/// # Examples
///
/// ```sh
/// # Defaults: java_developer listing, 5 pages, every 60 seconds, port 9000
/// vacancy_grabber
///
/// # A faster poll against a local database file
/// vacancy_grabber --interval 10 --database-url sqlite:dev.db
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page URL; the page number is appended verbatim
    #[arg(
        long,
        env = "GRABBER_PAGE_URL",
        default_value = "https://career.habr.com/vacancies/java_developer?page="
    )]
    pub page_url: String,

    /// Number of listing pages fetched per run
    #[arg(long, env = "GRABBER_PAGES", default_value_t = 5)]
    pub pages: u32,

    /// Seconds between grab runs
    #[arg(long, env = "GRABBER_INTERVAL", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// TCP port the result listener binds
    #[arg(short, long, env = "GRABBER_PORT", default_value_t = 9000)]
    pub port: u16,

    /// Database URL for the vacancy store
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:vacancies.db")]
    pub database_url: String,
}
