//! Error taxonomy for the grab pipeline.
//!
//! The boundaries matter more than the variants: a listing-page fetch
//! failure aborts the whole run, a malformed card or timestamp only costs
//! that card, a store failure only costs that save, and nothing anywhere
//! is allowed to take the process down. Detail-page and listener failures
//! never even surface as values; they are logged where they happen.

use thiserror::Error;

/// Everything that can go wrong between a scheduler tick and the saved batch.
#[derive(Debug, Error)]
pub enum GrabError {
    /// A listing page could not be fetched. Fatal for the current run;
    /// the next scheduled tick is the retry.
    #[error("failed to fetch listing page {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A vacancy card is missing a required element (title, link child
    /// or time element). The card is skipped.
    #[error("malformed vacancy card: {0}")]
    MalformedListing(String),

    /// A card's `datetime` attribute did not parse as an offset
    /// date-time. The card is skipped.
    #[error("malformed publication timestamp {value:?}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The configured page URL or a card's href did not resolve to a
    /// valid absolute URL.
    #[error("invalid url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A persistence operation failed. Logged; remaining saves in the
    /// cycle are still attempted.
    #[error("storage failure")]
    Store(#[from] sqlx::Error),
}
