//! Data model for scraped job postings.
//!
//! The whole pipeline revolves around a single record type, [`Post`]:
//! one vacancy card extracted from a listing page, enriched with the
//! long-form description from its detail page. Posts are immutable once
//! extracted; the only later mutation is the store writing the generated
//! row id back after the first successful insert.

use chrono::NaiveDateTime;
use std::fmt;

/// One job vacancy as extracted from the listing site.
///
/// `link` is the business key: the store enforces its uniqueness and a
/// second save of the same link is a silent no-op. `id` is the surrogate
/// key assigned by the store on first insert and stays `0` until then.
#[derive(Debug, Clone)]
pub struct Post {
    /// Store-assigned identifier; `0` before the post is persisted.
    pub id: i64,
    /// Vacancy title as shown on the listing card.
    pub title: String,
    /// Absolute URL of the vacancy's detail page. Unique per store.
    pub link: String,
    /// Long-form description from the detail page; empty when the
    /// detail fetch failed.
    pub description: String,
    /// Publication time exactly as the site printed it, offset dropped.
    pub created: NaiveDateTime,
}

impl Post {
    /// Build a not-yet-persisted post (`id == 0`).
    pub fn new(title: String, link: String, description: String, created: NaiveDateTime) -> Self {
        Self {
            id: 0,
            title,
            link,
            description,
            created,
        }
    }
}

/// Identity is `id` plus `link`; the remaining fields are payload.
impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.link == other.link
    }
}

impl Eq for Post {}

/// Field dump used by the result listener's plain-text protocol.
impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "link: {}", self.link)?;
        writeln!(f, "created: {}", self.created)?;
        writeln!(f, "description: {}", self.description)
    }
}
