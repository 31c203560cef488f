//! Listing-page parsing: cards in, normalized [`Post`] records out.
//!
//! [`HabrCareerParse`] walks a fixed number of listing pages. Every
//! vacancy card contributes a title, a link (resolved to an absolute URL
//! against the listing's origin) and a publication time; the card's
//! detail page is then fetched for the long description, one card at a
//! time so the site never sees a burst of detail requests.
//!
//! Failure policy follows the card/page split: a card missing a required
//! element (or carrying an unparseable timestamp) is skipped with a warn
//! log, while a listing page that cannot be fetched aborts the whole run
//! with no partial batch.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

use crate::datetime::DateTimeParser;
use crate::error::GrabError;
use crate::fetch::Fetcher;
use crate::models::Post;

/// One vacancy card's summary block.
static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(".vacancy-card__inner").unwrap());
/// Title container inside a card; its first child element is the link.
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".vacancy-card__title").unwrap());
/// Publication time element; the value lives in its `datetime` attribute.
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());

/// Capability seam for "give me the full batch for one run". The
/// scheduler only ever talks to this trait.
#[async_trait]
pub trait Parse: Send + Sync {
    /// Fetch and extract pages `0..pages`, in page and document order.
    async fn list(&self, page_url: &str, pages: u32) -> Result<Vec<Post>, GrabError>;
}

/// Card fields that can be read without touching the network again.
struct Card {
    title: String,
    link: String,
    created: chrono::NaiveDateTime,
}

/// Parser for career.habr.com listing pages.
pub struct HabrCareerParse<F, D> {
    fetcher: F,
    datetime: D,
}

impl<F: Fetcher, D: DateTimeParser> HabrCareerParse<F, D> {
    pub fn new(fetcher: F, datetime: D) -> Self {
        Self { fetcher, datetime }
    }

    /// Read every card out of one listing page body. The DOM is dropped
    /// before any detail fetch starts, so this part stays synchronous.
    fn collect_cards(&self, body: &str, base: &Url) -> Vec<Result<Card, GrabError>> {
        let document = Html::parse_document(body);
        document
            .select(&CARD)
            .map(|card| self.read_card(card, base))
            .collect()
    }

    fn read_card(&self, card: ElementRef<'_>, base: &Url) -> Result<Card, GrabError> {
        let title_element = card
            .select(&TITLE)
            .next()
            .ok_or_else(|| GrabError::MalformedListing("card has no title element".to_string()))?;
        let link_element = title_element
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .ok_or_else(|| GrabError::MalformedListing("title has no link child".to_string()))?;
        let href = link_element.value().attr("href").ok_or_else(|| {
            GrabError::MalformedListing("link child has no href attribute".to_string())
        })?;
        let link = base.join(href).map_err(|_| {
            GrabError::MalformedListing(format!("href {href:?} does not resolve against the site"))
        })?;

        let title = title_element.text().collect::<String>().trim().to_string();

        let time_element = card
            .select(&TIME)
            .next()
            .ok_or_else(|| GrabError::MalformedListing("card has no time element".to_string()))?;
        let raw_created = time_element.value().attr("datetime").ok_or_else(|| {
            GrabError::MalformedListing("time element has no datetime attribute".to_string())
        })?;
        let created = self.datetime.parse(raw_created)?;

        Ok(Card {
            title,
            link: link.to_string(),
            created,
        })
    }

    /// Turn one listing page into posts, fetching descriptions one card
    /// at a time. Malformed cards are skipped here.
    async fn extract(&self, body: &str, base: &Url) -> Vec<Post> {
        let cards = self.collect_cards(body, base);
        stream::iter(cards)
            .then(|card| async move {
                match card {
                    Ok(card) => {
                        let description = self.fetcher.fetch_description(&card.link).await;
                        Some(Post::new(card.title, card.link, description, card.created))
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed vacancy card");
                        None
                    }
                }
            })
            .filter_map(std::future::ready)
            .collect()
            .await
    }
}

#[async_trait]
impl<F: Fetcher, D: DateTimeParser> Parse for HabrCareerParse<F, D> {
    #[instrument(level = "info", skip(self))]
    async fn list(&self, page_url: &str, pages: u32) -> Result<Vec<Post>, GrabError> {
        let base = Url::parse(page_url).map_err(|source| GrabError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;

        let mut posts = Vec::new();
        for page in 0..pages {
            let body = self.fetcher.fetch_page(page_url, page).await?;
            let extracted = self.extract(&body, &base).await;
            info!(page, count = extracted.len(), "Extracted vacancies from listing page");
            posts.extend(extracted);
        }
        Ok(posts)
    }
}
