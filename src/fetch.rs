//! HTTP fetching for listing pages and vacancy detail pages.
//!
//! Two failure policies live here, on purpose. A listing page that cannot
//! be fetched is fatal for the whole run (the caller aborts remaining
//! pages and retries at the next tick). A detail page that cannot be
//! fetched or parsed only costs its own description: the card survives
//! with an empty string and a warn log.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use crate::error::GrabError;

/// First element matching this selector holds the vacancy's long-form text.
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".vacancy-description__text").unwrap());

/// Capability seam for the two fetches the pipeline performs. Narrow on
/// purpose so parser tests can run against canned HTML.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one listing page: GET on `{page_url}{page}`, raw HTML back.
    async fn fetch_page(&self, page_url: &str, page: u32) -> Result<String, GrabError>;

    /// Fetch a vacancy's detail page and return its description text.
    /// Any failure yields an empty string, never an error.
    async fn fetch_description(&self, url: &str) -> String;
}

/// Blocking-free fetcher over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, url: &str) -> Result<String, GrabError> {
        let fetch_err = |source| GrabError::Fetch {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let body = response
            .error_for_status()
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)?;
        Ok(body)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, page_url: &str, page: u32) -> Result<String, GrabError> {
        let url = format!("{page_url}{page}");
        let body = self.get(&url).await?;
        debug!(%url, bytes = body.len(), "Fetched listing page");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_description(&self, url: &str) -> String {
        match self.get(url).await {
            Ok(body) => match extract_description(&body) {
                Some(text) => text,
                None => {
                    warn!(%url, "Detail page has no description block");
                    String::new()
                }
            },
            Err(e) => {
                warn!(error = %e, %url, "Detail fetch failed; keeping empty description");
                String::new()
            }
        }
    }
}

/// Pull the text of the first description container out of a detail page.
fn extract_description(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&DESCRIPTION)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}
