//! The recurring grab-and-save job.
//!
//! [`Grabber`] ties the parser and the store together and runs one grab
//! cycle per tick, forever: fetch the configured listing pages, save the
//! batch best-effort, log the store's state and a sample lookup, then
//! wait out the interval. The first cycle fires immediately on startup.
//!
//! A failed run never stops the loop; the next tick is the retry. Runs
//! never overlap: the next tick is not awaited until the previous cycle,
//! logging included, has finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, instrument};

use crate::parse::Parse;
use crate::store::Store;

/// Periodic scheduler around one parse + store pair. All configuration
/// is taken at construction; nothing is looked up ambiently later.
pub struct Grabber<P, S> {
    parse: P,
    store: Arc<S>,
    page_url: String,
    pages: u32,
    interval: Duration,
}

impl<P: Parse, S: Store> Grabber<P, S> {
    pub fn new(parse: P, store: Arc<S>, page_url: String, pages: u32, interval: Duration) -> Self {
        Self {
            parse,
            store,
            page_url,
            pages,
            interval,
        }
    }

    /// Run grab cycles until the surrounding task is cancelled. Never
    /// returns on its own.
    pub async fn run(&self) {
        let mut ticker = time::interval(self.interval);
        // If a cycle overruns the interval, fire the next one after a
        // full interval instead of bursting to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.grab_cycle().await;
            info!(secs = self.interval.as_secs(), "Next grab run scheduled");
        }
    }

    /// One complete fetch → extract → persist pass.
    #[instrument(level = "info", skip(self))]
    async fn grab_cycle(&self) {
        info!(page_url = %self.page_url, pages = self.pages, "Grab run starting");
        let posts = match self.parse.list(&self.page_url, self.pages).await {
            Ok(posts) => posts,
            Err(e) => {
                error!(error = %e, "Grab run failed; will retry at the next tick");
                return;
            }
        };

        info!(count = posts.len(), "Saving vacancies");
        let mut inserted = 0usize;
        let mut sample_id = None;
        for mut post in posts {
            match self.store.save(&mut post).await {
                Ok(()) => {
                    if post.id > 0 {
                        inserted += 1;
                        sample_id.get_or_insert(post.id);
                    }
                }
                Err(e) => {
                    // Best-effort: this post is dropped, the rest of the
                    // batch is still attempted.
                    error!(error = %e, link = %post.link, "Failed to save vacancy");
                }
            }
        }

        match self.store.get_all().await {
            Ok(all) => info!(inserted, total = all.len(), "Store state after grab run"),
            Err(e) => error!(error = %e, "Failed to read back stored vacancies"),
        }

        if let Some(id) = sample_id {
            match self.store.find_by_id(id).await {
                Ok(Some(post)) => info!(id, title = %post.title, "Sample lookup"),
                Ok(None) => error!(id, "Sample lookup found nothing"),
                Err(e) => error!(error = %e, id, "Sample lookup failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrabError;
    use crate::models::Post;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    const PAGE_URL: &str = "https://career.habr.com/vacancies/java_developer?page=";

    /// Hands back a fixed batch, or fails the whole run.
    struct StubParse {
        posts: Vec<Post>,
        fail: bool,
    }

    #[async_trait]
    impl Parse for StubParse {
        async fn list(&self, _page_url: &str, _pages: u32) -> Result<Vec<Post>, GrabError> {
            if self.fail {
                return Err(GrabError::MalformedListing("stubbed failure".to_string()));
            }
            Ok(self.posts.clone())
        }
    }

    fn post(n: u32) -> Post {
        Post::new(
            format!("Vacancy {n}"),
            format!("https://career.habr.com/vacancies/{n}"),
            String::new(),
            NaiveDate::from_ymd_opt(2022, 6, 8)
                .unwrap()
                .and_hms_opt(19, 34, 1)
                .unwrap(),
        )
    }

    fn grabber(parse: StubParse, store: Arc<SqliteStore>) -> Grabber<StubParse, SqliteStore> {
        Grabber::new(
            parse,
            store,
            PAGE_URL.to_string(),
            5,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_grab_cycle_persists_the_batch() {
        let store = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
        let parse = StubParse {
            posts: vec![post(42), post(43)],
            fail: false,
        };
        grabber(parse, Arc::clone(&store)).grab_cycle().await;

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_cycles_do_not_duplicate() {
        let store = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
        let parse = StubParse {
            posts: vec![post(42), post(43)],
            fail: false,
        };
        let grabber = grabber(parse, Arc::clone(&store));
        grabber.grab_cycle().await;
        grabber.grab_cycle().await;

        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_run_leaves_store_untouched() {
        let store = Arc::new(SqliteStore::connect("sqlite::memory:").await.unwrap());
        let parse = StubParse {
            posts: vec![],
            fail: true,
        };
        // Must not panic, must not persist anything.
        grabber(parse, Arc::clone(&store)).grab_cycle().await;

        assert!(store.get_all().await.unwrap().is_empty());
    }
}
