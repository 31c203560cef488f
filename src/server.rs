//! Plain-text result listener.
//!
//! Any client that connects gets a success status line, a blank line and
//! a dump of every stored post, then the connection is closed. The
//! listener runs concurrently with the scheduler and reads whatever is
//! committed in the store at connect time; a failed connection is logged
//! and the accept loop keeps going.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::store::Store;

const STATUS_LINE: &[u8] = b"HTTP/1.1 200 OK\r\n\r\n";

/// TCP server exposing the accumulated posts.
pub struct ResultServer<S> {
    store: Arc<S>,
    port: u16,
}

impl<S: Store + 'static> ResultServer<S> {
    pub fn new(store: Arc<S>, port: u16) -> Self {
        Self { store, port }
    }

    /// Bind and serve forever. Only a bind failure returns.
    pub async fn serve(&self) -> io::Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.port)).await?;
        info!(port = self.port, "Result server listening");
        loop {
            match listener.accept().await {
                Ok((mut stream, peer)) => {
                    let store = Arc::clone(&self.store);
                    tokio::spawn(async move {
                        if let Err(e) = dump_posts(&mut stream, store.as_ref()).await {
                            warn!(error = %e, %peer, "Client connection failed");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "Accept failed; listener continues"),
            }
        }
    }
}

/// Write the full post dump to one client.
async fn dump_posts<W, S>(out: &mut W, store: &S) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    S: Store,
{
    out.write_all(STATUS_LINE).await?;
    let posts = store.get_all().await.map_err(io::Error::other)?;
    for post in posts {
        out.write_all(format!("Vacancy #{}\n{post}\n", post.id).as_bytes())
            .await?;
    }
    out.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;
    use crate::store::SqliteStore;
    use chrono::NaiveDate;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_dump_starts_with_status_line_even_when_empty() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let (mut client, mut server) = tokio::io::duplex(4096);

        dump_posts(&mut server, &store).await.unwrap();
        drop(server);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HTTP/1.1 200 OK\r\n\r\n");
    }

    #[tokio::test]
    async fn test_dump_renders_every_stored_post() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        for (title, link) in [
            ("Backend Engineer", "https://career.habr.com/vacancies/42"),
            ("SRE", "https://career.habr.com/vacancies/43"),
        ] {
            let mut post = Post::new(
                title.to_string(),
                link.to_string(),
                String::new(),
                NaiveDate::from_ymd_opt(2022, 6, 8)
                    .unwrap()
                    .and_hms_opt(19, 34, 1)
                    .unwrap(),
            );
            store.save(&mut post).await.unwrap();
        }

        let (mut client, mut server) = tokio::io::duplex(4096);
        dump_posts(&mut server, &store).await.unwrap();
        drop(server);

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert!(received.starts_with("HTTP/1.1 200 OK\r\n\r\n"));
        assert!(received.contains("Vacancy #1"));
        assert!(received.contains("title: Backend Engineer"));
        assert!(received.contains("Vacancy #2"));
        assert!(received.contains("link: https://career.habr.com/vacancies/43"));
    }
}
