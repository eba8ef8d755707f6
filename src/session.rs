use std::time::Instant;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Something that returns the HTML of a search results page.
pub trait PageSource {
    async fn fetch(&mut self, url: &str) -> Result<String>;
}

/// Browsing session for one harvest run. Owns the HTTP client and its
/// cookie jar; dropped (and logged) on every exit path of the run.
pub struct Session {
    client: Client,
    fetched: usize,
    opened: Instant,
}

impl Session {
    /// Build the full client (cookies, French headers). If that fails,
    /// retry once with a bare client before giving up.
    pub fn open(user_agent: &str) -> Result<Self> {
        Self::open_with(user_agent, full_client)
    }

    fn open_with(
        user_agent: &str,
        primary: impl FnOnce(&str) -> reqwest::Result<Client>,
    ) -> Result<Self> {
        let client = match primary(user_agent) {
            Ok(client) => client,
            Err(e) => {
                warn!("Session setup failed ({}), retrying with a plain client", e);
                Client::builder()
                    .user_agent(user_agent)
                    .build()
                    .context("Failed to create HTTP client")?
            }
        };
        info!("Session opened");
        Ok(Self {
            client,
            fetched: 0,
            opened: Instant::now(),
        })
    }
}

fn full_client(user_agent: &str) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9,en;q=0.5"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .build()
}

impl PageSource for Session {
    /// Non-2xx responses still return their body: a block page just has no
    /// cards, which the harvester treats as the end of results.
    async fn fetch(&mut self, url: &str) -> Result<String> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}", url, status);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        self.fetched += 1;
        debug!(
            "Fetched {} ({} bytes, {} ms)",
            url,
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(body)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!(
            "Session closed after {} pages in {:.1}s",
            self.fetched,
            self.opened.elapsed().as_secs_f64()
        );
    }
}
