use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;

pub const BASE_URL: &str = "https://www.dustloop.com/w/GGST";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client that keeps at most one request in flight and
/// enforces a minimum delay between requests to the wiki.
pub struct PageFetcher {
    client: Client,
    min_delay: Duration,
    last_request: Option<Instant>,
}

impl PageFetcher {
    pub fn new(min_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            min_delay,
            last_request: None,
        })
    }

    /// Fetches a page body. A non-success status is an error; whether that
    /// skips one character or aborts the run is the caller's call.
    pub fn get(&mut self, url: &str) -> Result<String> {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        self.last_request = Some(Instant::now());

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("non-success status from {url}"))?;

        response
            .text()
            .with_context(|| format!("failed to read body from {url}"))
    }
}

pub fn frame_data_url(character: &str) -> String {
    format!("{BASE_URL}/{character}/Frame_Data")
}
