use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use std::fmt::Debug;

use crate::Config;

/// Source of remote documents. The feeds only ever issue plain GETs.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    async fn fetch_text(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.user_agent)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {url}");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Request to {url} failed with status {status}: {}",
                truncate_body(&body),
            ));
        }

        Ok(res)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        Ok(bytes.to_vec())
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("Not Found"), "Not Found");
    }

    #[test]
    fn long_bodies_are_cut_on_a_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);

        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn client_builds_with_configured_agent() {
        assert!(HttpFetcher::from_config(&Config::default()).is_ok());
    }
}
