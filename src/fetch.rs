use crate::errors::{DsnapError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Browser-like identity; both exchange sites reject the default client UA
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Collaborator that retrieves raw page text for the extractors
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the body of `url` as text
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher used by the command line front end
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DsnapError::RequestError(e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        // Both exchange sites expect a Referer; the page's own URL passes
        let response = self
            .client
            .get(url)
            .header("Referer", url)
            .send()
            .await
            .map_err(|e| DsnapError::RequestError(e))?
            .error_for_status()
            .map_err(|e| DsnapError::RequestError(e))?;

        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
