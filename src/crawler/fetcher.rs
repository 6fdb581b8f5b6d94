//! Page fetching for the crawler
//!
//! The crawler only depends on [`PageFetcher`]; [`HttpFetcher`] is the
//! production implementation over `reqwest`.

use std::future::Future;

use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::content_extraction::extract_links;
use crate::crawler::error::{CrawlError, FetchError};

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// Raw markup
    pub html: String,

    /// Absolute URLs of the page's links, in document order
    pub links: Vec<String>,
}

/// Something that can navigate to a URL and return its markup and links
pub trait PageFetcher: Send + Sync {
    /// Fetch a page. Any failure is scoped to this URL.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// HTTP page fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    /// Build a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| CrawlError::Launch(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::Navigation(e.to_string()))?;

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), final_url);

        let links = extract_links(&html, &final_url).unwrap_or_else(|e| {
            warn!("Failed to extract links from {}: {}", final_url, e);
            Vec::new()
        });

        Ok(FetchedPage {
            url: final_url.to_string(),
            html,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&CrawlerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_and_links() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/about")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<html><body><a href="/team">Team</a><p>About</p></body></html>"#)
            .create_async()
            .await;

        let url = format!("{}/about", server.url());
        let page = fetcher().fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.url, url);
        assert!(page.html.contains("About"));
        assert_eq!(page.links, vec![format!("{}/team", server.url())]);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing", server.url());
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Navigation(_)));
    }
}
