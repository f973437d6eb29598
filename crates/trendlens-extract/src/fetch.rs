//! Raw page retrieval with a browser-like request profile.
//!
//! Storefronts routinely serve bot-filtered or empty markup to default
//! client user agents, so every fetch goes out with full browser headers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::Client;

use crate::error::ExtractError;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Fetches raw markup for target store pages, following redirects.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the browser request profile and the given
    /// total request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-ES,es;q=0.9,en;q=0.8"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Fetches the raw markup of one page.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnexpectedStatus`] — any non-2xx response.
    /// - [`ExtractError::Http`] — network or TLS failure.
    pub async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ExtractError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_returns_body_and_sends_browser_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vestidos"))
            // wiremock splits comma-separated header values before matching,
            // so the single `es-ES,es;q=0.9,en;q=0.8` value must be asserted
            // as its comma-separated parts.
            .and(headers(
                "accept-language",
                vec!["es-ES", "es;q=0.9", "en;q=0.8"],
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(5).expect("client");
        let body = fetcher
            .fetch(&format!("{}/vestidos", server.uri()))
            .await
            .expect("fetch");
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn fetch_surfaces_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(5).expect("client");
        let err = fetcher
            .fetch(&format!("{}/blocked", server.uri()))
            .await
            .expect_err("should fail");
        assert!(
            matches!(err, ExtractError::UnexpectedStatus { status: 403, .. }),
            "unexpected error: {err:?}"
        );
    }
}
