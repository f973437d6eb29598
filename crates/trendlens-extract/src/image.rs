//! Reachability probes for candidate product image URLs.

use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::header::{CONTENT_TYPE, RANGE, USER_AGENT};
use reqwest::{Client, StatusCode};

use crate::error::ExtractError;

/// Image CDNs fingerprint clients aggressively, so each probe picks a random
/// browser identity from this pool.
const PROBE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
];

/// Probes candidate image URLs: HEAD first, one ranged-GET fallback. Never
/// errors; unreachable or non-image URLs simply report `false`.
pub struct ImageValidator {
    client: Client,
}

impl ImageValidator {
    /// Creates a validator whose probes time out after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client })
    }

    /// Checks whether `url` looks like a reachable image.
    ///
    /// HEAD: accepted when the status is in `[200, 400)` and the content type
    /// is absent or starts with `image/`. If the HEAD is rejected or fails
    /// outright, one ranged GET (first 1 KiB) is tried, accepting any
    /// `[200, 400)` status without content-type inspection.
    pub async fn validate(&self, url: &str) -> bool {
        let user_agent = PROBE_USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(PROBE_USER_AGENTS[0]);

        match self.head_probe(url, user_agent).await {
            Ok(true) => return true,
            Ok(false) | Err(_) => {}
        }

        match self.ranged_get_probe(url, user_agent).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "image probe failed");
                false
            }
        }
    }

    async fn head_probe(&self, url: &str, user_agent: &str) -> Result<bool, reqwest::Error> {
        let response = self
            .client
            .head(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        if !acceptable_status(response.status()) {
            return Ok(false);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        Ok(match content_type {
            Some(ct) => ct.starts_with("image/"),
            None => true,
        })
    }

    async fn ranged_get_probe(&self, url: &str, user_agent: &str) -> Result<bool, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(RANGE, "bytes=0-1023")
            .send()
            .await?;

        Ok(acceptable_status(response.status()))
    }
}

fn acceptable_status(status: StatusCode) -> bool {
    status.as_u16() >= 200 && status.as_u16() < 400
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn head_with_image_content_type_is_valid() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/img/vestido.jpg"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/jpeg"))
            .mount(&server)
            .await;

        let validator = ImageValidator::new(5).expect("client");
        assert!(validator.validate(&format!("{}/img/vestido.jpg", server.uri())).await);
    }

    #[tokio::test]
    async fn head_without_content_type_is_valid() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/img/raw"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let validator = ImageValidator::new(5).expect("client");
        assert!(validator.validate(&format!("{}/img/raw", server.uri())).await);
    }

    #[tokio::test]
    async fn non_image_head_falls_back_to_ranged_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/img/page"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .mount(&server)
            .await;
        // Permissive fallback: any 2xx/3xx GET counts, content type ignored.
        Mock::given(method("GET"))
            .and(path("/img/page"))
            .and(header_exists("range"))
            .respond_with(ResponseTemplate::new(206).insert_header("content-type", "text/html"))
            .mount(&server)
            .await;

        let validator = ImageValidator::new(5).expect("client");
        assert!(validator.validate(&format!("{}/img/page", server.uri())).await);
    }

    #[tokio::test]
    async fn not_found_on_both_probes_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let validator = ImageValidator::new(5).expect("client");
        assert!(!validator.validate(&format!("{}/img/missing.jpg", server.uri())).await);
    }

    #[tokio::test]
    async fn unreachable_host_is_invalid_not_an_error() {
        let validator = ImageValidator::new(1).expect("client");
        assert!(!validator.validate("http://127.0.0.1:1/img.jpg").await);
    }

    #[test]
    fn acceptable_status_covers_success_and_redirects() {
        assert!(acceptable_status(StatusCode::OK));
        assert!(acceptable_status(StatusCode::PARTIAL_CONTENT));
        assert!(acceptable_status(StatusCode::MOVED_PERMANENTLY));
        assert!(!acceptable_status(StatusCode::NOT_FOUND));
        assert!(!acceptable_status(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
