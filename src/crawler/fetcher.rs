//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Classifying responses into success and the failures that drop a URL
//!
//! No retry happens here: any failure drops the URL.

use crate::config::{FetchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Page is not markup (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Response arrived with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, too many redirects, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status_code, .. } => write!(f, "HTTP {}", status_code),
            Self::ContentMismatch { content_type } => {
                write!(f, "unsupported content type '{}'", content_type)
            }
            Self::HttpError { status_code } => write!(f, "HTTP {}", status_code),
            Self::NetworkError { error } => write!(f, "network error: {}", error),
        }
    }
}

/// Retrieves a page for a crawl worker
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// [`PageFetcher`] over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, fetch)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts and redirect limit
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(fetch.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for content types the markup parser accepts
///
/// A missing header is accepted; otherwise any `text/*` type or an XML
/// flavour (`application/xhtml+xml`, `application/xml`).
fn is_markup(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.is_empty() || content_type.starts_with("text/") || content_type.contains("xml")
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with markup body | Success |
/// | 2xx with other content type | ContentMismatch |
/// | Any other status | HttpError |
/// | Timeout, refused, redirect limit, body read failure | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else if e.is_redirect() {
                "Too many redirects".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_markup(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn client() -> Client {
        build_http_client(&create_test_config(), &FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_user_agent_format() {
        assert_eq!(
            create_test_config().header_value(),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_is_markup() {
        assert!(is_markup("text/html; charset=utf-8"));
        assert!(is_markup("application/xhtml+xml"));
        assert!(is_markup(""));
        assert!(!is_markup("image/png"));
        assert!(!is_markup("application/pdf"));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>hello</p>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let result = fetch_url(&client(), &format!("{}/", server.uri())).await;
        match result {
            FetchResult::Success {
                status_code, body, ..
            } => {
                assert_eq!(status_code, 200);
                assert_eq!(body, "<p>hello</p>");
            }
            other => panic!("unexpected result: {}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_url(&client(), &format!("{}/missing", server.uri())).await;
        assert!(matches!(result, FetchResult::HttpError { status_code: 404 }));
    }

    #[tokio::test]
    async fn test_fetch_binary_is_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "image/png"),
            )
            .mount(&server)
            .await;

        let result = fetch_url(&client(), &format!("{}/logo.png", server.uri())).await;
        assert!(matches!(result, FetchResult::ContentMismatch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        // Nothing listens on port 9 of localhost
        let result = fetch_url(&client(), "http://127.0.0.1:9/").await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
        assert!(!result.is_success());
    }
}
