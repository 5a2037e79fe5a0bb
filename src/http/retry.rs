//! Retry policy and error classification for artifact downloads.

use reqwest::StatusCode;
use std::time::Duration;

/// Maximum number of attempts for a download.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

pub fn default_retry_delay() -> Duration {
    Duration::from_millis(RETRY_DELAY_MS)
}

/// HTTP failures that another attempt cannot fix.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Rate limit exceeded (HTTP 429, or 403 mentioning a rate limit)
    RateLimitExceeded(String),
    /// HTTP 401
    AuthenticationFailed(String),
    /// HTTP 404: the release or the asset does not exist
    NotFound(String),
    /// HTTP 403 without a rate limit
    Forbidden(String),
    /// Any other 4xx
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(url) => write!(
                f,
                "Rate limit exceeded while fetching {}. Try again later or set GITHUB_TOKEN.",
                url
            ),
            NonRetryableError::AuthenticationFailed(url) => write!(
                f,
                "Authentication failed for {}. Check your GITHUB_TOKEN.",
                url
            ),
            NonRetryableError::NotFound(url) => write!(
                f,
                "Release asset not found: {}. Check the release version.",
                url
            ),
            NonRetryableError::Forbidden(url) => write!(f, "Access forbidden: {}", url),
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an HTTP error.
/// Returns `Ok(())` if another attempt may succeed (5xx, connection errors,
/// timeouts), or the matching [`NonRetryableError`] otherwise.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        return Ok(());
    };
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unknown url>".to_string());

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(url)),
        StatusCode::FORBIDDEN => {
            if error.to_string().to_lowercase().contains("rate limit") {
                Err(NonRetryableError::RateLimitExceeded(url))
            } else {
                Err(NonRetryableError::Forbidden(url))
            }
        }
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded(url)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(format!(
            "HTTP {} from {}",
            s.as_u16(),
            url
        ))),
        _ => Ok(()),
    }
}

/// Converts an error from `error_for_status()` into an `anyhow::Error`,
/// wrapping it as a [`NonRetryableError`] when retrying is pointless.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_error(status: usize) -> reqwest::Error {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.3.6/sticks-darwin-aarch64")
            .with_status(status)
            .create_async()
            .await;

        let url = format!("{}/v0.3.6/sticks-darwin-aarch64", server.url());
        let response = reqwest::Client::new().get(&url).send().await.unwrap();
        response.error_for_status().unwrap_err()
    }

    #[test]
    fn test_non_retryable_error_display() {
        let err = NonRetryableError::RateLimitExceeded("u".to_string());
        assert!(err.to_string().contains("Rate limit"));
        assert!(err.to_string().contains("GITHUB_TOKEN"));

        let err = NonRetryableError::NotFound("https://x/sticks-darwin-x86_64".to_string());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("sticks-darwin-x86_64"));

        let err = NonRetryableError::ClientError("HTTP 400".to_string());
        assert!(err.to_string().contains("Request error: HTTP 400"));
    }

    #[tokio::test]
    async fn test_classify_client_errors() {
        let err = status_error(401).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::AuthenticationFailed(_))
        ));

        let err = status_error(403).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::Forbidden(_))
        ));

        let err = status_error(429).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::RateLimitExceeded(_))
        ));

        let err = status_error(400).await;
        assert!(matches!(
            classify_error(&err),
            Err(NonRetryableError::ClientError(_))
        ));
    }

    #[tokio::test]
    async fn test_classify_not_found_names_the_asset() {
        let err = status_error(404).await;
        match classify_error(&err) {
            Err(NonRetryableError::NotFound(url)) => {
                assert!(url.ends_with("/v0.3.6/sticks-darwin-aarch64"))
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable() {
        for status in [500, 502, 503] {
            let err = status_error(status).await;
            assert!(classify_error(&err).is_ok(), "status {status}");
            assert!(
                check_retryable(err)
                    .downcast_ref::<NonRetryableError>()
                    .is_none()
            );
        }
    }

    #[tokio::test]
    async fn test_check_retryable_wraps_client_errors() {
        let err = status_error(404).await;
        assert!(
            check_retryable(err)
                .downcast_ref::<NonRetryableError>()
                .is_some()
        );
    }
}
