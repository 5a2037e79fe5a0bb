//! HTTP client with built-in retry logic and error handling.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use std::io::Write;
use std::time::Duration;

use super::retry::{MAX_RETRIES, NonRetryableError, check_retryable, default_retry_delay};

/// HTTP client with built-in retry logic for downloads.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry_delay: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            retry_delay: default_retry_delay(),
        }
    }

    /// Overrides the pause between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns a reference to the underlying reqwest Client.
    #[cfg(test)]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Streams `url` into a writer and returns the number of bytes written.
    ///
    /// `create_writer` is called once per attempt, so a retried download
    /// starts again from an empty file.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);
        let create_writer = &create_writer;
        self.with_retry("Download", || self.download_file_once(url, create_writer))
            .await
    }

    /// Single download attempt without retry.
    async fn download_file_once<W, F>(&self, url: &str, create_writer: &F) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response.error_for_status().map_err(check_retryable)?;

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < MAX_RETRIES {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name,
                            attempt,
                            MAX_RETRIES,
                            e,
                            self.retry_delay.as_millis()
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, MAX_RETRIES)
        }))
    }
}

/// Everything is retried unless it was classified as non-retryable.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn fast_client() -> HttpClient {
        HttpClient::new(Client::new()).with_retry_delay(Duration::ZERO)
    }

    /// Writer that appends into a shared buffer so tests can inspect it.
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_download_file_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0.3.6/sticks-darwin-aarch64")
            .with_status(200)
            .with_body("binary content")
            .create_async()
            .await;

        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let bytes = fast_client()
            .download_file(
                &format!("{}/v0.3.6/sticks-darwin-aarch64", server.url()),
                || Ok(SharedBuf(Arc::clone(&sink))),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 14);
        assert_eq!(buf.lock().unwrap().as_slice(), b"binary content");
    }

    #[tokio::test]
    async fn test_download_file_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let writers = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&writers);
        let result = fast_client()
            .download_file(&format!("{}/missing", server.url()), || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(std::io::sink())
            })
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<NonRetryableError>().is_some());
        // The destination is never opened for a failed response
        assert_eq!(writers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_download_file_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(MAX_RETRIES)
            .create_async()
            .await;

        let result = fast_client()
            .download_file(&format!("{}/flaky", server.url()), || Ok(std::io::sink()))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_download_file_connection_refused() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let result = fast_client()
            .download_file("http://127.0.0.1:9/sticks", || Ok(std::io::sink()))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_is_retryable_error() {
        let err = anyhow::Error::from(NonRetryableError::NotFound("u".to_string()));
        assert!(!is_retryable_error(&err));

        let err = anyhow::anyhow!("connection reset by peer");
        assert!(is_retryable_error(&err));

        // Context layers do not hide the classification
        let err = anyhow::Error::from(NonRetryableError::Forbidden("u".to_string()))
            .context("Failed to download sticks");
        assert!(!is_retryable_error(&err));
    }

    #[tokio::test]
    async fn test_with_retry_immediate_failure_on_non_retryable() {
        let client = fast_client();
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let result = client
            .with_retry("test", || {
                let count = call_count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(anyhow::Error::from(NonRetryableError::NotFound(
                        "not found".to_string(),
                    )))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_recovers() {
        let client = fast_client();
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let result = client
            .with_retry("test", || {
                let count = call_count_clone.clone();
                async move {
                    let current = count.fetch_add(1, Ordering::SeqCst);
                    if current < 2 {
                        Err::<&str, _>(anyhow::anyhow!("connection reset"))
                    } else {
                        Ok("success after retries")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success after retries");
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }
}
