use crate::http::HttpClient;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Downloads `url` to `partial_path` through the runtime, with retry support.
/// Returns the number of bytes written.
#[tracing::instrument(skip(runtime, partial_path, http_client))]
pub async fn download_file<R: Runtime>(
    runtime: &R,
    url: &str,
    partial_path: &Path,
    http_client: &HttpClient,
) -> Result<u64> {
    info!("Downloading {}...", url);

    let bytes = http_client
        .download_file(url, || {
            runtime
                .create_file(partial_path)
                .with_context(|| format!("Failed to create {}", partial_path.display()))
        })
        .await?;

    info!("Download complete ({} bytes).", bytes);
    Ok(bytes)
}
