//! Utility functions
//!
use std::path::Path;

use anyhow::Result;
use reqwest::Client;

/// Download a file from a URL to a given filepath.
///
/// Parent directories are created as needed. Non-success HTTP statuses are
/// errors, so nothing is written for a missing model.
pub async fn download_file(client: &Client, url: &str, filepath: impl AsRef<Path>) -> Result<()> {
    let filepath = filepath.as_ref();
    let resp = client.get(url).send().await?.error_for_status()?;
    let content = resp.bytes().await?;

    if let Some(parent) = filepath.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(filepath, &content).await?;
    log::debug!("Downloaded {} bytes from {} to {}", content.len(), url, filepath.display());

    Ok(())
}
