//! Dataset download and extraction

use anyhow::{Context, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use movies_common::EtlError;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on the buffer reserved up front from `Content-Length`
const MAX_PREALLOCATION: u64 = 64 << 20;

/// Build the HTTP client used for the download
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Download the zipped dataset into memory, with a progress bar
pub async fn download_archive(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    info!(url, "Downloading dataset");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EtlError::Network(e.to_string()))
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        return Err(EtlError::Network(format!("{} returned {}", url, response.status())).into());
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message("Downloading dataset archive");

    // Content-Length is only a hint; a bogus value must not size the buffer
    let capacity = usize::try_from(total_size.min(MAX_PREALLOCATION)).unwrap_or(0);
    let mut archive = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| EtlError::Network(e.to_string()))
            .with_context(|| format!("Download of {} was interrupted", url))?;
        archive.extend_from_slice(&chunk);
        pb.set_position(archive.len() as u64);
    }

    pb.finish_and_clear();
    info!(bytes = archive.len(), "Download complete");

    Ok(archive)
}

/// Extract one file from a zip archive into `work_dir`
///
/// The entry is matched on its basename, so it may sit in a subdirectory
/// of the archive. Returns the path of the extracted file.
pub fn extract_entry(archive: &[u8], entry: &str, work_dir: &Path) -> Result<PathBuf> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| EtlError::Archive(e.to_string()))
        .context("Failed to read zip archive")?;

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| EtlError::Archive(e.to_string()))
            .with_context(|| format!("Failed to read zip entry at index {}", i))?;

        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let basename = name.split('/').next_back().unwrap_or(&name);
        if basename != entry {
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .with_context(|| format!("Failed to read zip entry: {}", name))?;
        debug!(entry = %name, bytes = contents.len(), "Extracted archive entry");

        let target = work_dir.join(entry);
        std::fs::write(&target, &contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        return Ok(target);
    }

    Err(EtlError::Archive(format!("{} not found in archive", entry)).into())
}
