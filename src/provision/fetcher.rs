//! Installer artifact transfer.

use crate::error::{OutfitError, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Transfers an installer artifact to local storage.
pub trait Fetcher {
    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// Success means `dest` exists and is non-empty afterwards.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Fetches artifacts over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("outfit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let transfer_failed = |message: String| OutfitError::TransferFailed {
            url: url.to_string(),
            message,
        };

        tracing::debug!("GET {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transfer_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(transfer_failed(format!("HTTP {}", response.status())));
        }

        let mut file = File::create(dest).map_err(|e| {
            transfer_failed(format!("cannot create {}: {}", dest.display(), e))
        })?;
        response
            .copy_to(&mut file)
            .map_err(|e| transfer_failed(e.to_string()))?;
        file.flush()
            .map_err(|e| transfer_failed(format!("cannot write {}: {}", dest.display(), e)))?;
        drop(file);

        verify_artifact(url, dest)
    }
}

/// Check that a transfer left a non-empty file behind.
pub fn verify_artifact(url: &str, dest: &Path) -> Result<u64> {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(OutfitError::TransferFailed {
            url: url.to_string(),
            message: format!("{} is empty", dest.display()),
        }),
        Err(_) => Err(OutfitError::TransferFailed {
            url: url.to_string(),
            message: format!("{} was not created", dest.display()),
        }),
    }
}
