use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::checksum::Checksum;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::build_http_client;

/// Remote side of the install: descriptor/metadata text and library files.
///
/// Implementations never retry; a failure aborts the install.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Full body of `url` as text.
    async fn fetch_text(&self, url: &str) -> InstallerResult<String>;

    /// Write the body of `url` to `dest`, creating parent directories.
    async fn fetch_file(
        &self,
        url: &str,
        dest: &Path,
        checksum: Option<&Checksum>,
    ) -> InstallerResult<()>;
}

/// Sequential HTTP downloader with optional digest validation.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(user_agent: &str) -> InstallerResult<Self> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    async fn get(&self, url: &str) -> InstallerResult<reqwest::Response> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteFetcher for Downloader {
    async fn fetch_text(&self, url: &str) -> InstallerResult<String> {
        let text = self.get(url).await?.text().await?;
        debug!("Fetched {} ({} bytes)", url, text.len());
        Ok(text)
    }

    async fn fetch_file(
        &self,
        url: &str,
        dest: &Path,
        checksum: Option<&Checksum>,
    ) -> InstallerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallerError::io(parent, e))?;
        }

        let bytes = self.get(url).await?.bytes().await?;

        // Validate on the in-memory buffer so a bad download never lands on disk.
        if let Some(checksum) = checksum {
            checksum.verify(dest, &bytes)?;
        }

        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| InstallerError::io(dest, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| InstallerError::io(dest, e))?;
            file.flush().await.map_err(|e| InstallerError::io(dest, e))?;
            // handle dropped here so the file can be reopened right away on Windows
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}
