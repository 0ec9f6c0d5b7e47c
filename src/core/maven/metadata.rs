use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::info;

use crate::core::downloader::RemoteFetcher;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::version::is_snapshot;

/// Minimal `maven-metadata.xml` model – only the version listing.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MavenMetadata {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub versioning: Versioning,
}

#[derive(Debug, Deserialize, Default)]
pub struct Versioning {
    #[serde(default)]
    pub latest: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub versions: Versions,
}

#[derive(Debug, Deserialize, Default)]
pub struct Versions {
    #[serde(default, rename = "version")]
    pub items: Vec<String>,
}

impl MavenMetadata {
    pub fn parse(xml: &str) -> InstallerResult<Self> {
        from_str(xml).map_err(|e| InstallerError::Metadata(e.to_string()))
    }

    pub fn url(repo_base: &str, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_base.trim_end_matches('/'),
            group_id.replace('.', "/"),
            artifact_id
        )
    }

    pub async fn fetch(
        fetcher: &dyn RemoteFetcher,
        repo_base: &str,
        group_id: &str,
        artifact_id: &str,
    ) -> InstallerResult<Self> {
        let url = Self::url(repo_base, group_id, artifact_id);
        let xml = fetcher.fetch_text(&url).await?;
        let metadata = Self::parse(&xml)?;
        info!(
            "Loaded {} versions of {}:{}",
            metadata.versioning.versions.items.len(),
            group_id,
            artifact_id
        );
        Ok(metadata)
    }

    /// Versions newest first, in repository publication order.
    pub fn versions_newest_first(&self, include_snapshots: bool) -> Vec<&str> {
        self.versioning
            .versions
            .items
            .iter()
            .rev()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .filter(|v| include_snapshots || !is_snapshot(v))
            .collect()
    }

    /// Most recently published version, skipping snapshots unless asked.
    pub fn latest(&self, include_snapshots: bool) -> Option<&str> {
        self.versions_newest_first(include_snapshots)
            .into_iter()
            .next()
    }
}
