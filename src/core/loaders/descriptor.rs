use std::path::Path;

use serde::{Deserialize, Serialize};

use super::library::DependencySpec;
use crate::core::downloader::Checksum;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::MavenArtifact;

/// Path of the descriptor bundled inside every loader jar.
pub const EMBEDDED_DESCRIPTOR_PATH: &str = "fabric-installer.json";

/// Subset of the loader's `fabric-installer.json` / `fabric-loader-<v>.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderDescriptor {
    pub libraries: DescriptorLibraries,
    pub main_class: DescriptorMainClass,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DescriptorLibraries {
    #[serde(default)]
    pub common: Vec<DescriptorLibrary>,
    #[serde(default)]
    pub server: Vec<DescriptorLibrary>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescriptorMainClass {
    #[serde(default)]
    pub client: Option<String>,
    pub server: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescriptorLibrary {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub sha512: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl DescriptorLibrary {
    /// Libraries without a `url` are served from `default_repo`.
    pub fn to_spec(&self, default_repo: &str) -> InstallerResult<DependencySpec> {
        let artifact = MavenArtifact::parse(&self.name)?;
        let repo = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(default_repo);

        let checksum = Checksum::strongest(
            self.sha512.as_deref(),
            self.sha256.as_deref(),
            self.sha1.as_deref(),
            self.md5.as_deref(),
        );

        Ok(DependencySpec::remote(artifact, repo).with_checksum(checksum))
    }
}

impl LoaderDescriptor {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn server_main_class(&self) -> &str {
        self.main_class.server.trim()
    }
}

/// Read the descriptor a loader jar carries at [`EMBEDDED_DESCRIPTOR_PATH`].
pub fn read_embedded_descriptor(archive_path: &Path) -> InstallerResult<LoaderDescriptor> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| InstallerError::local_archive(archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| InstallerError::local_archive(archive_path, e))?;

    let entry = archive.by_name(EMBEDDED_DESCRIPTOR_PATH).map_err(|e| {
        InstallerError::local_archive(
            archive_path,
            format!("missing {EMBEDDED_DESCRIPTOR_PATH}: {e}"),
        )
    })?;

    serde_json::from_reader(entry).map_err(|e| {
        InstallerError::local_archive(
            archive_path,
            format!("malformed {EMBEDDED_DESCRIPTOR_PATH}: {e}"),
        )
    })
}
