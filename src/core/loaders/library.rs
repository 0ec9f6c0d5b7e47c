use std::path::{Path, PathBuf};

use crate::core::downloader::Checksum;
use crate::core::maven::MavenArtifact;

/// Where a dependency's bytes come from. Exactly one mode per dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// Fetched from `repository + artifact.relative_path()`.
    Remote { repository: String },
    /// Copied from a file already on disk.
    Local { path: PathBuf },
}

/// Why a dependency is in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyRole {
    Loader,
    Intermediary,
    Library,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub artifact: MavenArtifact,
    pub source: DependencySource,
    pub checksum: Option<Checksum>,
    pub role: DependencyRole,
}

impl DependencySpec {
    pub fn remote(artifact: MavenArtifact, repository: impl Into<String>) -> Self {
        Self {
            artifact,
            source: DependencySource::Remote {
                repository: repository.into(),
            },
            checksum: None,
            role: DependencyRole::Library,
        }
    }

    pub fn local(artifact: MavenArtifact, path: impl Into<PathBuf>) -> Self {
        Self {
            artifact,
            source: DependencySource::Local { path: path.into() },
            checksum: None,
            role: DependencyRole::Library,
        }
    }

    pub fn with_role(mut self, role: DependencyRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_checksum(mut self, checksum: Option<Checksum>) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn coordinate(&self) -> String {
        self.artifact.to_string()
    }

    /// Download URL, `None` for local sources.
    pub fn url(&self) -> Option<String> {
        match &self.source {
            DependencySource::Remote { repository } => Some(self.artifact.url(repository)),
            DependencySource::Local { .. } => None,
        }
    }

    /// Destination under the install's libraries directory.
    pub fn destination(&self, libs_dir: &Path) -> PathBuf {
        libs_dir.join(self.artifact.local_path())
    }
}

/// A dependency whose bytes are on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    pub spec: DependencySpec,
    pub local_file: PathBuf,
}

impl ResolvedLibrary {
    pub fn new(spec: DependencySpec, local_file: PathBuf) -> Self {
        Self { spec, local_file }
    }
}
