use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::config::InstallerSettings;
use crate::core::error::InstallerError;

/// Which loader distribution a version belongs to.
///
/// Decided where the version string is obtained (CLI flag, or the metadata
/// listing of that family's repository) and carried from there on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderFamily {
    /// Upstream loader published as `net.fabricmc:fabric-loader`.
    #[default]
    Fabric,
    /// 0.11.x-and-older line published as `net.fabricmc:fabric-loader-1.8.9`.
    Legacy,
}

impl LoaderFamily {
    pub const GROUP_ID: &'static str = "net.fabricmc";

    pub fn artifact_id(self) -> &'static str {
        match self {
            LoaderFamily::Fabric => "fabric-loader",
            LoaderFamily::Legacy => "fabric-loader-1.8.9",
        }
    }

    pub fn repository(self, settings: &InstallerSettings) -> &str {
        match self {
            LoaderFamily::Fabric => &settings.fabric_maven,
            LoaderFamily::Legacy => &settings.legacy_fabric_maven,
        }
    }

    pub fn coordinate(self, version: &str) -> String {
        format!("{}:{}:{}", Self::GROUP_ID, self.artifact_id(), version)
    }

    /// Descriptor document published next to the loader jar.
    pub fn descriptor_url(self, settings: &InstallerSettings, version: &str) -> String {
        let artifact_id = self.artifact_id();
        format!(
            "{}/{}/{}/{}/{}-{}.json",
            self.repository(settings).trim_end_matches('/'),
            Self::GROUP_ID.replace('.', "/"),
            artifact_id,
            version,
            artifact_id,
            version
        )
    }
}

impl fmt::Display for LoaderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderFamily::Fabric => write!(f, "fabric"),
            LoaderFamily::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for LoaderFamily {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fabric" => Ok(LoaderFamily::Fabric),
            "legacy" | "legacyfabric" | "legacy-fabric" => Ok(LoaderFamily::Legacy),
            other => Err(InstallerError::Other(format!(
                "Unknown loader family: {other}"
            ))),
        }
    }
}

/// A concrete loader version, optionally backed by a loader jar already on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderVersion {
    pub name: String,
    pub family: LoaderFamily,
    /// When set, the loader jar is copied from here and its embedded descriptor is used.
    pub local_archive: Option<PathBuf>,
}

impl LoaderVersion {
    pub fn new(name: impl Into<String>, family: LoaderFamily) -> Self {
        Self {
            name: name.into(),
            family,
            local_archive: None,
        }
    }

    pub fn with_local_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_archive = Some(path.into());
        self
    }

    pub fn is_legacy(&self) -> bool {
        self.family == LoaderFamily::Legacy
    }
}

impl fmt::Display for LoaderVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.name)
    }
}
