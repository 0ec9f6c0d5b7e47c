use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::DEFAULT_USER_AGENT;
use crate::core::maven::{COMPAT_MAVEN, FABRIC_MAVEN, LEGACY_FABRIC_MAVEN, MOJANG_LIBRARIES};

pub const SETTINGS_FILE: &str = "installer_settings.json";
pub const DEFAULT_LAUNCH_JAR_NAME: &str = "fabric-server-launch.jar";
pub const DEFAULT_LIBRARIES_DIR: &str = "libraries";

/// User-tunable installer settings.
///
/// Every field has a default so a partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    pub fabric_maven: String,
    pub legacy_fabric_maven: String,
    pub mojang_libraries: String,
    /// Hosts the back-compat shim needed by legacy loaders on old game versions.
    pub compat_maven: String,
    pub user_agent: String,
    pub launch_jar_name: String,
    pub libraries_dir_name: String,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            fabric_maven: FABRIC_MAVEN.to_string(),
            legacy_fabric_maven: LEGACY_FABRIC_MAVEN.to_string(),
            mojang_libraries: MOJANG_LIBRARIES.to_string(),
            compat_maven: COMPAT_MAVEN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            launch_jar_name: DEFAULT_LAUNCH_JAR_NAME.to_string(),
            libraries_dir_name: DEFAULT_LIBRARIES_DIR.to_string(),
        }
    }
}

impl InstallerSettings {
    /// Load from an explicit file. A missing file is an error here.
    pub fn load(path: &Path) -> InstallerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| InstallerError::io(path, e))?;
        let settings: Self = serde_json::from_str(&raw)
            .map_err(|e| InstallerError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        debug!("Loaded installer settings from {:?}", path);
        Ok(settings)
    }

    /// `<dir>/installer_settings.json` if present, otherwise defaults.
    pub fn load_from_install_dir(dir: &Path) -> InstallerResult<Self> {
        let path = dir.join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    #[cfg(test)]
    pub fn save(&self, path: &Path) -> InstallerResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| InstallerError::io(path, e))
    }

    pub fn libraries_dir(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.libraries_dir_name)
    }

    pub fn launch_jar(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.launch_jar_name)
    }

    fn validate(&self) -> InstallerResult<()> {
        let repos = [
            ("fabric_maven", &self.fabric_maven),
            ("legacy_fabric_maven", &self.legacy_fabric_maven),
            ("mojang_libraries", &self.mojang_libraries),
            ("compat_maven", &self.compat_maven),
        ];
        for (name, url) in repos {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(InstallerError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }

        if self.launch_jar_name.trim().is_empty() || self.libraries_dir_name.trim().is_empty() {
            return Err(InstallerError::Config(
                "launch_jar_name and libraries_dir_name must not be empty".into(),
            ));
        }

        Ok(())
    }
}
