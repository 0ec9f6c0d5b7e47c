use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::{InstallerError, InstallerResult};

/// A parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   either of the above with an `@extension` suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension. Defaults to `"jar"`.
    pub extension: String,
}

impl MavenArtifact {
    pub fn parse(coord: &str) -> InstallerResult<Self> {
        let invalid = || InstallerError::InvalidMavenCoordinate(coord.to_string());

        let (body, extension) = match coord.trim().rsplit_once('@') {
            Some((body, ext)) if !ext.is_empty() => (body, ext),
            Some(_) => return Err(invalid()),
            None => (coord.trim(), "jar"),
        };

        let mut parts = body.split(':');
        let group_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let artifact_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let version = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let classifier = parts.next().map(str::to_string);

        if parts.next().is_some() || classifier.as_deref() == Some("") {
            return Err(invalid());
        }

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            classifier,
            extension: extension.to_string(),
        })
    }

    /// `artifactId-version[-classifier].extension`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Repository-relative path, always `/`-separated:
    /// `<group/as/dirs>/<artifactId>/<version>/<file_name>`
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }

    /// Same layout as [`relative_path`](Self::relative_path), for the local libraries dir.
    pub fn local_path(&self) -> PathBuf {
        self.relative_path().split('/').collect()
    }

    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}",
            repo_base.trim_end_matches('/'),
            self.relative_path()
        )
    }

    /// `group:artifact` without version, used to recognise a dependency regardless of version.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for MavenArtifact {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_splits_group_into_directories() {
        let a = MavenArtifact::parse("net.fabricmc:fabric-loader:0.12.5").unwrap();
        assert_eq!(
            a.relative_path(),
            "net/fabricmc/fabric-loader/0.12.5/fabric-loader-0.12.5.jar"
        );
        assert_eq!(
            a.local_path(),
            PathBuf::from("net/fabricmc/fabric-loader/0.12.5/fabric-loader-0.12.5.jar")
        );
    }

    #[test]
    fn url_joins_repository_without_double_slash() {
        let a = MavenArtifact::parse("org.ow2.asm:asm:9.2").unwrap();
        assert_eq!(
            a.url("https://maven.fabricmc.net/"),
            "https://maven.fabricmc.net/org/ow2/asm/asm/9.2/asm-9.2.jar"
        );
    }

    #[test]
    fn classifier_and_extension() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-linux@zip").unwrap();
        assert_eq!(a.classifier.as_deref(), Some("natives-linux"));
        assert_eq!(a.file_name(), "lwjgl-3.3.3-natives-linux.zip");
        assert_eq!(a.to_string(), "org.lwjgl:lwjgl:3.3.3:natives-linux@zip");
    }

    #[test]
    fn rejects_malformed_coordinates() {
        for bad in ["", "net.fabricmc", "a:b", "a::1.0", "a:b:1:c:d", "a:b:1@"] {
            assert!(
                matches!(
                    MavenArtifact::parse(bad),
                    Err(InstallerError::InvalidMavenCoordinate(_))
                ),
                "accepted {bad:?}"
            );
        }
    }
}
