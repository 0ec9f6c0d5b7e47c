mod artifact;
mod metadata;

pub use artifact::MavenArtifact;
pub use metadata::MavenMetadata;

/// Repositories the server install draws from.
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net/";
pub const LEGACY_FABRIC_MAVEN: &str = "https://maven.legacyfabric.net/";
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net/";
pub const COMPAT_MAVEN: &str = "https://repo.blucobalt.dev/repository/maven-hosted/";
