use std::cmp::Ordering;

use crate::core::version::compare_versions;

/// Launcher class used when the loader jar's own manifest can't be consulted.
pub const DEFAULT_LAUNCHER_MAIN_CLASS: &str = "net.fabricmc.loader.launch.server.FabricServerLauncher";

/// Newest loader whose server launcher can't follow a manifest `Class-Path`.
pub const LAST_EMBEDDING_LOADER: &str = "0.12.5";

/// How dependencies end up reachable from the launch jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingStrategy {
    /// Every library's entries are copied into the launch jar.
    Embed,
    /// Libraries stay next to the jar and are listed in the manifest `Class-Path`.
    ClassPath,
}

impl PackagingStrategy {
    pub fn for_loader(loader_version: &str) -> Self {
        match compare_versions(loader_version, LAST_EMBEDDING_LOADER) {
            Ordering::Less | Ordering::Equal => PackagingStrategy::Embed,
            Ordering::Greater => PackagingStrategy::ClassPath,
        }
    }

    pub fn embeds_dependencies(self) -> bool {
        self == PackagingStrategy::Embed
    }
}

/// Entry points and strategy for one launch jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingPlan {
    /// Written as the manifest `Main-Class`; starts the loader's server launcher.
    pub launcher_main_class: String,
    /// Written as `launch.mainClass`; the class the launcher hands control to.
    pub runtime_main_class: String,
    pub strategy: PackagingStrategy,
}

impl PackagingPlan {
    pub fn embed_dependencies(&self) -> bool {
        self.strategy.embeds_dependencies()
    }
}
