use std::cmp::Ordering;

use tracing::{debug, info};

use super::descriptor::{read_embedded_descriptor, DescriptorLibrary, LoaderDescriptor};
use super::family::{LoaderFamily, LoaderVersion};
use super::library::{DependencyRole, DependencySpec};
use super::plan::{PackagingPlan, PackagingStrategy, DEFAULT_LAUNCHER_MAIN_CLASS};
use crate::core::config::InstallerSettings;
use crate::core::downloader::RemoteFetcher;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::maven::MavenArtifact;
use crate::core::version::compare_versions;

/// Game version that cannot run a legacy-family loader server.
const LEGACY_INCOMPATIBLE_GAME: &str = "1.8.9";
/// Newest game version still shipping a pre-21 Guava.
const OLD_GUAVA_GAME: &str = "1.8.9";

const COMPAT_SHIM: &str = "dev.blucobalt:mcguava:0.07";
const OLD_GUAVA_LOGGING: [&str; 2] = [
    "org.apache.logging.log4j:log4j-api:2.8.1",
    "org.apache.logging.log4j:log4j-core:2.8.1",
];

/// Ordered dependency list plus the packaging decision for one install.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub libraries: Vec<DependencySpec>,
    pub plan: PackagingPlan,
}

/// Turns a loader/game version pair into the dependencies a server needs.
pub struct DependencyResolver<'a> {
    fetcher: &'a dyn RemoteFetcher,
    settings: &'a InstallerSettings,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(fetcher: &'a dyn RemoteFetcher, settings: &'a InstallerSettings) -> Self {
        Self { fetcher, settings }
    }

    pub async fn resolve(
        &self,
        loader: &LoaderVersion,
        game_version: &str,
    ) -> InstallerResult<Resolution> {
        check_compatibility(loader, game_version)?;

        let loader_spec = self.loader_spec(loader)?;
        let intermediary_spec = self.intermediary_spec(game_version)?;
        let excluded = [loader_spec.artifact.key(), intermediary_spec.artifact.key()];

        let mut libraries = vec![loader_spec, intermediary_spec];

        let descriptor = match &loader.local_archive {
            Some(archive) => {
                debug!("Reading embedded descriptor from {:?}", archive);
                let archive = archive.clone();
                let descriptor =
                    tokio::task::spawn_blocking(move || read_embedded_descriptor(&archive)).await??;

                // The jar pins versions that already work together.
                self.push_descriptor_libraries(&mut libraries, &descriptor.libraries.common, &excluded)?;
                self.push_descriptor_libraries(&mut libraries, &descriptor.libraries.server, &excluded)?;
                descriptor
            }
            None => {
                let descriptor = self.fetch_descriptor(loader).await?;
                let old_guava = is_old_guava(game_version);

                self.push_descriptor_libraries(&mut libraries, &descriptor.libraries.common, &excluded)?;

                if old_guava {
                    if loader.is_legacy() {
                        libraries.push(self.fixed(COMPAT_SHIM, &self.settings.compat_maven)?);
                    }
                    for coord in OLD_GUAVA_LOGGING {
                        libraries.push(self.fixed(coord, &self.settings.mojang_libraries)?);
                    }
                } else {
                    self.push_descriptor_libraries(&mut libraries, &descriptor.libraries.server, &excluded)?;
                }
                descriptor
            }
        };

        let runtime_main_class = descriptor.server_main_class();
        if runtime_main_class.is_empty() {
            return Err(InstallerError::Other(format!(
                "Loader descriptor for {} has an empty server main class",
                loader.name
            )));
        }

        let plan = PackagingPlan {
            launcher_main_class: DEFAULT_LAUNCHER_MAIN_CLASS.to_string(),
            runtime_main_class: runtime_main_class.to_string(),
            strategy: PackagingStrategy::for_loader(&loader.name),
        };

        info!(
            "Resolved {} libraries for {} on {} ({:?})",
            libraries.len(),
            loader,
            game_version,
            plan.strategy
        );

        Ok(Resolution { libraries, plan })
    }

    async fn fetch_descriptor(&self, loader: &LoaderVersion) -> InstallerResult<LoaderDescriptor> {
        let url = loader.family.descriptor_url(self.settings, &loader.name);
        info!("Fetching loader descriptor {}", url);

        let text = self.fetcher.fetch_text(&url).await.map_err(|e| {
            InstallerError::DescriptorFetch {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;

        LoaderDescriptor::parse(&text).map_err(|e| InstallerError::DescriptorFetch {
            url,
            reason: format!("malformed descriptor: {e}"),
        })
    }

    fn loader_spec(&self, loader: &LoaderVersion) -> InstallerResult<DependencySpec> {
        // A supplied jar always lands under the plain fabric-loader coordinate.
        let spec = match &loader.local_archive {
            Some(path) => {
                let coordinate = LoaderFamily::Fabric.coordinate(&loader.name);
                DependencySpec::local(MavenArtifact::parse(&coordinate)?, path)
            }
            None => {
                let artifact = MavenArtifact::parse(&loader.family.coordinate(&loader.name))?;
                DependencySpec::remote(artifact, loader.family.repository(self.settings))
            }
        };
        Ok(spec.with_role(DependencyRole::Loader))
    }

    fn intermediary_spec(&self, game_version: &str) -> InstallerResult<DependencySpec> {
        let artifact = MavenArtifact::parse(&format!("net.fabricmc:intermediary:{game_version}"))?;
        Ok(DependencySpec::remote(artifact, &self.settings.legacy_fabric_maven)
            .with_role(DependencyRole::Intermediary))
    }

    fn fixed(&self, coord: &str, repository: &str) -> InstallerResult<DependencySpec> {
        Ok(DependencySpec::remote(MavenArtifact::parse(coord)?, repository))
    }

    fn push_descriptor_libraries(
        &self,
        out: &mut Vec<DependencySpec>,
        libraries: &[DescriptorLibrary],
        excluded: &[String],
    ) -> InstallerResult<()> {
        for library in libraries {
            let spec = library.to_spec(&self.settings.fabric_maven)?;
            if excluded.contains(&spec.artifact.key()) {
                debug!("Descriptor lists {} explicitly; keeping the pinned entry", spec.coordinate());
                continue;
            }
            out.push(spec);
        }
        Ok(())
    }
}

/// Fails before any I/O for pairings known to produce a broken server.
pub fn check_compatibility(loader: &LoaderVersion, game_version: &str) -> InstallerResult<()> {
    if game_version.trim() == LEGACY_INCOMPATIBLE_GAME && loader.is_legacy() {
        return Err(InstallerError::IncompatibleCombination {
            game_version: game_version.to_string(),
            loader_version: loader.name.clone(),
        });
    }
    Ok(())
}

/// Whether the game bundles a Guava too old for the loader's server libraries.
pub fn is_old_guava(game_version: &str) -> bool {
    compare_versions(game_version, OLD_GUAVA_GAME) != Ordering::Greater
}
