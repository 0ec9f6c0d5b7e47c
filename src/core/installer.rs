// ─── Server Installer ───
// resolve → materialize each library → pick the launcher class → assemble.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::config::InstallerSettings;
use crate::core::downloader::RemoteFetcher;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::jar::{read_manifest_main_class, AssemblyReport, JarAssembler};
use crate::core::loaders::{
    check_compatibility, DependencyResolver, DependencyRole, DependencySource, DependencySpec,
    LoaderVersion, PackagingPlan, ResolvedLibrary,
};
use crate::core::progress::ProgressSink;

/// Outcome of a finished install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub launch_jar: PathBuf,
    pub libraries: Vec<ResolvedLibrary>,
    pub plan: PackagingPlan,
    pub assembly: AssemblyReport,
}

pub struct ServerInstaller<'a> {
    fetcher: &'a dyn RemoteFetcher,
    settings: &'a InstallerSettings,
}

impl<'a> ServerInstaller<'a> {
    pub fn new(fetcher: &'a dyn RemoteFetcher, settings: &'a InstallerSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Install a server into `dir`. The jar goes to `launch_jar`, or to the
    /// configured default name inside `dir`.
    pub async fn install(
        &self,
        dir: &Path,
        loader: &LoaderVersion,
        game_version: &str,
        progress: &dyn ProgressSink,
        launch_jar: Option<&Path>,
    ) -> InstallerResult<InstallReport> {
        check_compatibility(loader, game_version)?;

        progress.update(&format!(
            "Installing server {}({})",
            loader.name, game_version
        ));

        let libs_dir = self.settings.libraries_dir(dir);
        tokio::fs::create_dir_all(&libs_dir)
            .await
            .map_err(|e| InstallerError::io(&libs_dir, e))?;

        progress.update("Downloading libraries");

        let resolution = DependencyResolver::new(self.fetcher, self.settings)
            .resolve(loader, game_version)
            .await?;
        let mut plan = resolution.plan;

        let mut libraries = Vec::with_capacity(resolution.libraries.len());
        for spec in resolution.libraries {
            let local_file = self.materialize(&spec, &libs_dir, progress).await?;

            if spec.role == DependencyRole::Loader {
                let jar = local_file.clone();
                match tokio::task::spawn_blocking(move || read_manifest_main_class(&jar)).await?? {
                    Some(main_class) => {
                        debug!("Loader jar declares Main-Class {}", main_class);
                        plan.launcher_main_class = main_class;
                    }
                    None => warn!(
                        "Loader jar {:?} declares no Main-Class, keeping {}",
                        local_file, plan.launcher_main_class
                    ),
                }
            }

            libraries.push(ResolvedLibrary::new(spec, local_file));
        }

        progress.update("Generating launch jar");

        let launch_jar = launch_jar
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.launch_jar(dir));
        let files: Vec<PathBuf> = libraries.iter().map(|l| l.local_file.clone()).collect();
        let assembly = assemble_off_runtime(launch_jar.clone(), plan.clone(), files, progress).await?;

        info!(
            "Server {} for {} installed to {:?}",
            loader, game_version, launch_jar
        );

        Ok(InstallReport {
            launch_jar,
            libraries,
            plan,
            assembly,
        })
    }

    /// Put one dependency's bytes under `libs_dir`.
    async fn materialize(
        &self,
        spec: &DependencySpec,
        libs_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> InstallerResult<PathBuf> {
        let dest = spec.destination(libs_dir);

        match &spec.source {
            DependencySource::Remote { .. } => {
                progress.update(&format!("Downloading library {}", spec.coordinate()));

                if let Some(checksum) = &spec.checksum {
                    if dest.is_file() && checksum.matches_file(&dest).await? {
                        debug!("Reusing verified {:?}", dest);
                        return Ok(dest);
                    }
                }

                let url = spec.url().ok_or_else(|| {
                    InstallerError::Other(format!("No download URL for {}", spec.coordinate()))
                })?;
                self.fetcher
                    .fetch_file(&url, &dest, spec.checksum.as_ref())
                    .await?;
            }
            DependencySource::Local { path } => {
                progress.update(&format!("Copying library {}", spec.coordinate()));
                copy_local(path, &dest).await?;
            }
        }

        Ok(dest)
    }
}

/// Run the blocking jar assembly on the blocking pool, relaying its status
/// lines to `progress` in the order they were emitted.
async fn assemble_off_runtime(
    launch_jar: PathBuf,
    plan: PackagingPlan,
    files: Vec<PathBuf>,
    progress: &dyn ProgressSink,
) -> InstallerResult<AssemblyReport> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    let job = tokio::task::spawn_blocking(move || {
        let relay = move |status: &str| {
            let _ = tx.send(status.to_string());
        };
        JarAssembler::new(&relay).assemble(&launch_jar, &plan, &files)
    });

    while let Some(status) = rx.recv().await {
        progress.update(&status);
    }

    job.await?
}

async fn copy_local(source: &Path, dest: &Path) -> InstallerResult<()> {
    if !source.is_file() {
        return Err(InstallerError::local_archive(source, "file not found"));
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| InstallerError::io(parent, e))?;
    }

    // copying a file onto itself would truncate it
    if let (Ok(a), Ok(b)) = (
        tokio::fs::canonicalize(source).await,
        tokio::fs::canonicalize(dest).await,
    ) {
        if a == b {
            return Ok(());
        }
    }

    tokio::fs::copy(source, dest)
        .await
        .map_err(|e| InstallerError::io(dest, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::Checksum;
    use crate::core::jar::{Manifest, LAUNCH_PROPERTIES_PATH, MANIFEST_PATH};
    use crate::core::loaders::{LoaderFamily, PackagingStrategy};
    use crate::core::maven::MavenArtifact;
    use crate::core::progress::RecordingProgress;
    use crate::core::testing::{entry, jar_bytes, read_jar, write_jar, FakeFetcher};

    const SERVICE: &str = "META-INF/services/org.example.Plugin";
    const LOADER_MAIN: &str = "net.fabricmc.loader.impl.launch.server.FabricServerLauncher";

    fn descriptor() -> String {
        r#"{
            "libraries": {
                "common": [ { "name": "org.example:alpha:1.0", "url": "https://repo.example.org/" } ],
                "server": [ { "name": "org.example:beta:2.0", "url": "https://repo.example.org/" } ]
            },
            "mainClass": { "server": "net.fabricmc.loader.impl.launch.knot.KnotServer" }
        }"#
        .to_string()
    }

    fn url(coord: &str, repo: &str) -> String {
        MavenArtifact::parse(coord).unwrap().url(repo)
    }

    fn fetcher_for(loader: &str, settings: &InstallerSettings) -> FakeFetcher {
        let loader_coord = format!("net.fabricmc:fabric-loader:{loader}");
        FakeFetcher::default()
            .with(
                LoaderFamily::Fabric.descriptor_url(settings, loader),
                descriptor(),
            )
            .with(
                url(&loader_coord, &settings.fabric_maven),
                jar_bytes(&[
                    (
                        MANIFEST_PATH,
                        format!("Manifest-Version: 1.0\r\nMain-Class: {LOADER_MAIN}\r\n\r\n").as_bytes(),
                    ),
                    ("net/fabricmc/loader/Loader.class", b"loader"),
                    (SERVICE, b"a\nb\n"),
                ]),
            )
            .with(
                url("net.fabricmc:intermediary:1.20.1", &settings.legacy_fabric_maven),
                jar_bytes(&[("mappings/mappings.tiny", b"tiny")]),
            )
            .with(
                url("org.example:alpha:1.0", "https://repo.example.org/"),
                jar_bytes(&[
                    (SERVICE, b"b\nc # provider\n"),
                    ("net/fabricmc/loader/Loader.class", b"shadowed"),
                    ("META-INF/ALPHA.SF", b"sig"),
                ]),
            )
            .with(
                url("org.example:beta:2.0", "https://repo.example.org/"),
                jar_bytes(&[("beta/Beta.class", b"beta")]),
            )
    }

    #[tokio::test]
    async fn embedding_install_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let fetcher = fetcher_for("0.12.5", &settings);
        let progress = RecordingProgress::default();
        let loader = LoaderVersion::new("0.12.5", LoaderFamily::Fabric);

        let report = ServerInstaller::new(&fetcher, &settings)
            .install(dir.path(), &loader, "1.20.1", &progress, None)
            .await
            .unwrap();

        assert_eq!(report.launch_jar, dir.path().join("fabric-server-launch.jar"));
        assert_eq!(report.plan.strategy, PackagingStrategy::Embed);
        assert_eq!(report.plan.launcher_main_class, LOADER_MAIN);
        assert_eq!(report.libraries.len(), 4);
        assert!(report.libraries[0]
            .local_file
            .ends_with("libraries/net/fabricmc/fabric-loader/0.12.5/fabric-loader-0.12.5.jar"));

        let entries = read_jar(&report.launch_jar);
        assert_eq!(entry(&entries, SERVICE), Some(&b"a\nb\nc\n"[..]));
        assert_eq!(
            entry(&entries, "net/fabricmc/loader/Loader.class"),
            Some(&b"loader"[..])
        );
        assert_eq!(entry(&entries, "beta/Beta.class"), Some(&b"beta"[..]));
        assert!(entry(&entries, "META-INF/ALPHA.SF").is_none());
        assert_eq!(
            entry(&entries, LAUNCH_PROPERTIES_PATH),
            Some(&b"launch.mainClass=net.fabricmc.loader.impl.launch.knot.KnotServer\n"[..])
        );

        let lines = progress.lines();
        assert_eq!(lines[0], "Installing server 0.12.5(1.20.1)");
        assert_eq!(lines[1], "Downloading libraries");
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("Downloading library ")).count(),
            4
        );
        assert!(lines.contains(&"Generating launch jar".to_string()));
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("Generating launch jar: adding library")).count(),
            4
        );
    }

    #[tokio::test]
    async fn class_path_install_writes_only_manifest_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let fetcher = fetcher_for("0.14.21", &settings);
        let progress = RecordingProgress::default();
        let loader = LoaderVersion::new("0.14.21", LoaderFamily::Fabric);
        let output = dir.path().join("custom-launch.jar");

        let report = ServerInstaller::new(&fetcher, &settings)
            .install(dir.path(), &loader, "1.20.1", &progress, Some(&output))
            .await
            .unwrap();

        assert_eq!(report.launch_jar, output);
        let entries = read_jar(&output);
        assert_eq!(entries.len(), 2);

        let manifest = Manifest::parse(&String::from_utf8_lossy(entry(&entries, MANIFEST_PATH).unwrap()));
        assert_eq!(manifest.get("Main-Class"), Some(LOADER_MAIN));
        let class_path: Vec<&str> = manifest.get("Class-Path").unwrap().split(' ').collect();
        assert_eq!(
            class_path,
            vec![
                "libraries/net/fabricmc/fabric-loader/0.14.21/fabric-loader-0.14.21.jar",
                "libraries/net/fabricmc/intermediary/1.20.1/intermediary-1.20.1.jar",
                "libraries/org/example/alpha/1.0/alpha-1.0.jar",
                "libraries/org/example/beta/2.0/beta-2.0.jar",
            ]
        );
    }

    #[tokio::test]
    async fn local_loader_jar_is_copied_and_its_descriptor_used() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let loader_jar = dir.path().join("downloads/loader.jar");
        write_jar(
            &loader_jar,
            &[
                ("fabric-installer.json", descriptor().as_bytes()),
                ("net/fabricmc/loader/Loader.class", b"loader"),
            ],
        );
        let fetcher = fetcher_for("0.13.3", &settings);
        let progress = RecordingProgress::default();
        let loader = LoaderVersion::new("0.13.3", LoaderFamily::Fabric).with_local_archive(&loader_jar);

        let report = ServerInstaller::new(&fetcher, &settings)
            .install(dir.path().join("server").as_path(), &loader, "1.20.1", &progress, None)
            .await
            .unwrap();

        // no manifest in the supplied jar: default launcher class stays
        assert_eq!(
            report.plan.launcher_main_class,
            crate::core::loaders::DEFAULT_LAUNCHER_MAIN_CLASS
        );
        assert!(report.libraries[0].local_file.is_file());
        assert!(progress.lines().iter().any(|l| l.starts_with("Copying library net.fabricmc:fabric-loader:0.13.3")));
        assert!(!fetcher.requests().iter().any(|u| u.ends_with(".json")));
    }

    #[tokio::test]
    async fn verified_library_is_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let bytes = jar_bytes(&[("x/X.class", b"x")]);
        let checksum = Checksum::Sha1(Checksum::Sha1(String::new()).digest(&bytes));

        let artifact = MavenArtifact::parse("org.example:gamma:1.0").unwrap();
        let spec = DependencySpec::remote(artifact, "https://repo.example.org/")
            .with_checksum(Some(checksum));
        let libs = dir.path().join("libraries");
        std::fs::create_dir_all(spec.destination(&libs).parent().unwrap()).unwrap();
        std::fs::write(spec.destination(&libs), &bytes).unwrap();

        let fetcher = FakeFetcher::default();
        let installer = ServerInstaller::new(&fetcher, &settings);
        let path = installer
            .materialize(&spec, &libs, &RecordingProgress::default())
            .await
            .unwrap();

        assert_eq!(path, spec.destination(&libs));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn incompatible_pair_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("server");
        let settings = InstallerSettings::default();
        let fetcher = FakeFetcher::default();
        let progress = RecordingProgress::default();
        let loader = LoaderVersion::new("0.11.2", LoaderFamily::Legacy);

        let err = ServerInstaller::new(&fetcher, &settings)
            .install(&target, &loader, "1.8.9", &progress, None)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallerError::IncompatibleCombination { .. }));
        assert!(!target.exists());
        assert!(progress.lines().is_empty());
    }

    #[tokio::test]
    async fn corrupt_loader_download_is_a_local_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let loader_url = url("net.fabricmc:fabric-loader:0.14.21", &settings.fabric_maven);
        let fetcher = fetcher_for("0.14.21", &settings).with(loader_url, b"<html>not a jar</html>".to_vec());
        let loader = LoaderVersion::new("0.14.21", LoaderFamily::Fabric);

        let err = ServerInstaller::new(&fetcher, &settings)
            .install(dir.path(), &loader, "1.20.1", &RecordingProgress::default(), None)
            .await
            .unwrap_err();

        match err {
            InstallerError::LocalArchive { path, .. } => {
                assert!(path.ends_with("fabric-loader-0.14.21.jar"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("fabric-server-launch.jar").exists());
    }

    #[tokio::test]
    async fn failed_download_aborts_install() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InstallerSettings::default();
        let fetcher = FakeFetcher::default().with(
            LoaderFamily::Fabric.descriptor_url(&settings, "0.14.21"),
            descriptor(),
        );
        let loader = LoaderVersion::new("0.14.21", LoaderFamily::Fabric);

        let err = ServerInstaller::new(&fetcher, &settings)
            .install(dir.path(), &loader, "1.20.1", &RecordingProgress::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallerError::DownloadFailed { status: 404, .. }));
        assert!(!dir.path().join("fabric-server-launch.jar").exists());
    }
}
