use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::core::config::InstallerSettings;
use crate::core::downloader::{Downloader, RemoteFetcher};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::installer::{InstallReport, ServerInstaller};
use crate::core::loaders::{LoaderFamily, LoaderVersion};
use crate::core::maven::MavenMetadata;
use crate::core::progress::LogProgress;

const LATEST: &str = "latest";

#[derive(Debug, Parser)]
#[command(name = "server-installer", version, about = "Install a Fabric dedicated server launch jar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file; defaults to `<dir>/installer_settings.json` when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download libraries and write the launch jar
    Install(InstallArgs),
    /// List available loader or game versions
    Versions(VersionsArgs),
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Server directory; libraries go to `<dir>/libraries`
    #[arg(long)]
    pub dir: PathBuf,

    /// Loader version, or `latest`
    #[arg(long, default_value = LATEST)]
    pub loader: String,

    /// Use the legacy loader line (`fabric-loader-1.8.9`)
    #[arg(long)]
    pub legacy: bool,

    /// Game version, or `latest`
    #[arg(long)]
    pub game: String,

    /// Allow `latest` to pick snapshot game versions
    #[arg(long)]
    pub snapshot: bool,

    /// Use this loader jar instead of downloading one
    #[arg(long)]
    pub loader_jar: Option<PathBuf>,

    /// Launch jar path; defaults to `<dir>/fabric-server-launch.jar`
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// List the legacy loader line
    #[arg(long)]
    pub legacy: bool,

    /// List game versions instead of loader versions
    #[arg(long)]
    pub game: bool,

    /// Include snapshots
    #[arg(long)]
    pub snapshot: bool,

    /// How many versions to print, newest first
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

fn family(legacy: bool) -> LoaderFamily {
    if legacy {
        LoaderFamily::Legacy
    } else {
        LoaderFamily::Fabric
    }
}

fn load_settings(config: Option<&Path>, dir: Option<&Path>) -> InstallerResult<InstallerSettings> {
    match (config, dir) {
        (Some(path), _) => InstallerSettings::load(path),
        (None, Some(dir)) => InstallerSettings::load_from_install_dir(dir),
        (None, None) => Ok(InstallerSettings::default()),
    }
}

async fn loader_metadata(
    fetcher: &dyn RemoteFetcher,
    settings: &InstallerSettings,
    family: LoaderFamily,
) -> InstallerResult<MavenMetadata> {
    MavenMetadata::fetch(
        fetcher,
        family.repository(settings),
        LoaderFamily::GROUP_ID,
        family.artifact_id(),
    )
    .await
}

async fn game_metadata(
    fetcher: &dyn RemoteFetcher,
    settings: &InstallerSettings,
) -> InstallerResult<MavenMetadata> {
    MavenMetadata::fetch(
        fetcher,
        &settings.legacy_fabric_maven,
        LoaderFamily::GROUP_ID,
        "intermediary",
    )
    .await
}

/// Turn `latest` into a concrete version using the repository listing.
async fn select_version(
    requested: &str,
    what: &str,
    include_snapshots: bool,
    metadata: impl std::future::Future<Output = InstallerResult<MavenMetadata>>,
) -> InstallerResult<String> {
    if !requested.trim().eq_ignore_ascii_case(LATEST) {
        return Ok(requested.trim().to_string());
    }

    let metadata = metadata.await?;
    let version = metadata
        .latest(include_snapshots)
        .ok_or_else(|| InstallerError::Metadata(format!("no {what} versions published")))?
        .to_string();
    info!("Latest {} version is {}", what, version);
    Ok(version)
}

pub async fn install(args: InstallArgs, config: Option<&Path>) -> InstallerResult<InstallReport> {
    let settings = load_settings(config, Some(&args.dir))?;
    let downloader = Downloader::new(&settings.user_agent)?;
    let family = family(args.legacy);

    let loader_name = select_version(
        &args.loader,
        "loader",
        false,
        loader_metadata(&downloader, &settings, family),
    )
    .await?;
    let game_version = select_version(
        &args.game,
        "game",
        args.snapshot,
        game_metadata(&downloader, &settings),
    )
    .await?;

    let mut loader = LoaderVersion::new(loader_name, family);
    if let Some(jar) = &args.loader_jar {
        loader = loader.with_local_archive(jar);
    }

    ServerInstaller::new(&downloader, &settings)
        .install(
            &args.dir,
            &loader,
            &game_version,
            &LogProgress,
            args.output.as_deref(),
        )
        .await
}

pub async fn versions(args: VersionsArgs, config: Option<&Path>) -> InstallerResult<Vec<String>> {
    let settings = load_settings(config, None)?;
    let downloader = Downloader::new(&settings.user_agent)?;

    let metadata = if args.game {
        game_metadata(&downloader, &settings).await?
    } else {
        loader_metadata(&downloader, &settings, family(args.legacy)).await?
    };

    Ok(metadata
        .versions_newest_first(args.snapshot)
        .into_iter()
        .take(args.limit)
        .map(str::to_string)
        .collect())
}

/// Human summary printed after a successful install.
pub fn describe(report: &InstallReport) -> String {
    let mut out = format!(
        "Launch jar: {}\nMain-Class: {}\nlaunch.mainClass: {}\nLibraries: {}\n",
        report.launch_jar.display(),
        report.plan.launcher_main_class,
        report.plan.runtime_main_class,
        report.libraries.len()
    );

    if report.plan.embed_dependencies() {
        out.push_str(&format!(
            "Embedded {} entries ({} duplicates skipped, {} signature files dropped, {} service files merged)\n",
            report.assembly.entries_written,
            report.assembly.duplicates.len(),
            report.assembly.signatures_discarded,
            report.assembly.registration_files.len()
        ));
    } else {
        out.push_str("Libraries referenced through the manifest Class-Path\n");
    }

    out
}
