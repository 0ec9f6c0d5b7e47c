// ─── Launch Jar Assembler ───
// Writes the server launch jar in one pass: manifest, launch record, then
// (embedding) every library's entries plus the merged service registrations.

use std::collections::HashSet;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::entry::EntryAction;
use super::manifest::{Manifest, CLASS_PATH, MAIN_CLASS, MANIFEST_PATH};
use super::services::RegistrationFiles;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::loaders::PackagingPlan;
use crate::core::progress::ProgressSink;

/// Launch record read by the loader's server launcher.
pub const LAUNCH_PROPERTIES_PATH: &str = "fabric-server-launch.properties";

/// What one assembly wrote and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Entries written, manifest and launch record included.
    pub entries_written: usize,
    /// Paths dropped because an earlier library already provided them.
    pub duplicates: Vec<String>,
    pub signatures_discarded: usize,
    /// Registration paths written after the merge pass, in output order.
    pub registration_files: Vec<String>,
    /// Manifest `Class-Path`, set only when libraries are referenced rather than embedded.
    pub class_path: Option<String>,
}

/// Builds one launch jar. Holds no state between calls.
pub struct JarAssembler<'a> {
    progress: &'a dyn ProgressSink,
}

impl<'a> JarAssembler<'a> {
    pub fn new(progress: &'a dyn ProgressSink) -> Self {
        Self { progress }
    }

    /// Write `output` from scratch. Libraries are merged strictly in the given order.
    ///
    /// A failed assembly leaves whatever was written at `output`.
    pub fn assemble(
        &self,
        output: &Path,
        plan: &PackagingPlan,
        libraries: &[PathBuf],
    ) -> InstallerResult<AssemblyReport> {
        match std::fs::remove_file(output) {
            Ok(()) => debug!("Removed previous {:?}", output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(InstallerError::io(output, e)),
        }

        let file = std::fs::File::create(output).map_err(|e| InstallerError::io(output, e))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default();

        let mut report = AssemblyReport::default();
        let mut added: HashSet<String> = HashSet::new();

        // 1. manifest
        let mut manifest = Manifest::new();
        manifest.set(MAIN_CLASS, plan.launcher_main_class.as_str());
        if !plan.embed_dependencies() {
            let class_path = build_class_path(output, libraries)?;
            manifest.set(CLASS_PATH, class_path.as_str());
            report.class_path = Some(class_path);
        }
        write_entry(&mut zip, output, MANIFEST_PATH, &manifest.to_bytes(), options)?;
        added.insert(MANIFEST_PATH.to_string());
        report.entries_written += 1;

        // 2. launch record
        let record = format!("launch.mainClass={}\n", plan.runtime_main_class);
        write_entry(&mut zip, output, LAUNCH_PROPERTIES_PATH, record.as_bytes(), options)?;
        added.insert(LAUNCH_PROPERTIES_PATH.to_string());
        report.entries_written += 1;

        // 3. library contents
        if plan.embed_dependencies() {
            let mut registrations = RegistrationFiles::new();

            for library in libraries {
                let name = library
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| library.display().to_string());
                self.progress
                    .update(&format!("Generating launch jar: adding library {name}"));

                merge_library(
                    &mut zip,
                    output,
                    library,
                    options,
                    &mut added,
                    &mut registrations,
                    &mut report,
                )?;
            }

            debug!("Writing {} merged registration files", registrations.len());
            for (path, lines) in registrations.iter() {
                write_entry(&mut zip, output, path, &RegistrationFiles::render(lines), options)?;
                report.registration_files.push(path.to_string());
                report.entries_written += 1;
            }
        }

        let mut writer = zip.finish()?;
        writer.flush().map_err(|e| InstallerError::io(output, e))?;

        info!(
            "Wrote {:?}: {} entries, {} duplicates skipped, {} signature files dropped",
            output,
            report.entries_written,
            report.duplicates.len(),
            report.signatures_discarded
        );

        Ok(report)
    }
}

fn write_entry<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    output: &Path,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> InstallerResult<()> {
    zip.start_file(name, options)?;
    zip.write_all(bytes).map_err(|e| InstallerError::io(output, e))
}

/// Stream one library jar into the output.
fn merge_library<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    output: &Path,
    library: &Path,
    options: SimpleFileOptions,
    added: &mut HashSet<String>,
    registrations: &mut RegistrationFiles,
    report: &mut AssemblyReport,
) -> InstallerResult<()> {
    let file = std::fs::File::open(library).map_err(|e| InstallerError::io(library, e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| InstallerError::local_archive(library, e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| InstallerError::local_archive(library, e))?;
        let name = entry.name().to_string();

        match EntryAction::decide(&name, entry.is_dir(), added) {
            EntryAction::SkipDirectory | EntryAction::DropManifest => {}
            EntryAction::MergeRegistration => {
                let new_lines = registrations
                    .merge(&name, &mut entry)
                    .map_err(|e| InstallerError::local_archive(library, e))?;
                debug!("{}: {} new providers from {:?}", name, new_lines, library);
            }
            EntryAction::DiscardSignature => {
                debug!("Dropping signature file {} from {:?}", name, library);
                report.signatures_discarded += 1;
            }
            EntryAction::SkipDuplicate => {
                warn!("duplicate file: {}", name);
                report.duplicates.push(name);
            }
            EntryAction::Copy => {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .map_err(|e| InstallerError::local_archive(library, e))?;
                write_entry(zip, output, &name, &bytes, options)?;
                added.insert(name);
                report.entries_written += 1;
            }
        }
    }

    Ok(())
}

/// Space-separated library paths relative to the output jar's directory.
///
/// Entries are `/`-separated on every platform and percent-escaped where a
/// relative URL would misread them, since the launcher resolves each entry
/// as one.
pub fn build_class_path(output: &Path, libraries: &[PathBuf]) -> InstallerResult<String> {
    let output = absolute(output)?;
    let base = output.parent().unwrap_or(Path::new("/"));

    let mut entries = Vec::with_capacity(libraries.len());
    for library in libraries {
        let library = absolute(library)?;
        let relative = pathdiff::diff_paths(&library, base).unwrap_or(library);
        let entry = relative
            .components()
            .map(|c| escape_url_segment(&c.as_os_str().to_string_lossy()))
            .collect::<Vec<_>>()
            .join("/");
        entries.push(entry);
    }

    Ok(entries.join(" "))
}

fn escape_url_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            other => out.push(other),
        }
    }
    out
}

/// Absolute, lexically normalized path (no `.` or `..` components).
fn absolute(path: &Path) -> InstallerResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| InstallerError::io(path, e))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
