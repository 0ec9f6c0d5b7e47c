use std::collections::HashSet;

use super::manifest::MANIFEST_PATH;
use super::services::RegistrationFiles;

const SIGNATURE_DIR: &str = "META-INF/";
const SIGNATURE_EXTENSIONS: [&str; 4] = ["SF", "DSA", "RSA", "EC"];

/// What happens to one entry of an input jar while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    SkipDirectory,
    /// A library's own manifest; the launch jar writes its own.
    DropManifest,
    /// Service registration: unioned with every other jar's copy, written at the end.
    MergeRegistration,
    /// Signature block or signed digest; invalid once jars are merged.
    DiscardSignature,
    /// Path already written by an earlier jar; the first writer wins.
    SkipDuplicate,
    Copy,
}

impl EntryAction {
    /// Decide in this order: directory, manifest, registration, signature,
    /// duplicate, copy.
    pub fn decide(name: &str, is_dir: bool, added: &HashSet<String>) -> Self {
        if is_dir || name.ends_with('/') {
            EntryAction::SkipDirectory
        } else if name == MANIFEST_PATH {
            EntryAction::DropManifest
        } else if RegistrationFiles::is_registration_path(name) {
            EntryAction::MergeRegistration
        } else if is_signature_file(name) {
            EntryAction::DiscardSignature
        } else if added.contains(name) {
            EntryAction::SkipDuplicate
        } else {
            EntryAction::Copy
        }
    }
}

/// `META-INF/<name>.(SF|DSA|RSA|EC)`, directly under `META-INF/`.
pub fn is_signature_file(name: &str) -> bool {
    let Some(file) = name.strip_prefix(SIGNATURE_DIR) else {
        return false;
    };
    if file.contains('/') {
        return false;
    }

    match file.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && SIGNATURE_EXTENSIONS.contains(&ext),
        None => false,
    }
}
