use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::core::error::{InstallerError, InstallerResult};

/// Expected digest of a library file, as published next to it in the loader descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checksum {
    Sha512(String),
    Sha256(String),
    Sha1(String),
    Md5(String),
}

impl Checksum {
    /// Pick the strongest digest the descriptor offers.
    pub fn strongest(
        sha512: Option<&str>,
        sha256: Option<&str>,
        sha1: Option<&str>,
        md5: Option<&str>,
    ) -> Option<Self> {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase)
        };

        clean(sha512)
            .map(Checksum::Sha512)
            .or_else(|| clean(sha256).map(Checksum::Sha256))
            .or_else(|| clean(sha1).map(Checksum::Sha1))
            .or_else(|| clean(md5).map(Checksum::Md5))
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            Checksum::Sha512(_) => "SHA-512",
            Checksum::Sha256(_) => "SHA-256",
            Checksum::Sha1(_) => "SHA-1",
            Checksum::Md5(_) => "MD5",
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            Checksum::Sha512(v) | Checksum::Sha256(v) | Checksum::Sha1(v) | Checksum::Md5(v) => v,
        }
    }

    pub fn digest(&self, bytes: &[u8]) -> String {
        match self {
            Checksum::Sha512(_) => hex::encode(Sha512::digest(bytes)),
            Checksum::Sha256(_) => hex::encode(Sha256::digest(bytes)),
            Checksum::Sha1(_) => hex::encode(Sha1::digest(bytes)),
            Checksum::Md5(_) => hex::encode(Md5::digest(bytes)),
        }
    }

    /// Fails with [`InstallerError::ChecksumMismatch`] naming `path`.
    pub fn verify(&self, path: &Path, bytes: &[u8]) -> InstallerResult<()> {
        let actual = self.digest(bytes);
        if actual == self.expected() {
            return Ok(());
        }

        Err(InstallerError::ChecksumMismatch {
            path: path.to_path_buf(),
            algorithm: self.algorithm(),
            expected: self.expected().to_string(),
            actual,
        })
    }

    /// Whether an already materialized file still matches.
    pub async fn matches_file(&self, path: &Path) -> InstallerResult<bool> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| InstallerError::io(path, e))?;
        Ok(self.digest(&bytes) == self.expected())
    }
}
