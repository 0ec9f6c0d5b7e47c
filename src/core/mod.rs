// ─── Server Installer Core ───
// Resolves a loader's server libraries and assembles the launch jar.
//
// Architecture:
//   core/
//     loaders/    — Loader families, descriptor, dependency resolver, packaging plan
//     maven/      — Coordinates, repository layout, maven-metadata listings
//     downloader/ — Remote fetch seam, HTTP downloader, checksums
//     jar/        — Manifest, service registrations, entry rules, assembler
//     installer   — End-to-end server install
//     config      — Installer settings (JSON)
//     progress    — Status side channel

pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod installer;
pub mod jar;
pub mod loaders;
pub mod maven;
pub mod progress;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
