mod checksum;
mod client;

pub use checksum::Checksum;
pub use client::{Downloader, RemoteFetcher};
