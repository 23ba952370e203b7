//! Loading of dataset files and manifests.
//!
//! A [`DatasetSource`] resolves file names of a manifest into raw bytes. The crate provides [`FileSource`] for
//! local directories and, with the `url` feature, [`UrlSource`] for HTTP servers.

mod file_source;
mod manifest;
mod shapefile;
#[cfg(feature = "url")]
mod url_source;

pub use file_source::FileSource;
pub use manifest::{fetch_all, load_manifest, parse_manifest, parse_dataset, ManifestEntry};
pub use shapefile::ShapefileDecoder;
#[cfg(feature = "url")]
pub use url_source::UrlSource;

use crate::error::WorkbenchError;
use async_trait::async_trait;
use bytes::Bytes;

/// Source of dataset files.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Loads the contents of the file with the given name.
    async fn load(&self, file: &str) -> Result<Bytes, WorkbenchError>;
}
