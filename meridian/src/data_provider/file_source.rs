use crate::data_provider::DatasetSource;
use crate::error::WorkbenchError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Loads dataset files from a local directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    folder_path: PathBuf,
}

impl FileSource {
    /// Creates a source reading files relative to `folder_path`.
    pub fn new(folder_path: impl AsRef<Path>) -> Self {
        Self {
            folder_path: folder_path.as_ref().to_path_buf(),
        }
    }

    /// Full path of the file.
    pub fn file_path(&self, file: &str) -> PathBuf {
        self.folder_path.join(file)
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn load(&self, file: &str) -> Result<Bytes, WorkbenchError> {
        let path = self.file_path(file);
        log::debug!("Reading {path:?}");
        let contents = tokio::fs::read(&path).await?;

        Ok(contents.into())
    }
}
