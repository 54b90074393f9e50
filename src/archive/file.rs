//! File-backed document archiver

use crate::archive::{encode_key, ArchiveError, DocumentArchiver};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ArchivedDocument<'a> {
    url: &'a str,
    document: &'a str,
}

/// Writes each page to `<dir>/<encoded url>.json`
#[derive(Debug, Clone)]
pub struct FileArchiver {
    dir: PathBuf,
}

impl FileArchiver {
    /// Creates the archiver, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(url)))
    }
}

#[async_trait]
impl DocumentArchiver for FileArchiver {
    async fn archive(&self, url: &str, rendered: &str) -> Result<(), ArchiveError> {
        let record = serde_json::to_vec(&ArchivedDocument {
            url,
            document: rendered,
        })?;
        let path = self.path_for(url);
        tokio::fs::write(&path, record).await?;
        tracing::debug!("Archived {} to {}", url, path.display());
        Ok(())
    }
}
