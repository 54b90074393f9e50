//! Cold-start seed URLs

use crate::config::{validate_seed_url, SeedConfig};
use crate::{FrontierError, Result};
use std::path::{Path, PathBuf};

/// An ordered list of initial URLs, consulted once at cold start
pub trait SeedSource: Send + Sync {
    fn seeds(&self) -> Result<Vec<String>>;
}

impl SeedSource for Vec<String> {
    fn seeds(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}

/// Seeds from configuration: inline URLs followed by an optional seed file
///
/// The seed file holds one URL per line; blank lines and lines starting with
/// `#` are ignored, as are lines that are not absolute http(s) URLs.
#[derive(Debug, Clone, Default)]
pub struct SeedList {
    urls: Vec<String>,
    file: Option<PathBuf>,
}

impl SeedList {
    pub fn new(urls: Vec<String>, file: Option<PathBuf>) -> Self {
        Self { urls, file }
    }

    pub fn from_config(config: &SeedConfig) -> Self {
        Self::new(config.urls.clone(), config.file.as_ref().map(PathBuf::from))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FrontierError::Seeds(format!("cannot read seed file {}: {}", path.display(), e))
        })?;

        let mut seeds = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match validate_seed_url(line) {
                Ok(()) => seeds.push(line.to_string()),
                Err(e) => tracing::warn!(
                    "Ignoring seed on line {} of {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(seeds)
    }
}

impl SeedSource for SeedList {
    fn seeds(&self) -> Result<Vec<String>> {
        let mut seeds = self.urls.clone();
        if let Some(path) = &self.file {
            seeds.extend(self.read_file(path)?);
        }
        Ok(seeds)
    }
}
