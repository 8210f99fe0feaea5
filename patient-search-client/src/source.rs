use crate::Error;
use std::fs;
use std::path::Path;

/// Where batch lookups get their keys from. Never fails: an unavailable
/// source reads as no lines.
pub trait LineSource: Send + Sync {
    fn read_lines(&self, path: &Path) -> Vec<String>;
}

/// Reads keys from a UTF-8 file on disk, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLineSource;

impl FileLineSource {
    pub fn try_read_lines(&self, path: &Path) -> Result<Vec<String>, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

impl LineSource for FileLineSource {
    fn read_lines(&self, path: &Path) -> Vec<String> {
        self.try_read_lines(path).unwrap_or_else(|e| {
            log::error!("{}", e);
            vec![]
        })
    }
}
