//! [`FileHandle`] implementations for files on disk and in memory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::config::JAVASCRIPT_CONTENT_TYPE;
use crate::manager::{FetchError, FileHandle, FileMetadata};

/// Largest file [`FsFile`] will read (100 MB).
pub const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Content type guessed from a file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "js" | "mjs" | "cjs" => Some(JAVASCRIPT_CONTENT_TYPE),
        "json" => Some("application/json"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}

/// A file on the local file system, read with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
}

impl FsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl FileHandle for FsFile {
    async fn metadata(&self) -> Result<Option<FileMetadata>, FetchError> {
        let mut metadata = FileMetadata::at(self.location());
        metadata.content_type = content_type_for(&self.path).map(str::to_string);
        metadata.name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Some(metadata))
    }

    async fn text(&self) -> Result<String, FetchError> {
        let io_error = |source| FetchError::Io {
            location: self.location(),
            source,
        };
        let size = tokio::fs::metadata(&self.path).await.map_err(io_error)?.len();
        if size > MAX_SOURCE_SIZE {
            return Err(FetchError::TooLarge {
                location: self.location(),
                size,
                max: MAX_SOURCE_SIZE,
            });
        }
        tokio::fs::read_to_string(&self.path).await.map_err(io_error)
    }
}

/// A file whose text is already in memory, such as an open editor buffer.
#[derive(Debug)]
pub struct MemoryFile {
    metadata: Option<FileMetadata>,
    text: Option<String>,
    text_reads: AtomicUsize,
}

impl MemoryFile {
    pub fn new(metadata: Option<FileMetadata>, text: impl Into<String>) -> Self {
        Self {
            metadata,
            text: Some(text.into()),
            text_reads: AtomicUsize::new(0),
        }
    }

    /// A file whose metadata resolves but whose text cannot be read.
    pub fn failing(metadata: FileMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            text: None,
            text_reads: AtomicUsize::new(0),
        }
    }

    /// How many times the text was requested.
    pub fn text_reads(&self) -> usize {
        self.text_reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    async fn metadata(&self) -> Result<Option<FileMetadata>, FetchError> {
        Ok(self.metadata.clone())
    }

    async fn text(&self) -> Result<String, FetchError> {
        self.text_reads.fetch_add(1, Ordering::Relaxed);
        self.text.clone().ok_or_else(|| {
            let location = self
                .metadata
                .as_ref()
                .and_then(|m| m.location.clone())
                .unwrap_or_default();
            FetchError::Text(location)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a/b.js")), Some("application/javascript"));
        assert_eq!(content_type_for(Path::new("b.cjs")), Some("application/javascript"));
        assert_eq!(content_type_for(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_fs_file_missing_is_io_error() {
        let file = FsFile::new("definitely/not/here.js");
        let metadata = file.metadata().await.unwrap().unwrap();
        assert_eq!(metadata.name.as_deref(), Some("here.js"));
        assert!(matches!(file.text().await, Err(FetchError::Io { .. })));
    }
}
