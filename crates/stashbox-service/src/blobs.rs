//! Durable byte storage on the local filesystem.
//!
//! File bytes live in a flat directory under server-generated object names
//! (`<uuid>.<ext>`), so nothing user-controlled reaches the filesystem
//! layer. Metadata lives in the store; this module only moves bytes.

use std::io;
use std::path::{Path, PathBuf};

/// Byte storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open the blob store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Absolute path for an object name.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write an object, overwriting any existing bytes at that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(self.path_for(name), bytes).await
    }

    /// Read an object's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or unreadable.
    pub async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(name)).await
    }

    /// Delete an object if it exists. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures other than a missing object.
    pub async fn delete_if_exists(&self, name: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
