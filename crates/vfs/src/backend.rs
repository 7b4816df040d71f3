use std::time::SystemTime;

use anyhow::{bail, Result};
use async_trait::async_trait;

/// File metadata returned by stat operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub size: u64,
    /// Last modification time (if available)
    pub modified: Option<SystemTime>,
    /// Read-only flag
    pub readonly: bool,
}

impl FileStat {
    /// Create a simple file stat (for backends that don't support full metadata)
    pub const fn file(size: u64) -> Self {
        Self {
            is_file: true,
            is_dir: false,
            size,
            modified: None,
            readonly: false,
        }
    }
}

/// VFS backend trait - all document reads and saves go through this
///
/// Default implementations return "not supported" for optional operations,
/// allowing backends to implement only what they support.
#[async_trait]
pub trait VfsBackend: Send + Sync {
    /// Read entire file contents
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Write entire file contents (create or overwrite)
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Get file/directory metadata
    async fn stat(&self, path: &str) -> Result<FileStat>;

    // ─────────────────────────────────────────────────────────────────────────
    // Optional operations with default implementations
    // ─────────────────────────────────────────────────────────────────────────

    /// List directory contents (basenames only)
    async fn list(&self, _path: &str) -> Result<Vec<String>> {
        bail!("list not supported by this backend")
    }

    /// Create a directory (parent must exist)
    async fn create_dir(&self, _path: &str) -> Result<()> {
        bail!("create_dir not supported by this backend")
    }

    /// Remove a file
    async fn remove_file(&self, _path: &str) -> Result<()> {
        bail!("remove_file not supported by this backend")
    }

    /// Rename/move a file or directory
    async fn rename(&self, _src: &str, _dest: &str) -> Result<()> {
        bail!("rename not supported by this backend")
    }
}
