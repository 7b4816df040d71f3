//! Novem VFS backend
//!
//! Proxies document reads and saves to the resource file endpoints of the
//! Novem API. Only whole-file read and write are supported; directory
//! structure is browsed through the tree view instead.
//!
//! Path format: `/<kind>/<id>/<path>` (see [`crate::NovemUri`])

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use novem_api::NovemApi;

use super::{FileStat, VfsBackend};

/// VFS backend for remote resource files
pub struct NovemFsBackend {
    api: Arc<NovemApi>,
}

impl NovemFsBackend {
    pub const fn new(api: Arc<NovemApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VfsBackend for NovemFsBackend {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let content = self
            .api
            .read_file(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {path}: {e}"))?;

        Ok(content.into_bytes())
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let content = String::from_utf8_lossy(data);

        self.api
            .write_file(path, &content)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {path}: {e}"))
    }

    async fn stat(&self, _path: &str) -> Result<FileStat> {
        // The remote reports no size or timestamps for nodes
        Ok(FileStat::file(0))
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        bail!("Method not implemented: list ({path})")
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        bail!("Method not implemented: create_dir ({path})")
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        bail!("Method not implemented: remove_file ({path})")
    }

    async fn rename(&self, src: &str, _dest: &str) -> Result<()> {
        bail!("Method not implemented: rename ({src})")
    }
}
