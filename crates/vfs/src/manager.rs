//! VFS Manager - coordinator for backends, open documents and events
//!
//! Features:
//! - Backend registry keyed by URI scheme (hot-swappable on profile switch)
//! - File change event notifications
//! - Open document tracking (uri -> doctype)
//!
//! No read cache; every read goes to the remote.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, RwLock};

use super::backend::{FileStat, VfsBackend};
use super::uri::NovemUri;

/// File change event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsEvent {
    /// File was read
    Read { uri: String },
    /// File was written
    Write { uri: String },
    /// Backend was registered or replaced
    BackendAdded { scheme: String },
    /// Backend was removed
    BackendRemoved { scheme: String },
}

/// A remote file currently open as an editor document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    pub uri: NovemUri,
    /// Language id the editor should use (`nv_markdown`, `json`, ...)
    pub doctype: String,
}

/// VFS manager - routes URIs to backends and broadcasts changes
pub struct VfsManager {
    /// Registered backends by scheme
    backends: RwLock<HashMap<String, Arc<dyn VfsBackend>>>,
    /// Open documents by URI string
    documents: RwLock<HashMap<String, OpenDocument>>,
    /// Event broadcast channel
    event_tx: broadcast::Sender<VfsEvent>,
}

impl Default for VfsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VfsManager {
    /// Create a new VFS manager
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            backends: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backend Management (Hot-Swap)
    // ─────────────────────────────────────────────────────────────────────────

    /// Register (or replace) the backend serving a scheme
    pub async fn register_backend(&self, scheme: impl Into<String>, backend: Box<dyn VfsBackend>) {
        let scheme = scheme.into();
        self.backends
            .write()
            .await
            .insert(scheme.clone(), Arc::from(backend));
        tracing::debug!(%scheme, "VFS backend registered");
        let _ = self.event_tx.send(VfsEvent::BackendAdded { scheme });
    }

    /// Remove a backend
    pub async fn remove_backend(&self, scheme: &str) {
        self.backends.write().await.remove(scheme);
        let _ = self.event_tx.send(VfsEvent::BackendRemoved {
            scheme: scheme.to_string(),
        });
    }

    /// Get the backend serving a scheme
    pub async fn get_backend(&self, scheme: &str) -> Result<Arc<dyn VfsBackend>> {
        self.backends
            .read()
            .await
            .get(scheme)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown VFS scheme: {scheme}"))
    }

    /// List registered schemes
    pub async fn list_backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscribe to VFS events
    pub fn subscribe(&self) -> broadcast::Receiver<VfsEvent> {
        self.event_tx.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a document by URI
    pub async fn read_file(&self, uri: &str) -> Result<Vec<u8>> {
        let parsed = NovemUri::parse(uri)?;
        let backend = self.get_backend(&parsed.scheme).await?;
        let data = backend.read(&parsed.resource_path()).await?;

        let _ = self.event_tx.send(VfsEvent::Read {
            uri: parsed.to_string(),
        });
        Ok(data)
    }

    /// Save a document by URI
    pub async fn write_file(&self, uri: &str, data: &[u8]) -> Result<()> {
        let parsed = NovemUri::parse(uri)?;
        let backend = self.get_backend(&parsed.scheme).await?;
        backend.write(&parsed.resource_path(), data).await?;

        tracing::info!(uri = %parsed, bytes = data.len(), "Saved remote document");
        let _ = self.event_tx.send(VfsEvent::Write {
            uri: parsed.to_string(),
        });
        Ok(())
    }

    pub async fn stat(&self, uri: &str) -> Result<FileStat> {
        let parsed = NovemUri::parse(uri)?;
        let backend = self.get_backend(&parsed.scheme).await?;
        backend.stat(&parsed.resource_path()).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Track a document opened from the tree
    pub async fn register_document(&self, uri: &str, doctype: impl Into<String>) -> Result<OpenDocument> {
        let parsed = NovemUri::parse(uri)?;
        let document = OpenDocument {
            uri: parsed,
            doctype: doctype.into(),
        };
        self.documents
            .write()
            .await
            .insert(document.uri.to_string(), document.clone());
        Ok(document)
    }

    pub async fn get_document(&self, uri: &str) -> Option<OpenDocument> {
        self.documents.read().await.get(uri).cloned()
    }

    pub async fn unregister_document(&self, uri: &str) {
        self.documents.write().await.remove(uri);
    }

    /// List all open documents, sorted by URI
    pub async fn open_documents(&self) -> Vec<OpenDocument> {
        let mut docs: Vec<OpenDocument> = self.documents.read().await.values().cloned().collect();
        docs.sort_by_key(|d| d.uri.to_string());
        docs
    }

    /// Forget every open document (on deactivate)
    pub async fn clear_documents(&self) {
        self.documents.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records writes, serves a fixed body for reads
    #[derive(Default)]
    struct Recording {
        writes: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl VfsBackend for Recording {
        async fn read(&self, path: &str) -> Result<Vec<u8>> {
            Ok(format!("content of {path}").into_bytes())
        }

        async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
            self.writes.lock().unwrap().push((path.to_string(), data.to_vec()));
            Ok(())
        }

        async fn stat(&self, _path: &str) -> Result<FileStat> {
            Ok(FileStat::file(0))
        }
    }

    #[tokio::test]
    async fn test_routes_by_scheme() {
        let mgr = VfsManager::new();
        mgr.register_backend("novem", Box::new(Recording::default())).await;

        let data = mgr.read_file("novem:/plots/sales/data").await.unwrap();
        assert_eq!(data, b"content of /plots/sales/data");

        let err = mgr.read_file("other:/plots/sales/data").await.unwrap_err();
        assert!(err.to_string().contains("Unknown VFS scheme"));
    }

    #[tokio::test]
    async fn test_events_emitted() {
        let mgr = VfsManager::new();
        let mut events = mgr.subscribe();
        mgr.register_backend("novem", Box::new(Recording::default())).await;
        mgr.write_file("novem:/mails/weekly/content", b"hi").await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            VfsEvent::BackendAdded { scheme: "novem".into() }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            VfsEvent::Write { uri: "novem:/mails/weekly/content".into() }
        );
    }

    #[tokio::test]
    async fn test_document_tracking() {
        let mgr = VfsManager::new();
        mgr.register_document("novem:/plots/b/data", "nv_markdown").await.unwrap();
        mgr.register_document("novem:/jobs/a/data", "json").await.unwrap();

        let docs = mgr.open_documents().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].doctype, "json");

        mgr.unregister_document("novem:/jobs/a/data").await;
        assert!(mgr.get_document("novem:/jobs/a/data").await.is_none());
        assert!(mgr.register_document("not-a-uri", "json").await.is_err());
    }
}
