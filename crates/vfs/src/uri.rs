//! Editor-side URIs for remote resource files
//!
//! Format: `novem:/<kind>/<id>/<path...>`, e.g. `novem:/plots/sales/config/type`

use std::fmt;

use anyhow::{anyhow, bail, Result};
use novem_protocol::ResourceKind;

/// Scheme the Novem backend is registered under
pub const NOVEM_SCHEME: &str = "novem";

/// Parsed `scheme:/<kind>/<id>/<path>` URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NovemUri {
    pub scheme: String,
    pub kind: ResourceKind,
    pub id: String,
    /// Remainder inside the resource, may be empty and may contain `/`
    pub path: String,
}

impl NovemUri {
    pub fn new(kind: ResourceKind, id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: NOVEM_SCHEME.to_string(),
            kind,
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid URI: missing scheme (got: {uri})"))?;
        if scheme.is_empty() {
            bail!("Invalid URI: empty scheme (got: {uri})");
        }

        let (scheme, resource_path) = (scheme.to_string(), rest.trim_start_matches('/'));
        let parts: Vec<&str> = resource_path.splitn(3, '/').collect();
        if parts.len() < 2 || parts[1].is_empty() {
            bail!("Invalid URI format: {scheme}:/<kind>/<id>/<path> (got: {uri})");
        }

        let kind = parts[0]
            .parse::<ResourceKind>()
            .map_err(|e| anyhow!("Invalid URI {uri}: {e}"))?;

        Ok(Self {
            scheme,
            kind,
            id: parts[1].to_string(),
            path: parts.get(2).copied().unwrap_or_default().to_string(),
        })
    }

    /// Path understood by the remote file endpoints (`/<kind>/<id>/<path>`)
    pub fn resource_path(&self) -> String {
        if self.path.is_empty() {
            format!("/{}/{}", self.kind, self.id)
        } else {
            format!("/{}/{}/{}", self.kind, self.id, self.path)
        }
    }
}

impl fmt::Display for NovemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.resource_path())
    }
}
