//! Git helpers for cloning remote repositories
//!
//! Shells out to the `git` binary; no libgit2.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{HostError, Result};

/// Directory name `git clone` will create for a URL
///
/// Last path segment with any `.git` suffix removed.
pub fn repo_name_from_url(url: &str) -> Option<&str> {
    let last = url.trim().trim_end_matches('/').rsplit('/').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then_some(name)
}

/// Clone `url` into `parent`, returning the new checkout path
pub async fn clone(url: &str, parent: &Path) -> Result<PathBuf> {
    let url = url.trim();
    let name = repo_name_from_url(url)
        .ok_or_else(|| HostError::Command(format!("Cannot derive a directory name from {url}")))?;

    tracing::info!(%url, parent = %parent.display(), "Running git clone");
    let output = Command::new("git")
        .args(["clone", url])
        .current_dir(parent)
        .output()
        .await
        .map_err(|e| HostError::io(parent, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Command(format!(
            "git clone failed: {}",
            stderr.trim()
        )));
    }

    Ok(parent.join(name))
}
