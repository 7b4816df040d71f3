//! On-disk config file access

use std::path::{Path, PathBuf};

use super::{
    non_empty, ConfigOverrides, ConfigResolver, EffectiveConfig, IniDocument, LoginCredentials,
};
use crate::error::{HostError, Result};

const NOVEM_DIR: &str = "novem";
const NOVEM_FILE: &str = "novem.conf";

/// Reads and rewrites `novem.conf` for one app scope
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    resolver: ConfigResolver,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, resolver: ConfigResolver) -> Self {
        Self {
            path: path.into(),
            resolver,
        }
    }

    /// Store at [`Self::default_path`]
    pub fn open_default(resolver: ConfigResolver) -> Result<Self> {
        Ok(Self::new(Self::default_path()?, resolver))
    }

    /// `<config dir>/novem/novem.conf`
    ///
    /// Config dir is `$XDG_CONFIG_HOME`, else `~/.config`; on Windows the
    /// local app data directory.
    pub fn default_path() -> Result<PathBuf> {
        Ok(user_config_dir()?.join(NOVEM_DIR).join(NOVEM_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// File contents, `None` when the file does not exist
    pub fn read_text(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HostError::io(&self.path, e)),
        }
    }

    fn read_document(&self) -> Result<Option<IniDocument>> {
        Ok(self.read_text()?.map(|text| IniDocument::parse(&text)))
    }

    /// Resolve the effective config from disk
    pub fn load(&self, overrides: &ConfigOverrides) -> Result<EffectiveConfig> {
        if overrides.ignore_config {
            return Ok(EffectiveConfig {
                api_root: overrides.api_root.clone().filter(|r| !r.is_empty()),
                ..Default::default()
            });
        }

        let text = self.read_text()?;
        self.resolver.resolve(text.as_deref(), overrides)
    }

    /// Every `profile:<name>` section, in file order
    pub fn available_profiles(&self) -> Result<Vec<String>> {
        Ok(self
            .read_document()?
            .map(|doc| doc.names_with_prefix("profile:").map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Profile selected for this app scope, falling back to `general`
    pub fn active_profile(&self) -> Result<Option<String>> {
        let Some(doc) = self.read_document()? else {
            return Ok(None);
        };
        Ok(non_empty(doc.get(&self.resolver.app_section(), "profile"))
            .or_else(|| non_empty(doc.get("general", "profile")))
            .map(str::to_string))
    }

    /// Select `name` for this app scope, leaving other sections untouched
    pub fn set_active_profile(&self, name: &str) -> Result<()> {
        let mut doc = self.read_document()?.ok_or(HostError::ConfigMissing)?;
        if doc.section(&format!("profile:{name}")).is_none() {
            return Err(HostError::UnknownProfile(name.to_string()));
        }

        doc.set(&self.resolver.app_section(), "profile", name);
        self.write_document(&doc)?;
        tracing::info!(profile = %name, scope = %self.resolver.scope(), "Active profile changed");
        Ok(())
    }

    /// Record a fresh login against `api_root` as the default profile
    ///
    /// An existing file is first copied to `<path>.bak_<timestamp>`.
    /// Returns the backup path when one was written.
    pub fn write_login(&self, credentials: &LoginCredentials, api_root: &str) -> Result<Option<PathBuf>> {
        let mut doc = self.read_document()?.unwrap_or_default();

        let backup = if self.path.is_file() {
            let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let mut backup = self.path.clone().into_os_string();
            backup.push(format!(".bak_{timestamp}"));
            let backup = PathBuf::from(backup);
            std::fs::copy(&self.path, &backup).map_err(|e| HostError::io(&backup, e))?;
            tracing::info!(backup = %backup.display(), "Backed up existing config");
            Some(backup)
        } else {
            None
        };

        doc.set("general", "profile", &credentials.username);
        doc.set("general", "api_root", api_root);
        // A scope selection would otherwise outrank the new default
        let app_section = self.resolver.app_section();
        if doc.get(&app_section, "profile").is_some() {
            doc.set(&app_section, "profile", &credentials.username);
        }

        let section = doc.section_mut(&format!("profile:{}", credentials.username));
        section.set("username", &credentials.username);
        section.set("token_name", &credentials.token_name);
        section.set("token", &credentials.token);

        self.write_document(&doc)?;
        tracing::info!(username = %credentials.username, path = %self.path.display(), "Saved login");
        Ok(backup)
    }

    fn write_document(&self, doc: &IniDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HostError::io(parent, e))?;
        }
        std::fs::write(&self.path, doc.to_string()).map_err(|e| HostError::io(&self.path, e))
    }
}

fn user_config_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        return dirs::data_local_dir()
            .or_else(dirs::config_dir)
            .ok_or(HostError::NoConfigDir);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg));
    }

    dirs::home_dir()
        .map(|home| home.join(".config"))
        .ok_or(HostError::NoConfigDir)
}
