//! Novem configuration
//!
//! Reads the shared INI file at `<config dir>/novem/novem.conf`, the same
//! file the novem CLI and the editor extension use. Sections:
//!
//! ```ini
//! [general]
//! profile = alice
//! api_root = https://api.novem.io/v1/
//!
//! [app:vscode]
//! profile = work
//!
//! [profile:alice]
//! username = alice
//! token_name = laptop
//! token = nbt-...
//! ```

mod ini;
mod store;

pub use ini::{IniDocument, Section};
pub use store::ConfigStore;

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// API root written for fresh logins
pub const DEFAULT_API_ROOT: &str = "https://api.novem.io/v1/";

/// Application scope used for `app:<scope>` profile selection
pub const DEFAULT_APP_SCOPE: &str = "vscode";

/// Resolved settings for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub api_root: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub profile: Option<String>,
    pub ignore_ssl_warn: bool,
}

impl EffectiveConfig {
    /// API root, falling back to the public endpoint
    pub fn api_root_or_default(&self) -> &str {
        self.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT)
    }
}

/// Call-time overrides, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_root: Option<String>,
    pub profile: Option<String>,
    pub token: Option<String>,
    /// Skip the file entirely; only `api_root` survives
    pub ignore_config: bool,
}

/// Credentials handed back by a successful viewer sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub token: String,
    pub token_name: String,
}

/// Resolves an [`EffectiveConfig`] for one app scope
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    scope: String,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(DEFAULT_APP_SCOPE)
    }
}

impl ConfigResolver {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Name of the `app:<scope>` section
    pub fn app_section(&self) -> String {
        format!("app:{}", self.scope)
    }

    /// Resolve configuration text; `None` means the file does not exist
    pub fn resolve(&self, text: Option<&str>, overrides: &ConfigOverrides) -> Result<EffectiveConfig> {
        let text = text.ok_or(HostError::ConfigMissing)?;
        Ok(self.parse_config(text, overrides))
    }

    /// Pure resolution of configuration text
    ///
    /// Precedence, lowest first: `general`, `app:<scope>` (profile choice
    /// only), `profile:<name>`, then the overrides. When the selected
    /// profile has no section, only the api root collected so far is
    /// returned.
    pub fn parse_config(&self, text: &str, overrides: &ConfigOverrides) -> EffectiveConfig {
        let doc = IniDocument::parse(text);
        let mut config = EffectiveConfig::default();

        config.api_root = non_empty(overrides.api_root.as_deref())
            .or_else(|| non_empty(doc.get("general", "api_root")))
            .map(str::to_string);

        let profile = non_empty(overrides.profile.as_deref())
            .or_else(|| non_empty(doc.get(&self.app_section(), "profile")))
            .or_else(|| non_empty(doc.get("general", "profile")))
            .map(str::to_string);

        let Some(section) = profile
            .as_deref()
            .and_then(|name| doc.section(&format!("profile:{name}")))
        else {
            tracing::debug!(profile = ?profile, "Selected profile has no section");
            return config;
        };

        if let Some(api_root) = non_empty(section.get("api_root")) {
            config.api_root = Some(api_root.to_string());
        }
        config.token = non_empty(section.get("token")).map(str::to_string);
        config.username = non_empty(section.get("username")).map(str::to_string);
        config.ignore_ssl_warn = section.get("ignore_ssl_warn") == Some("true");

        if let Some(api_root) = non_empty(overrides.api_root.as_deref()) {
            config.api_root = Some(api_root.to_string());
        }
        if let Some(token) = non_empty(overrides.token.as_deref()) {
            config.token = Some(token.to_string());
        }
        config.profile = profile;

        config
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
