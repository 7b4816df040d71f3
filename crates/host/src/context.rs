//! Application context
//!
//! Owns everything that lives between activation and deactivation: the
//! resolved config, the API client, one tree per resource kind and the
//! `novem:` filesystem. A profile switch or login rebuilds it through
//! [`AppContext::reload`].

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use novem_api::NovemApi;
use novem_protocol::{CommandId, ResourceKind, UserProfile};
use novem_vfs::{NovemFsBackend, VfsManager, NOVEM_SCHEME};

use crate::commands::{Commands, Outcome, Prompter};
use crate::config::{ConfigOverrides, ConfigStore, EffectiveConfig};
use crate::error::{HostError, Result};
use crate::tree::{RemoteTreeMapper, SignedOutTree, TreeDataProvider, TreeItem, TreeNode};
use crate::viewer::{ViewerEvent, ViewerHost};

/// A signed-in session
pub struct Session {
    api: Arc<NovemApi>,
    config: EffectiveConfig,
    profile: UserProfile,
    username: String,
    trees: BTreeMap<ResourceKind, Arc<RemoteTreeMapper>>,
    vfs: Arc<VfsManager>,
}

impl Session {
    /// Build the client for `config` and verify the token
    pub async fn connect(config: EffectiveConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| HostError::MissingToken(config.profile.clone().unwrap_or_default()))?;
        let api = NovemApi::from_config(config.api_root_or_default(), token, config.ignore_ssl_warn)?;

        let profile = api.get_profile().await.map_err(|e| {
            if e.is_auth_failure() {
                HostError::AuthFailure(e)
            } else {
                HostError::Api(e)
            }
        })?;

        Self::new(Arc::new(api), config, profile).await
    }

    /// Assemble a session from an already verified profile
    pub async fn new(api: Arc<NovemApi>, config: EffectiveConfig, profile: UserProfile) -> Result<Self> {
        let username = profile
            .user_info
            .username
            .clone()
            .or_else(|| config.username.clone())
            .filter(|u| !u.is_empty())
            .ok_or(HostError::NotSignedIn)?;

        let trees = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let source = api.clone();
                (kind, Arc::new(RemoteTreeMapper::new(kind, username.clone(), source)))
            })
            .collect();

        let vfs = Arc::new(VfsManager::new());
        vfs.register_backend(NOVEM_SCHEME, Box::new(NovemFsBackend::new(api.clone())))
            .await;

        tracing::info!(%username, api_root = %api.api_root(), "Session established");
        Ok(Self {
            api,
            config,
            profile,
            username,
            trees,
            vfs,
        })
    }

    pub fn api(&self) -> &NovemApi {
        &self.api
    }

    pub const fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn tree(&self, kind: ResourceKind) -> Arc<RemoteTreeMapper> {
        // Every kind is inserted in `new`
        self.trees
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::new(RemoteTreeMapper::new(kind, self.username.clone(), self.api.clone())))
    }

    pub fn vfs(&self) -> &Arc<VfsManager> {
        &self.vfs
    }
}

/// Activation settings
#[derive(Debug, Clone)]
pub struct ActivateOptions {
    pub store: ConfigStore,
    pub overrides: ConfigOverrides,
    /// Install the `tracing` subscriber on activation
    pub init_logging: bool,
}

impl ActivateOptions {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            overrides: ConfigOverrides::default(),
            init_logging: false,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }
}

/// How activation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    SignedIn { username: String },
    /// Trees show the sign-in placeholder until a login completes
    NeedsLogin { reason: String },
}

/// Everything between activate and deactivate
pub struct AppContext {
    options: ActivateOptions,
    prompter: Arc<dyn Prompter>,
    viewer: Arc<dyn ViewerHost>,
    session: Option<Session>,
}

impl AppContext {
    pub fn new(options: ActivateOptions, prompter: Arc<dyn Prompter>, viewer: Arc<dyn ViewerHost>) -> Self {
        Self {
            options,
            prompter,
            viewer,
            session: None,
        }
    }

    /// Load config and sign in
    ///
    /// Missing config and rejected tokens end in
    /// [`Activation::NeedsLogin`]; other failures are returned.
    pub async fn activate(&mut self) -> Result<Activation> {
        if self.options.init_logging {
            crate::logging::init();
        }

        let connected = match self.options.store.load(&self.options.overrides) {
            Ok(config) => Session::connect(config).await,
            Err(e) => Err(e),
        };

        match connected {
            Ok(session) => {
                let username = session.username().to_string();
                self.session = Some(session);
                Ok(Activation::SignedIn { username })
            }
            Err(e) if e.requires_login() => {
                tracing::warn!(error = %e, "Activation needs login");
                self.session = None;
                Ok(Activation::NeedsLogin {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the session, its trees and open documents
    pub async fn deactivate(&mut self) {
        if let Some(session) = self.session.take() {
            session.vfs.clear_documents().await;
            session.vfs.remove_backend(NOVEM_SCHEME).await;
            tracing::info!(username = %session.username, "Deactivated");
        }
    }

    pub async fn reload(&mut self) -> Result<Activation> {
        self.deactivate().await;
        self.activate().await
    }

    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub const fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub const fn store(&self) -> &ConfigStore {
        &self.options.store
    }

    /// Tree provider for a kind; the sign-in placeholder when signed out
    pub fn tree(&self, kind: ResourceKind) -> Arc<dyn TreeDataProvider> {
        match &self.session {
            Some(session) => session.tree(kind),
            None => Arc::new(SignedOutTree),
        }
    }

    /// Root rows of every tree, fetched concurrently
    pub async fn roots(&self) -> Vec<(ResourceKind, Vec<TreeItem>)> {
        let trees: Vec<_> = ResourceKind::ALL.into_iter().map(|k| (k, self.tree(k))).collect();
        let fetches = trees.iter().map(|(_, tree)| tree.children(None));
        let results = join_all(fetches).await;
        trees.into_iter().map(|(k, _)| k).zip(results).collect()
    }

    pub fn commands(&self) -> Commands<'_> {
        Commands::new(
            self.session.as_ref(),
            &self.options.store,
            &self.options.overrides,
            self.prompter.as_ref(),
            self.viewer.as_ref(),
        )
    }

    /// Run a command, rebuilding the context when it changed the config
    pub async fn execute(&mut self, id: &CommandId, node: Option<&TreeNode>) -> Outcome {
        let outcome = self.commands().execute(id, node).await;
        self.reload_if_needed(&outcome).await;
        outcome
    }

    /// React to a viewer event; a sign-in is saved and the context reloaded
    pub async fn handle_viewer_event(&mut self, event: ViewerEvent) -> Outcome {
        let ViewerEvent::SignedIn(credentials) = event else {
            return Outcome::Cancelled;
        };

        let outcome = match self.commands().complete_login(&credentials) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Saving login failed");
                let message = format!("Failed to save login: {e}");
                self.prompter.error(&message);
                Outcome::Failed(message)
            }
        };
        self.reload_if_needed(&outcome).await;
        outcome
    }

    async fn reload_if_needed(&mut self, outcome: &Outcome) {
        if !outcome.requires_reload() {
            return;
        }
        match self.reload().await {
            Ok(activation) => tracing::info!(?activation, "Reloaded"),
            Err(e) => {
                tracing::error!(error = %e, "Reload failed");
                self.prompter.error(&format!("Failed to reload Novem: {e}"));
            }
        }
    }
}
