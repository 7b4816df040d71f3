//! Command handlers
//!
//! Every `novem.*` command goes through [`Commands::execute`]. Handlers
//! talk to the user through a [`Prompter`]; failures are shown as error
//! notices and never propagate to the host.

use std::path::PathBuf;

use async_trait::async_trait;
use novem_api::ApiError;
use novem_protocol::{CommandId, EntryKind, ResourceKind, VisInfo};
use novem_vfs::{OpenDocument, NOVEM_SCHEME};
use regex::Regex;

use crate::config::{ConfigOverrides, ConfigStore, LoginCredentials, DEFAULT_API_ROOT};
use crate::context::Session;
use crate::error::{HostError, Result};
use crate::git;
use crate::tree::{type_to_icon, TreeDataProvider, TreeNode};
use crate::viewer::{navigate_to, navigate_to_login, route_for, ViewerHost, ViewerPanel};

/// Exact text the user must type to delete a resource
pub const DELETE_CONFIRMATION: &str = "DELETE";

/// Validation attached to an input box
#[derive(Debug, Clone)]
pub struct InputRule {
    pattern: Regex,
    message: &'static str,
}

impl InputRule {
    pub fn new(pattern: &str, message: &'static str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| HostError::Command(format!("Invalid input pattern {pattern}: {e}")))?;
        Ok(Self { pattern, message })
    }

    /// `None` when valid, otherwise the message to show
    pub fn validate(&self, value: &str) -> Option<&'static str> {
        (!self.pattern.is_match(value)).then_some(self.message)
    }

    fn resource_id(kind: ResourceKind) -> Result<Self> {
        match kind {
            ResourceKind::Plots | ResourceKind::Mails => Self::new(
                r"^[a-z0-9_]+$",
                "Only lowercase ASCII characters and underscores are allowed!",
            ),
            ResourceKind::Jobs | ResourceKind::Repos => Self::new(
                r"^[a-z0-9_-]+$",
                "Only lowercase ASCII characters, underscores, and hyphens are allowed!",
            ),
        }
    }

    /// Node names allowed inside a given directory
    pub fn node_name(directory: &str) -> Result<Self> {
        match directory {
            "shared" => Self::new(
                r"^[a-z0-9@+~_-]+$",
                "Only lowercase ASCII characters, numbers, @, +, ~, _, and - are allowed in shared folder!",
            ),
            "tags" => Self::new(
                r"^\+?[a-z0-9_-]+$",
                "Tags may start with + and can contain lowercase ASCII characters, numbers, _, and -!",
            ),
            _ => Self::new(
                r"^[a-z0-9_.-]+$",
                "Only lowercase ASCII characters, numbers, underscores, dots, and hyphens are allowed!",
            ),
        }
    }

    pub fn username() -> Result<Self> {
        Self::new(
            r"^@[a-z0-9_]+$",
            "Username must start with @ and only lowercase alphanumeric characters and underscores are allowed!",
        )
    }
}

/// An input box request
#[derive(Debug, Clone)]
pub struct InputRequest {
    pub prompt: String,
    pub placeholder: String,
    pub rule: Option<InputRule>,
}

impl InputRequest {
    pub fn new(prompt: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            placeholder: placeholder.into(),
            rule: None,
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: InputRule) -> Self {
        self.rule = Some(rule);
        self
    }
}

/// One quick-pick row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
    pub detail: String,
}

/// User interaction seam
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask for text; `None` when dismissed
    async fn input(&self, request: &InputRequest) -> Option<String>;

    /// Index of the chosen item; `None` when dismissed
    async fn pick(&self, placeholder: &str, items: &[PickItem]) -> Option<usize>;

    /// Modal confirmation with a single affirmative `action`
    async fn confirm(&self, message: &str, action: &str) -> bool;

    async fn pick_folder(&self, title: &str) -> Option<PathBuf>;

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Result of running a command
#[derive(Debug)]
pub enum Outcome {
    /// The user dismissed a prompt
    Cancelled,
    /// A typed confirmation did not match
    Aborted,
    Created { kind: ResourceKind, id: String },
    Deleted { kind: ResourceKind, id: String },
    Refreshed(ResourceKind),
    Viewer(ViewerPanel),
    Opened { document: OpenDocument, content: String },
    NodeCreated(String),
    NodeDeleted(String),
    Cloned(PathBuf),
    ConfigPath(PathBuf),
    LoggedIn { backup: Option<PathBuf> },
    /// Configuration changed; the context must be rebuilt
    Reload,
    Failed(String),
}

impl Outcome {
    pub const fn requires_reload(&self) -> bool {
        matches!(self, Self::Reload | Self::LoggedIn { .. })
    }
}

/// Command factory over the current session
pub struct Commands<'a> {
    session: Option<&'a Session>,
    store: &'a ConfigStore,
    overrides: &'a ConfigOverrides,
    prompter: &'a dyn Prompter,
    viewer: &'a dyn ViewerHost,
}

impl<'a> Commands<'a> {
    pub fn new(
        session: Option<&'a Session>,
        store: &'a ConfigStore,
        overrides: &'a ConfigOverrides,
        prompter: &'a dyn Prompter,
        viewer: &'a dyn ViewerHost,
    ) -> Self {
        Self {
            session,
            store,
            overrides,
            prompter,
            viewer,
        }
    }

    /// Run a command; errors become error notices
    pub async fn execute(&self, id: &CommandId, node: Option<&TreeNode>) -> Outcome {
        tracing::debug!(command = %id, node = node.map(|n| n.path.as_str()), "Executing command");

        let result = match id {
            CommandId::Login | CommandId::LoginNewProfile => self.login(),
            CommandId::Logout => self.logout().await,
            CommandId::SelectProfile => self.select_profile().await,
            CommandId::EditConfig => Ok(self.config_path()),
            CommandId::ReloadWindow => {
                self.prompter.info("Reloading Novem extension...");
                Ok(Outcome::Reload)
            }
            CommandId::OpenFile => match node {
                Some(node) => self.open_file(&node.resource_path(), node.doctype()).await,
                None => Err(HostError::Command("No file selected".to_string())),
            },
            CommandId::Create(kind) => self.create(*kind).await,
            CommandId::Delete(kind) => self.delete(*kind, node).await,
            CommandId::Refresh(kind) => self.refresh(*kind),
            CommandId::View(kind) => self.view(*kind, node).await,
            CommandId::ViewForUser(kind) => self.view_for_user(*kind).await,
            CommandId::CloneRepo => self.clone_repo(node).await,
            CommandId::CreateNodeInDirectory => self.create_node(node).await,
            CommandId::DeleteNode => self.delete_node(node).await,
            CommandId::Unknown(name) => Err(HostError::Command(format!("Unknown command {name}"))),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(command = %id, error = %e, "Command failed");
                let message = if e.requires_login() {
                    "Please log in to Novem first".to_string()
                } else {
                    e.to_string()
                };
                self.prompter.error(&message);
                Outcome::Failed(message)
            }
        }
    }

    fn session(&self) -> Result<&'a Session> {
        self.session.ok_or(HostError::NotSignedIn)
    }

    /// Ask for input, discarding values that fail the rule
    async fn ask(&self, request: &InputRequest) -> Option<String> {
        let value = self.prompter.input(request).await?;
        if let Some(message) = request.rule.as_ref().and_then(|r| r.validate(&value)) {
            tracing::debug!(%value, message, "Rejected input");
            return None;
        }
        Some(value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create(&self, kind: ResourceKind) -> Result<Outcome> {
        let session = self.session()?;
        let singular = kind.singular();

        let request = InputRequest::new(
            format!("Please provide the {singular} id to create:"),
            format!("test_{singular}_1"),
        )
        .with_rule(InputRule::resource_id(kind)?);
        let Some(id) = self.ask(&request).await else {
            return Ok(Outcome::Cancelled);
        };

        let plot_type = if kind == ResourceKind::Plots {
            let request = InputRequest::new("Please specify the type of plot to create:", "bar")
                .with_rule(InputRule::new(r"^[a-z]+$", "Only lowercase ASCII characters are allowed!")?);
            Some(self.ask(&request).await.unwrap_or_else(|| "bar".to_string()))
        } else {
            None
        };

        session
            .api()
            .create(kind, &id)
            .await
            .map_err(failed(format!("Failed to create new {singular} {id}")))?;

        if let Some(plot_type) = plot_type {
            session
                .api()
                .modify(kind, &id, "/config/type", &plot_type)
                .await
                .map_err(failed(format!("Failed to set the type of {singular} {id}")))?;
        }

        session.tree(kind).refresh();
        self.prompter.info(&format!("New {singular} {id} created"));
        Ok(Outcome::Created { kind, id })
    }

    pub async fn delete(&self, kind: ResourceKind, node: Option<&TreeNode>) -> Result<Outcome> {
        let session = self.session()?;
        let node = node.ok_or_else(|| HostError::Command("No item selected".to_string()))?;

        let request = InputRequest::new(
            format!("Please confirm that you want to delete \"{}\" by typing DELETE", node.name),
            "type DELETE here",
        )
        .with_rule(InputRule::new(
            r"^[DELETE]+$",
            "Only uppercase DELETE allowed, hit escape to ABORT",
        )?);

        let Some(confirm) = self.prompter.input(&request).await else {
            return Ok(Outcome::Cancelled);
        };
        if confirm != DELETE_CONFIRMATION {
            let noun = match kind {
                ResourceKind::Plots | ResourceKind::Mails => "visualisation",
                ResourceKind::Jobs | ResourceKind::Repos => kind.singular(),
            };
            self.prompter.info(&format!("Action aborted, {noun} not deleted"));
            return Ok(Outcome::Aborted);
        }

        let id = node.resource_id().to_string();
        session
            .api()
            .delete(kind, &id)
            .await
            .map_err(failed(format!("Failed to delete \"{id}\"")))?;

        self.prompter.warn(&format!("Deleted \"{id}\""));
        session.tree(kind).refresh();
        Ok(Outcome::Deleted { kind, id })
    }

    pub fn refresh(&self, kind: ResourceKind) -> Result<Outcome> {
        self.session()?.tree(kind).refresh();
        Ok(Outcome::Refreshed(kind))
    }

    /// Open one of the signed-in user's plots or mails in a viewer panel
    ///
    /// With a node the matching resource opens directly; otherwise the user
    /// picks from the listing.
    pub async fn view(&self, kind: ResourceKind, node: Option<&TreeNode>) -> Result<Outcome> {
        let session = self.session()?;
        let listing = session.api().list_for_user(kind, session.username()).await?;
        let items = pick_items(kind, &listing);

        let selected = match node {
            Some(node) => items.iter().position(|i| i.description == node.resource_id()),
            None => self.prompter.pick("Select an option...", &items).await,
        };

        match selected {
            Some(index) => self.open_viewer(kind, &listing[index]),
            None => Ok(Outcome::Cancelled),
        }
    }

    /// Browse another user's public plots or mails
    pub async fn view_for_user(&self, kind: ResourceKind) -> Result<Outcome> {
        let session = self.session()?;
        let request = InputRequest::new("Please provide the @username to view:", "@novem_demo")
            .with_rule(InputRule::username()?);
        let Some(handle) = self.ask(&request).await else {
            return Ok(Outcome::Cancelled);
        };
        let user = handle.trim_start_matches('@');

        let listing = session
            .api()
            .list_for_user(kind, user)
            .await
            .map_err(failed(format!("Failed to list {kind} for @{user}")))?;
        let items = pick_items(kind, &listing);

        match self.prompter.pick("Select an option...", &items).await {
            Some(index) => self.open_viewer(kind, &listing[index]),
            None => Ok(Outcome::Cancelled),
        }
    }

    fn open_viewer(&self, kind: ResourceKind, vis: &VisInfo) -> Result<Outcome> {
        let session = self.session()?;
        let route = route_for(kind)
            .ok_or_else(|| HostError::Command(format!("{kind} cannot be viewed")))?;

        let title = vis.identifier().to_string();
        let navigate = navigate_to(route, vis, session.config());
        let outbox = self.viewer.open_panel(&title);
        tracing::info!(%kind, vis = %title, "Opening viewer");
        Ok(Outcome::Viewer(ViewerPanel::new(title, navigate, self.viewer.theme(), outbox)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Nodes
    // ─────────────────────────────────────────────────────────────────────────

    /// Read a remote file and track it as an open document
    pub async fn open_file(&self, path: &str, doctype: &str) -> Result<Outcome> {
        let session = self.session()?;
        let uri = format!("{NOVEM_SCHEME}:{path}");

        let content = session.vfs().read_file(&uri).await?;
        let document = session.vfs().register_document(&uri, doctype).await?;
        Ok(Outcome::Opened {
            document,
            content: String::from_utf8_lossy(&content).into_owned(),
        })
    }

    pub async fn create_node(&self, node: Option<&TreeNode>) -> Result<Outcome> {
        let session = self.session()?;
        let dir = node
            .filter(|n| n.kind == EntryKind::Dir)
            .ok_or_else(|| HostError::Command("This command can only be used on directories".to_string()))?;
        if !dir.permissions.write {
            return Err(HostError::Command(
                "This directory does not have write permissions".to_string(),
            ));
        }

        let placeholder = if dir.name == "tags" { "+tag_name" } else { "node_name" };
        let request = InputRequest::new(
            format!("Enter the name of the node to create in {}:", dir.name),
            placeholder,
        )
        .with_rule(InputRule::node_name(&dir.name)?);
        let Some(name) = self.ask(&request).await else {
            return Ok(Outcome::Cancelled);
        };

        let path = format!("{}/{name}", dir.resource_path());
        session
            .api()
            .create_node(&path)
            .await
            .map_err(failed(format!("Failed to create node \"{name}\"")))?;

        self.prompter
            .info(&format!("Created node \"{name}\" in {}", dir.name));
        session.tree(dir.resource).refresh();
        Ok(Outcome::NodeCreated(path))
    }

    pub async fn delete_node(&self, node: Option<&TreeNode>) -> Result<Outcome> {
        let session = self.session()?;
        let node = node.ok_or_else(|| HostError::Command("No item selected".to_string()))?;
        if !node.permissions.delete {
            return Err(HostError::Command(
                "This item does not have delete permissions".to_string(),
            ));
        }

        let item_type = if node.is_dir() { "directory" } else { "file" };
        let confirmed = self
            .prompter
            .confirm(
                &format!("Are you sure you want to delete {item_type} \"{}\"?", node.name),
                "Delete",
            )
            .await;
        if !confirmed {
            return Ok(Outcome::Cancelled);
        }

        let path = node.resource_path();
        session
            .api()
            .delete_node(&path)
            .await
            .map_err(failed(format!("Failed to delete {item_type} \"{}\"", node.name)))?;

        self.prompter
            .info(&format!("Deleted {item_type} \"{}\"", node.name));
        session.tree(node.resource).refresh();
        Ok(Outcome::NodeDeleted(path))
    }

    /// Clone a repo's git remote into a folder the user picks
    pub async fn clone_repo(&self, node: Option<&TreeNode>) -> Result<Outcome> {
        let session = self.session()?;
        let repo = node
            .filter(|n| n.resource == ResourceKind::Repos)
            .ok_or_else(|| HostError::Command("This command can only be used on repos".to_string()))?;
        let id = repo.resource_id();

        let url = session
            .api()
            .read_file(&format!("/repos/{id}/url"))
            .await
            .map_err(failed(format!("Failed to fetch clone URL for repo \"{id}\"")))?;
        let url = url.trim();
        if url.is_empty() {
            return Err(HostError::Command(format!(
                "Failed to fetch clone URL for repo \"{id}\""
            )));
        }

        let Some(parent) = self.prompter.pick_folder(&format!("Clone {id}")).await else {
            return Ok(Outcome::Cancelled);
        };

        let path = git::clone(url, &parent).await?;
        self.prompter
            .info(&format!("Cloned {id} into {}", parent.display()));
        Ok(Outcome::Cloned(path))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────────

    /// API root a new login is made against
    fn login_api_root(&self) -> String {
        match self.session {
            Some(session) => session.config().api_root_or_default().to_string(),
            None => self
                .store
                .load(self.overrides)
                .ok()
                .and_then(|c| c.api_root)
                .unwrap_or_else(|| DEFAULT_API_ROOT.to_string()),
        }
    }

    /// Open the viewer on its sign-in page
    pub fn login(&self) -> Result<Outcome> {
        let api_root = self.login_api_root();
        let outbox = self.viewer.open_panel("login");
        Ok(Outcome::Viewer(ViewerPanel::new(
            "login",
            navigate_to_login(&api_root, None),
            self.viewer.theme(),
            outbox,
        )))
    }

    /// Persist credentials from a successful viewer sign-in
    pub fn complete_login(&self, credentials: &LoginCredentials) -> Result<Outcome> {
        let backup = self.store.write_login(credentials, &self.login_api_root())?;
        self.prompter
            .info(&format!("Logged in as {}", credentials.username));
        Ok(Outcome::LoggedIn { backup })
    }

    pub async fn logout(&self) -> Result<Outcome> {
        let session = self.session()?;
        session.api().logout().await?;
        tracing::info!(username = %session.username(), "Logged out");
        Ok(Outcome::Reload)
    }

    pub async fn select_profile(&self) -> Result<Outcome> {
        let profiles = self.store.available_profiles()?;
        if profiles.is_empty() {
            self.prompter.warn("No profiles found in config file");
            return Ok(Outcome::Cancelled);
        }

        let items: Vec<PickItem> = profiles
            .iter()
            .map(|p| PickItem {
                label: p.clone(),
                description: String::new(),
                detail: String::new(),
            })
            .collect();
        let Some(index) = self
            .prompter
            .pick("Select a profile to switch to", &items)
            .await
        else {
            return Ok(Outcome::Cancelled);
        };

        let profile = &profiles[index];
        self.store
            .set_active_profile(profile)
            .map_err(|e| HostError::Command(format!("Failed to switch profile: {e}")))?;
        self.prompter
            .info(&format!("Switched to profile: {profile}. Reloading window..."));
        Ok(Outcome::Reload)
    }

    pub fn config_path(&self) -> Outcome {
        Outcome::ConfigPath(self.store.path().to_path_buf())
    }
}

fn pick_items(kind: ResourceKind, listing: &[VisInfo]) -> Vec<PickItem> {
    listing
        .iter()
        .map(|vis| PickItem {
            label: format!(
                "$({}) {}",
                type_to_icon(vis.vis_type.as_deref().unwrap_or_default(), Some(kind)),
                vis.name.as_deref().unwrap_or_else(|| vis.identifier())
            ),
            description: vis.identifier().to_string(),
            detail: vis.summary.clone().unwrap_or_default(),
        })
        .collect()
}

/// Log an API failure and turn it into a user-facing message
fn failed(message: String) -> impl FnOnce(ApiError) -> HostError {
    move |e| {
        tracing::warn!(error = %e, "{message}");
        if e.is_auth_failure() {
            return HostError::AuthFailure(e);
        }
        HostError::Command(format!("{message}: {e}"))
    }
}
