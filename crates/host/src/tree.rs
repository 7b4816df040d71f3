//! Remote resource trees
//!
//! One [`RemoteTreeMapper`] per [`ResourceKind`] turns the API listings
//! into tree nodes. Nothing is cached: every expansion fetches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use novem_api::{ApiError, NovemApi};
use novem_protocol::{CommandId, EntryKind, Permissions, RemoteEntry, ResourceKind, VisInfo};
use novem_vfs::NOVEM_SCHEME;
use tokio::sync::broadcast;

use crate::error::{HostError, Result};

/// Where listings come from
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn list_for_user(&self, kind: ResourceKind, user: &str) -> std::result::Result<Vec<VisInfo>, ApiError>;

    async fn details(
        &self,
        kind: ResourceKind,
        id: &str,
        path: Option<&str>,
    ) -> std::result::Result<Vec<RemoteEntry>, ApiError>;
}

#[async_trait]
impl ListingSource for NovemApi {
    async fn list_for_user(&self, kind: ResourceKind, user: &str) -> std::result::Result<Vec<VisInfo>, ApiError> {
        Self::list_for_user(self, kind, user).await
    }

    async fn details(
        &self,
        kind: ResourceKind,
        id: &str,
        path: Option<&str>,
    ) -> std::result::Result<Vec<RemoteEntry>, ApiError> {
        Self::details(self, kind, id, path).await
    }
}

/// Icon name for a visualization type
///
/// Mails always get `mail`; every plot type shares the chart icon.
pub fn type_to_icon(_vis_type: &str, selector: Option<ResourceKind>) -> &'static str {
    match selector {
        Some(ResourceKind::Mails) => "mail",
        _ => "graph",
    }
}

/// Permission-driven icon tint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconColor {
    Green,
    Yellow,
    Red,
}

impl IconColor {
    /// `w` green, else `r` yellow, else `d` red; green when empty
    pub const fn for_permissions(perms: Permissions) -> Self {
        if perms.write {
            Self::Green
        } else if perms.read {
            Self::Yellow
        } else if perms.delete {
            Self::Red
        } else {
            Self::Green
        }
    }

    pub const fn theme_color(self) -> &'static str {
        match self {
            Self::Green => "terminal.ansiGreen",
            Self::Yellow => "terminal.ansiYellow",
            Self::Red => "terminal.ansiRed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    pub color: Option<IconColor>,
}

/// Command attached to a file node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAction {
    pub command: CommandId,
    /// Resource path, e.g. `/plots/sales/data`
    pub path: String,
    pub entry_kind: EntryKind,
    pub doctype: &'static str,
}

/// Everything the host needs to render a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub label: String,
    pub description: Option<String>,
    pub tooltip: String,
    pub icon: Option<Icon>,
    pub context_value: Option<&'static str>,
    pub collapsible: bool,
    pub open: Option<OpenAction>,
}

/// A remote resource or one of its nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: EntryKind,
    pub permissions: Permissions,
    pub resource: ResourceKind,
    /// `/<id>[/<sub>...]`, relative to the resource kind
    pub path: String,
    /// Number of `/` in the parent path; resources are depth 0
    pub depth: usize,
    pub icon_type: String,
}

impl TreeNode {
    pub fn new(
        name: impl Into<String>,
        kind: EntryKind,
        permissions: Permissions,
        resource: ResourceKind,
        parent_path: &str,
        icon_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            path: format!("{parent_path}/{name}"),
            depth: parent_path.matches('/').count(),
            name,
            kind,
            permissions,
            resource,
            icon_type: icon_type.into(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Resource id and the remainder below it
    pub fn split_path(&self) -> (&str, Option<&str>) {
        let (_, id, rest) = split_path(&self.path);
        (id, rest.filter(|r| !r.is_empty()))
    }

    /// The resource id this node belongs to
    pub fn resource_id(&self) -> &str {
        self.split_path().0
    }

    /// `/<kind><path>`, the form the API client and VFS expect
    pub fn resource_path(&self) -> String {
        format!("/{}{}", self.resource, self.path)
    }

    /// `novem:/<kind><path>`
    pub fn uri(&self) -> String {
        format!("{NOVEM_SCHEME}:{}", self.resource_path())
    }

    /// Language id used when the node is opened as a document
    pub fn doctype(&self) -> &'static str {
        match (self.resource, self.name.as_str()) {
            (ResourceKind::Jobs, "data") => "json",
            (_, "custom.js") => "javascript",
            (_, "custom.css") => "css",
            (_, "custom.deps") => "plaintext",
            _ => "nv_markdown",
        }
    }

    pub fn decoration(&self) -> Decoration {
        let perms = self.permissions;
        let mask = Some(format!("[{}]", perms.to_unix_style()));
        let file_context = perms.delete.then_some("file-deletable");

        let (description, icon, context_value, open) = match self.kind {
            EntryKind::File => (
                mask,
                None,
                file_context,
                Some(OpenAction {
                    command: CommandId::OpenFile,
                    path: self.resource_path(),
                    entry_kind: self.kind,
                    doctype: self.doctype(),
                }),
            ),
            EntryKind::Link => (
                mask,
                Some(Icon {
                    name: "link",
                    color: None,
                }),
                file_context,
                None,
            ),
            EntryKind::Dir if self.depth == 0 => (
                None,
                Some(Icon {
                    name: self.top_icon(),
                    color: Some(IconColor::for_permissions(perms)),
                }),
                Some(self.resource.top_context()),
                None,
            ),
            EntryKind::Dir => {
                let context = match (perms.write, perms.delete) {
                    (true, true) => Some("dir-writable-deletable"),
                    (true, false) => Some("dir-writable"),
                    (false, true) => Some("dir-deletable"),
                    (false, false) => None,
                };
                (None, None, context, None)
            }
            EntryKind::Other => (None, None, None, None),
        };

        Decoration {
            label: self.name.clone(),
            description,
            tooltip: format!(
                "{} ({}) - Permissions: {}",
                self.name,
                self.kind.as_str(),
                perms.flags().join(", ")
            ),
            icon,
            context_value,
            collapsible: self.is_dir(),
            open,
        }
    }

    fn top_icon(&self) -> &'static str {
        match self.resource {
            ResourceKind::Plots => type_to_icon(&self.icon_type, None),
            ResourceKind::Mails => "mail",
            ResourceKind::Jobs => "run",
            ResourceKind::Repos => "repo",
        }
    }
}

/// Split a node path at most twice on `/`
///
/// `"/sales/config/type"` gives `("", "sales", Some("config/type"))`.
pub fn split_path(path: &str) -> (&str, &str, Option<&str>) {
    let mut parts = path.splitn(3, '/');
    let marker = parts.next().unwrap_or_default();
    let id = parts.next().unwrap_or_default();
    (marker, id, parts.next())
}

/// One row in a tree view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem {
    Node(TreeNode),
    /// Non-interactive message row
    Placeholder(String),
}

impl TreeItem {
    pub fn label(&self) -> &str {
        match self {
            Self::Node(node) => &node.name,
            Self::Placeholder(text) => text,
        }
    }

    pub const fn as_node(&self) -> Option<&TreeNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Refreshed { kind: ResourceKind, generation: u64 },
}

/// Host seam for a tree view
#[async_trait]
pub trait TreeDataProvider: Send + Sync {
    /// Children of `parent`, or the roots when `None`
    async fn children(&self, parent: Option<&TreeNode>) -> Vec<TreeItem>;

    fn refresh(&self);
}

/// Builds the tree for one resource kind
pub struct RemoteTreeMapper {
    kind: ResourceKind,
    owner: String,
    source: Arc<dyn ListingSource>,
    generation: AtomicU64,
    events: broadcast::Sender<TreeEvent>,
}

impl RemoteTreeMapper {
    pub fn new(kind: ResourceKind, owner: impl Into<String>, source: Arc<dyn ListingSource>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            kind,
            owner: owner.into(),
            source,
            generation: AtomicU64::new(0),
            events,
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.events.subscribe()
    }

    /// The owner's resources, sorted by identifier
    pub async fn root_items(&self) -> Result<Vec<TreeNode>> {
        tracing::debug!(kind = %self.kind, owner = %self.owner, "Fetching root items");
        let mut listing = self.source.list_for_user(self.kind, &self.owner).await?;
        listing.sort_by(|a, b| a.identifier().cmp(b.identifier()));

        Ok(listing
            .iter()
            .map(|vis| {
                TreeNode::new(
                    vis.identifier(),
                    EntryKind::Dir,
                    vis.permissions.unwrap_or(Permissions::ALL),
                    self.kind,
                    "",
                    vis.vis_type
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .unwrap_or(self.kind.default_icon_type()),
                )
            })
            .collect())
    }

    /// Entries below a directory node, dirs first then by name
    pub async fn child_items(&self, parent: &TreeNode) -> Result<Vec<TreeNode>> {
        if !parent.is_dir() {
            return Err(HostError::NotExpandable(parent.path.clone()));
        }
        let (id, rest) = parent.split_path();
        tracing::debug!(kind = %self.kind, id, path = rest.unwrap_or_default(), "Fetching child items");

        let mut entries: Vec<RemoteEntry> = self
            .source
            .details(self.kind, id, rest)
            .await?
            .into_iter()
            .filter(|e| e.kind.is_listed())
            .collect();
        entries.sort_by(|a, b| {
            let a_dir = a.kind == EntryKind::Dir;
            let b_dir = b.kind == EntryKind::Dir;
            b_dir.cmp(&a_dir).then_with(|| a.name.cmp(&b.name))
        });

        Ok(entries
            .into_iter()
            .map(|e| TreeNode::new(e.name, e.kind, e.permissions, self.kind, &parent.path, ""))
            .collect())
    }

    fn error_placeholder(&self) -> TreeItem {
        TreeItem::Placeholder(format!("Error loading {}", self.kind))
    }
}

#[async_trait]
impl TreeDataProvider for RemoteTreeMapper {
    async fn children(&self, parent: Option<&TreeNode>) -> Vec<TreeItem> {
        let result = match parent {
            None => self.root_items().await,
            Some(node) => self.child_items(node).await,
        };

        match result {
            Ok(nodes) => nodes.into_iter().map(TreeItem::Node).collect(),
            Err(e) => {
                tracing::error!(kind = %self.kind, error = %e, "Error loading tree items");
                vec![self.error_placeholder()]
            }
        }
    }

    fn refresh(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(kind = %self.kind, generation, "Refreshing tree");
        let _ = self.events.send(TreeEvent::Refreshed {
            kind: self.kind,
            generation,
        });
    }
}

/// Tree shown while signed out
#[derive(Debug, Default, Clone, Copy)]
pub struct SignedOutTree;

pub const SIGNED_OUT_MESSAGE: &str = "Please log in";

#[async_trait]
impl TreeDataProvider for SignedOutTree {
    async fn children(&self, _parent: Option<&TreeNode>) -> Vec<TreeItem> {
        vec![TreeItem::Placeholder(SIGNED_OUT_MESSAGE.to_string())]
    }

    fn refresh(&self) {}
}
