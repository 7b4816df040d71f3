// novem-host library
// Editor-side host for Novem workspaces

// Configuration profiles (novem.conf)
pub mod config;

// Remote resource trees
pub mod tree;

// Command handlers and user prompts
pub mod commands;

// Embedded viewer panels
pub mod viewer;

// Activation lifecycle
pub mod context;

// Git utilities
pub mod git;

pub mod error;
pub mod logging;

pub use commands::{Commands, InputRequest, InputRule, Outcome, PickItem, Prompter};
pub use config::{
    ConfigOverrides, ConfigResolver, ConfigStore, EffectiveConfig, LoginCredentials,
};
pub use context::{ActivateOptions, Activation, AppContext, Session};
pub use error::{HostError, Result};
pub use tree::{RemoteTreeMapper, SignedOutTree, TreeDataProvider, TreeItem, TreeNode};
pub use viewer::{Theme, ViewerEvent, ViewerHost, ViewerPanel};
