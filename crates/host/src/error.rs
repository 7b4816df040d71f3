use std::path::PathBuf;

use novem_api::ApiError;

/// Host-level failures
///
/// `ConfigMissing` and `AuthFailure` send the user to the login flow;
/// everything else is reported where it happens and never takes the
/// host down.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no Novem configuration found")]
    ConfigMissing,

    #[error("authentication rejected: {0}")]
    AuthFailure(#[source] ApiError),

    #[error("not logged in")]
    NotSignedIn,

    #[error("profile '{0}' does not exist")]
    UnknownProfile(String),

    #[error("profile '{0}' has no token")]
    MissingToken(String),

    #[error("unable to find a suitable configuration directory")]
    NoConfigDir,

    #[error("only directories can be expanded: {0}")]
    NotExpandable(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Vfs(#[from] anyhow::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Command(String),
}

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this failure should route the user to the login flow
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing | Self::AuthFailure(_) | Self::NotSignedIn | Self::MissingToken(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
