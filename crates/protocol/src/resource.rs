//! Remote resource taxonomy and REST payload shapes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level resource families exposed by the Novem API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Plots,
    Mails,
    Jobs,
    Repos,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [Self::Plots, Self::Mails, Self::Jobs, Self::Repos];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plots => "plots",
            Self::Mails => "mails",
            Self::Jobs => "jobs",
            Self::Repos => "repos",
        }
    }

    /// Singular noun used in user-facing messages ("plot", "mail", ...)
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Plots => "plot",
            Self::Mails => "mail",
            Self::Jobs => "job",
            Self::Repos => "repo",
        }
    }

    /// Path segment of the per-user listing endpoint (`u/<user>/<segment>`)
    pub const fn user_listing_segment(self) -> &'static str {
        match self {
            Self::Plots => "p",
            Self::Mails => "m",
            Self::Jobs => "j",
            Self::Repos => "r",
        }
    }

    /// API prefix under which individual resources of this kind live
    pub const fn api_prefix(self) -> &'static str {
        match self {
            Self::Plots => "vis/plots",
            Self::Mails => "vis/mails",
            Self::Jobs => "jobs",
            Self::Repos => "repos",
        }
    }

    /// Context value attached to depth-zero directories
    pub const fn top_context(self) -> &'static str {
        match self {
            Self::Plots => "plot-top",
            Self::Mails => "mail-top",
            Self::Jobs => "job-top",
            Self::Repos => "repo-top",
        }
    }

    /// Icon type assumed for root entries that do not report a `type`
    pub const fn default_icon_type(self) -> &'static str {
        match self {
            Self::Jobs => "job",
            _ => "repo",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plots" => Ok(Self::Plots),
            "mails" => Ok(Self::Mails),
            "jobs" => Ok(Self::Jobs),
            "repos" => Ok(Self::Repos),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// Entry type reported by a remote directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Link,
    /// Anything else the API reports; never shown in the tree
    #[serde(other)]
    Other,
}

impl EntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dir => "dir",
            Self::File => "file",
            Self::Link => "link",
            Self::Other => "other",
        }
    }

    pub const fn is_listed(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Capability flags attached to every remote entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl Permissions {
    pub const ALL: Self = Self {
        read: true,
        write: true,
        delete: true,
    };

    /// Fixed three-character mask, `-` for absent flags (e.g. `r-d`)
    pub fn to_unix_style(self) -> String {
        [
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.delete { 'd' } else { '-' },
        ]
        .iter()
        .collect()
    }

    pub fn flags(self) -> Vec<&'static str> {
        let mut flags = Vec::with_capacity(3);
        if self.read {
            flags.push("r");
        }
        if self.write {
            flags.push("w");
        }
        if self.delete {
            flags.push("d");
        }
        flags
    }
}

impl From<Vec<String>> for Permissions {
    fn from(flags: Vec<String>) -> Self {
        let mut perms = Self::default();
        for flag in flags {
            match flag.as_str() {
                "r" => perms.read = true,
                "w" => perms.write = true,
                "d" => perms.delete = true,
                _ => {}
            }
        }
        perms
    }
}

impl From<Permissions> for Vec<String> {
    fn from(perms: Permissions) -> Self {
        perms.flags().into_iter().map(String::from).collect()
    }
}

/// One entry of a resource listing (`GET <prefix>/<id>[/<path>]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Summary of a top-level resource owned by a user (`GET u/<user>/<seg>`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub shortname: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "type")]
    pub vis_type: Option<String>,
    pub uri: Option<String>,
    pub created: Option<String>,
    pub permissions: Option<Permissions>,
}

impl VisInfo {
    /// Stable identifier: the id, falling back to the name
    pub fn identifier(&self) -> &str {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

/// Profile overview returned by `admin/profile/overview`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub chat: Option<String>,
    pub email: Option<String>,
    pub member_since: Option<String>,
    pub name: Option<String>,
    pub subscription: Option<String>,
    pub username: Option<String>,
}

/// Body of `POST token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
    pub token_name: String,
    pub token_description: String,
}

/// Token issued by `POST token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    #[serde(default)]
    pub token_id: Option<String>,
    pub token_name: String,
}
