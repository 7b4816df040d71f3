use std::fmt;

use crate::resource::ResourceKind;

const PREFIX: &str = "novem.";

/// Known command identifiers
///
/// Per-resource commands are parameterized by [`ResourceKind`] instead of
/// being spelled out once per family; the identifiers on the wire stay
/// `novem.createNovemPlot`, `novem.refreshNovemRepos` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandId {
    // Session
    Login,          // novem.login
    LoginNewProfile, // novem.loginNewProfile
    Logout,         // novem.logout
    SelectProfile,  // novem.selectProfile
    EditConfig,     // novem.editConfig
    ReloadWindow,   // novem.reloadWindow

    // Documents
    OpenFile, // novem.openFile

    // Per-resource
    Create(ResourceKind),      // novem.createNovem<Kind>
    Delete(ResourceKind),      // novem.deleteNovem<Kind>
    Refresh(ResourceKind),     // novem.refreshNovem<Kinds>
    View(ResourceKind),        // novem.viewNovem<Kind>
    ViewForUser(ResourceKind), // novem.viewNovem<Kind>ForUser

    // Nodes
    CloneRepo,             // novem.cloneNovemRepo
    CreateNodeInDirectory, // novem.createNodeInDirectory
    DeleteNode,            // novem.deleteNode

    Unknown(String),
}

impl CommandId {
    /// Every identifier the host registers
    pub fn all() -> Vec<Self> {
        let mut ids = vec![
            Self::Login,
            Self::LoginNewProfile,
            Self::Logout,
            Self::SelectProfile,
            Self::EditConfig,
            Self::ReloadWindow,
            Self::OpenFile,
            Self::CloneRepo,
            Self::CreateNodeInDirectory,
            Self::DeleteNode,
        ];
        for kind in ResourceKind::ALL {
            ids.extend([Self::Create(kind), Self::Delete(kind), Self::Refresh(kind)]);
        }
        for kind in [ResourceKind::Plots, ResourceKind::Mails] {
            ids.extend([Self::View(kind), Self::ViewForUser(kind)]);
        }
        ids
    }
}

fn capitalized(kind: ResourceKind) -> String {
    let singular = kind.singular();
    let mut chars = singular.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

fn kind_from_noun(noun: &str) -> Option<ResourceKind> {
    ResourceKind::ALL
        .into_iter()
        .find(|kind| capitalized(*kind) == noun)
}

impl From<&str> for CommandId {
    fn from(s: &str) -> Self {
        let Some(name) = s.strip_prefix(PREFIX) else {
            return Self::Unknown(s.to_string());
        };

        match name {
            "login" => return Self::Login,
            "loginNewProfile" => return Self::LoginNewProfile,
            "logout" => return Self::Logout,
            "selectProfile" => return Self::SelectProfile,
            "editConfig" => return Self::EditConfig,
            "reloadWindow" => return Self::ReloadWindow,
            "openFile" => return Self::OpenFile,
            "cloneNovemRepo" => return Self::CloneRepo,
            "createNodeInDirectory" => return Self::CreateNodeInDirectory,
            "deleteNode" => return Self::DeleteNode,
            _ => {}
        }

        let parsed = if let Some(noun) = name.strip_prefix("createNovem") {
            kind_from_noun(noun).map(Self::Create)
        } else if let Some(noun) = name.strip_prefix("deleteNovem") {
            kind_from_noun(noun).map(Self::Delete)
        } else if let Some(noun) = name.strip_prefix("refreshNovem") {
            noun.strip_suffix('s').and_then(kind_from_noun).map(Self::Refresh)
        } else if let Some(rest) = name.strip_prefix("viewNovem") {
            match rest.strip_suffix("ForUser") {
                Some(noun) => kind_from_noun(noun).map(Self::ViewForUser),
                None => kind_from_noun(rest).map(Self::View),
            }
        } else {
            None
        };

        parsed.unwrap_or_else(|| Self::Unknown(s.to_string()))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "login".to_string(),
            Self::LoginNewProfile => "loginNewProfile".to_string(),
            Self::Logout => "logout".to_string(),
            Self::SelectProfile => "selectProfile".to_string(),
            Self::EditConfig => "editConfig".to_string(),
            Self::ReloadWindow => "reloadWindow".to_string(),
            Self::OpenFile => "openFile".to_string(),
            Self::Create(kind) => format!("createNovem{}", capitalized(*kind)),
            Self::Delete(kind) => format!("deleteNovem{}", capitalized(*kind)),
            Self::Refresh(kind) => format!("refreshNovem{}s", capitalized(*kind)),
            Self::View(kind) => format!("viewNovem{}", capitalized(*kind)),
            Self::ViewForUser(kind) => format!("viewNovem{}ForUser", capitalized(*kind)),
            Self::CloneRepo => "cloneNovemRepo".to_string(),
            Self::CreateNodeInDirectory => "createNodeInDirectory".to_string(),
            Self::DeleteNode => "deleteNode".to_string(),
            Self::Unknown(s) => return f.write_str(s),
        };
        write!(f, "{PREFIX}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_resource_ids_match_registered_names() {
        assert_eq!(
            CommandId::Create(ResourceKind::Plots).to_string(),
            "novem.createNovemPlot"
        );
        assert_eq!(
            CommandId::Refresh(ResourceKind::Repos).to_string(),
            "novem.refreshNovemRepos"
        );
        assert_eq!(
            CommandId::from("novem.viewNovemMailForUser"),
            CommandId::ViewForUser(ResourceKind::Mails)
        );
    }

    #[test]
    fn every_registered_id_parses_back() {
        for id in CommandId::all() {
            assert_eq!(CommandId::from(id.to_string().as_str()), id);
        }
    }

    #[test]
    fn unknown_ids_are_preserved() {
        let id = CommandId::from("novem.createNovemWidget");
        assert_eq!(id, CommandId::Unknown("novem.createNovemWidget".into()));
        assert_eq!(id.to_string(), "novem.createNovemWidget");
    }
}
