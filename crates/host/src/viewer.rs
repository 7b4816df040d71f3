//! Embedded viewer panel
//!
//! The viewer is a small web app living in a host panel. Messages posted
//! before it signals `contentReady` would be lost, so the panel holds the
//! navigate payload and delivers it (plus the theme) once the viewer is
//! listening.

use novem_protocol::{HostMessage, ResourceKind, ViewerMessage, VisInfo};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::{EffectiveConfig, LoginCredentials};
use crate::error::{HostError, Result};

pub const ROUTE_LOGIN: &str = "/login";

/// Viewer route for a resource kind; only plots and mails are viewable
pub const fn route_for(kind: ResourceKind) -> Option<&'static str> {
    match kind {
        ResourceKind::Plots => Some("/plots"),
        ResourceKind::Mails => Some("/mails"),
        ResourceKind::Jobs | ResourceKind::Repos => None,
    }
}

/// Editor colour theme forwarded to the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub colors: Value,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "dark".to_string(),
            colors: Value::Object(serde_json::Map::new()),
        }
    }
}

impl Theme {
    fn message(&self) -> HostMessage {
        HostMessage::SetTheme {
            theme: self.name.clone(),
            colors: self.colors.clone(),
        }
    }
}

/// Host side of panel creation
pub trait ViewerHost: Send + Sync {
    /// Open a panel titled `title`; messages sent on the returned channel
    /// are posted into it
    fn open_panel(&self, title: &str) -> mpsc::UnboundedSender<HostMessage>;

    fn theme(&self) -> Theme {
        Theme::default()
    }
}

/// Navigate payload for a resource
pub fn navigate_to(route: &str, vis: &VisInfo, config: &EffectiveConfig) -> HostMessage {
    HostMessage::Navigate {
        route: route.to_string(),
        vis_id: vis.identifier().to_string(),
        uri: vis.uri.clone().unwrap_or_default(),
        short_name: vis.shortname.clone().unwrap_or_default(),
        token: config.token.clone(),
        api_root: config.api_root.clone(),
        username: None,
        ignore_ssl_warn: config.ignore_ssl_warn,
    }
}

/// Navigate payload for the sign-in page; carries no token
pub fn navigate_to_login(api_root: &str, username: Option<&str>) -> HostMessage {
    HostMessage::Navigate {
        route: ROUTE_LOGIN.to_string(),
        vis_id: String::new(),
        uri: String::new(),
        short_name: String::new(),
        token: None,
        api_root: Some(api_root.to_string()),
        username: username.map(str::to_string),
        ignore_ssl_warn: false,
    }
}

/// What the viewer told us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    Ready,
    SignedIn(LoginCredentials),
}

/// One open viewer panel
#[derive(Debug)]
pub struct ViewerPanel {
    title: String,
    navigate: HostMessage,
    theme: Theme,
    ready: bool,
    outbox: mpsc::UnboundedSender<HostMessage>,
}

impl ViewerPanel {
    pub fn new(
        title: impl Into<String>,
        navigate: HostMessage,
        theme: Theme,
        outbox: mpsc::UnboundedSender<HostMessage>,
    ) -> Self {
        Self {
            title: title.into(),
            navigate,
            theme,
            ready: false,
            outbox,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub const fn navigate_message(&self) -> &HostMessage {
        &self.navigate
    }

    /// Post a message; dropped (and `false` returned) until the viewer is
    /// ready or after the panel closed
    pub fn post(&self, message: HostMessage) -> bool {
        if !self.ready {
            tracing::debug!(panel = %self.title, ?message, "Viewer not ready, dropping message");
            return false;
        }
        if self.outbox.send(message).is_err() {
            tracing::debug!(panel = %self.title, "Viewer panel closed");
            return false;
        }
        true
    }

    /// Replace the theme, pushing it if the viewer is listening
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.post(self.theme.message());
    }

    pub fn handle(&mut self, message: ViewerMessage) -> ViewerEvent {
        match message {
            ViewerMessage::ContentReady => {
                self.ready = true;
                tracing::debug!(panel = %self.title, "Viewer ready");
                self.post(self.navigate.clone());
                self.post(self.theme.message());
                ViewerEvent::Ready
            }
            ViewerMessage::SigninSuccessful {
                token,
                token_name,
                username,
                ..
            } => {
                tracing::info!(%username, %token_name, "Viewer sign-in succeeded");
                ViewerEvent::SignedIn(LoginCredentials {
                    username,
                    token,
                    token_name,
                })
            }
        }
    }

    /// Decode a raw viewer message and handle it
    pub fn handle_json(&mut self, raw: &str) -> Result<ViewerEvent> {
        let message: ViewerMessage = serde_json::from_str(raw)
            .map_err(|e| HostError::Command(format!("Invalid viewer message: {e}")))?;
        Ok(self.handle(message))
    }
}
