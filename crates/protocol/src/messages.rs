use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages posted from the host into the embedded viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum HostMessage {
    /// Point the viewer at a route, with everything it needs to fetch data
    #[serde(rename = "navigate", rename_all = "camelCase")]
    Navigate {
        route: String,
        vis_id: String,
        uri: String,
        short_name: String,
        token: Option<String>,
        api_root: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default)]
        ignore_ssl_warn: bool,
    },

    /// Push the editor colour theme
    #[serde(rename = "setTheme")]
    SetTheme { theme: String, colors: Value },
}

/// Messages posted from the viewer back to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum ViewerMessage {
    /// Step 1 of the handshake: the viewer is listening
    #[serde(rename = "contentReady")]
    ContentReady,

    /// The login route obtained a token
    #[serde(rename = "signinSuccessful")]
    SigninSuccessful {
        token: String,
        #[serde(default)]
        token_id: Option<String>,
        token_name: String,
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_uses_camel_case_fields() {
        let msg = HostMessage::Navigate {
            route: "/plots".into(),
            vis_id: "sales".into(),
            uri: "https://novem.io/p/abc".into(),
            short_name: "abc".into(),
            token: Some("nbt-1".into()),
            api_root: Some("https://api.novem.io/v1/".into()),
            username: None,
            ignore_ssl_warn: false,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["command"], "navigate");
        assert_eq!(json["visId"], "sales");
        assert_eq!(json["shortName"], "abc");
        assert_eq!(json["apiRoot"], "https://api.novem.io/v1/");
        assert!(json.get("username").is_none());
    }

    #[test]
    fn viewer_messages_parse_from_webview_json() {
        let ready: ViewerMessage = serde_json::from_str(r#"{"command":"contentReady"}"#).unwrap();
        assert_eq!(ready, ViewerMessage::ContentReady);

        let signin: ViewerMessage = serde_json::from_str(
            r#"{"command":"signinSuccessful","token":"nbt-x","token_id":"7","token_name":"ext-ab12c","username":"alice"}"#,
        )
        .unwrap();
        match signin {
            ViewerMessage::SigninSuccessful { token, username, .. } => {
                assert_eq!(token, "nbt-x");
                assert_eq!(username, "alice");
            }
            ViewerMessage::ContentReady => panic!("wrong variant"),
        }
    }
}
