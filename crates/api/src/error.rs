use reqwest::StatusCode;

/// Longest response body kept in an [`ApiError::Http`]
const BODY_EXCERPT_LEN: usize = 200;

/// Failures surfaced by [`crate::NovemApi`]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status} for {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid resource path: {0}")]
    InvalidPath(String),
}

impl ApiError {
    pub(crate) fn http(status: StatusCode, url: &str, body: &str) -> Self {
        let body = match body.char_indices().nth(BODY_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Http {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        }
    }

    /// HTTP status, when the remote answered at all
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Rejected credentials (stale or revoked token)
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
