//! Novem REST client
//!
//! One method per endpoint shape. Every call is authenticated with the
//! profile token, never retried, and round-trips to the remote: there is
//! no local state to reconcile.

use novem_protocol::{RemoteEntry, ResourceKind, TokenGrant, TokenRequest, UserProfile, VisInfo};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Authenticated client bound to one API root and token
#[derive(Clone)]
pub struct NovemApi {
    client: reqwest::Client,
    /// API root without trailing slash
    api_root: String,
    token: String,
}

impl std::fmt::Debug for NovemApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NovemApi")
            .field("api_root", &self.api_root)
            .finish_non_exhaustive()
    }
}

impl NovemApi {
    /// Create a client with default TLS verification
    pub fn new(api_root: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_root, token)
    }

    /// Create a client from resolved profile settings
    ///
    /// `ignore_ssl_warn` disables certificate verification, for
    /// self-hosted deployments with private certificates.
    pub fn from_config(
        api_root: impl Into<String>,
        token: impl Into<String>,
        ignore_ssl_warn: bool,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(ignore_ssl_warn)
            .build()?;
        Ok(Self::with_client(client, api_root, token))
    }

    pub fn with_client(
        client: reqwest::Client,
        api_root: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let api_root = api_root.into();
        Self {
            client,
            api_root: api_root.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Map an editor-side resource path onto its API path
    ///
    /// `/plots/sales/config/type` -> `vis/plots/sales/config/type`,
    /// `/repos/site/url` -> `repos/site/url`.
    pub fn resource_path(path: &str) -> Result<String, ApiError> {
        let trimmed = path.trim_start_matches('/');
        let (kind, rest) = trimmed
            .split_once('/')
            .ok_or_else(|| ApiError::InvalidPath(path.to_string()))?;
        let kind: ResourceKind = kind
            .parse()
            .map_err(|_| ApiError::InvalidPath(path.to_string()))?;
        if rest.is_empty() {
            return Err(ApiError::InvalidPath(path.to_string()));
        }
        Ok(format!("{}/{rest}", kind.api_prefix()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%url, status = status.as_u16(), "Remote call rejected");
            return Err(ApiError::http(status, url, &body));
        }
        Ok(response)
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.send(self.request(Method::GET, &url), &url).await?;
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let body = self.get_text(path).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }

    async fn put(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "PUT");
        self.send(self.request(Method::PUT, &url), &url).await?;
        Ok(())
    }

    async fn post_text(&self, path: &str, body: String) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, bytes = body.len(), "POST");
        let request = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body);
        self.send(request, &url).await?;
        Ok(())
    }

    async fn delete_path(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "DELETE");
        self.send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json("admin/profile/overview").await
    }

    /// Exchange username/password for a token (no bearer auth needed)
    pub async fn create_token(&self, request: &TokenRequest) -> Result<TokenGrant, ApiError> {
        let url = self.url("token");
        tracing::debug!(%url, username = %request.username, "Requesting token");
        let response = self
            .send(self.client.post(&url).json(request), &url)
            .await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url("logout");
        tracing::debug!(%url, "POST");
        self.send(self.request(Method::POST, &url), &url).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────────

    /// Top-level resources of one kind owned by `user`
    ///
    /// A non-array payload is treated as an empty listing.
    pub async fn list_for_user(
        &self,
        kind: ResourceKind,
        user: &str,
    ) -> Result<Vec<VisInfo>, ApiError> {
        let path = format!("u/{user}/{}", kind.user_listing_segment());
        let value: Value = self.get_json(&path).await?;
        if !value.is_array() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            url: self.url(&path),
            source,
        })
    }

    /// Directory listing of a resource, or of a sub-path inside it
    pub async fn details(
        &self,
        kind: ResourceKind,
        id: &str,
        path: Option<&str>,
    ) -> Result<Vec<RemoteEntry>, ApiError> {
        let base = format!("{}/{id}", kind.api_prefix());
        match path.filter(|p| !p.is_empty()) {
            Some(path) => self.get_json(&format!("{base}/{path}")).await,
            None => self.get_json(&base).await,
        }
    }

    pub async fn create(&self, kind: ResourceKind, id: &str) -> Result<(), ApiError> {
        self.put(&format!("{}/{id}", kind.api_prefix())).await
    }

    /// Write `value` into the node `key` of a resource (e.g. `config/type`)
    pub async fn modify(
        &self,
        kind: ResourceKind,
        id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        let key = key.trim_start_matches('/');
        self.post_text(&format!("{}/{id}/{key}", kind.api_prefix()), value.to_string())
            .await
    }

    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), ApiError> {
        self.delete_path(&format!("{}/{id}", kind.api_prefix())).await
    }

    /// Public metadata of a shared visualization (`i/<shortname>`)
    pub async fn vis_info(&self, shortname: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("i/{shortname}")).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource filesystem
    // ─────────────────────────────────────────────────────────────────────────

    /// Raw content of a file node, e.g. `/plots/sales/data`
    pub async fn read_file(&self, path: &str) -> Result<String, ApiError> {
        self.get_text(&Self::resource_path(path)?).await
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), ApiError> {
        self.post_text(&Self::resource_path(path)?, content.to_string())
            .await
    }

    /// Create an empty node, e.g. `/plots/sales/shared/+public`
    pub async fn create_node(&self, path: &str) -> Result<(), ApiError> {
        self.put(&Self::resource_path(path)?).await
    }

    pub async fn delete_node(&self, path: &str) -> Result<(), ApiError> {
        self.delete_path(&Self::resource_path(path)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_loses_trailing_slash() {
        let api = NovemApi::new("https://api.novem.io/v1/", "nbt");
        assert_eq!(api.api_root(), "https://api.novem.io/v1");
        assert_eq!(api.url("/u/alice/p"), "https://api.novem.io/v1/u/alice/p");
    }

    #[test]
    fn resource_paths_map_onto_kind_prefixes() {
        assert_eq!(
            NovemApi::resource_path("/plots/sales/config/type").unwrap(),
            "vis/plots/sales/config/type"
        );
        assert_eq!(
            NovemApi::resource_path("/mails/weekly/content").unwrap(),
            "vis/mails/weekly/content"
        );
        assert_eq!(NovemApi::resource_path("/repos/site/url").unwrap(), "repos/site/url");
        assert_eq!(NovemApi::resource_path("/jobs/etl/data").unwrap(), "jobs/etl/data");
    }

    #[test]
    fn malformed_resource_paths_are_rejected() {
        for bad in ["/plots", "/plots/", "/widgets/x", ""] {
            assert!(
                matches!(NovemApi::resource_path(bad), Err(ApiError::InvalidPath(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn debug_output_hides_token() {
        let api = NovemApi::new("https://api.novem.io/v1", "nbt-secret");
        assert!(!format!("{api:?}").contains("nbt-secret"));
    }
}
