//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;

/// One request as seen by the mock server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// In-process stand-in for the Novem API, serving under `/v1`
pub struct MockNovem {
    pub addr: SocketAddr,
    log: Log,
}

impl MockNovem {
    pub async fn start() -> Result<Self> {
        let log: Log = Arc::default();
        let app = Router::new().fallback(respond).with_state(log.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, log })
    }

    /// API root with a trailing slash, as written in config files
    pub fn api_root(&self) -> String {
        format!("http://{}/v1/", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }
}

async fn respond(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let authorization = header("authorization");
    let path = uri.path().to_string();

    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        content_type: header("content-type"),
        body,
    });

    if authorization.as_deref() == Some("Bearer revoked") {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"token revoked"}"#.into());
    }

    match (method, path.as_str()) {
        (Method::GET, "/v1/admin/profile/overview") => (
            StatusCode::OK,
            r#"{"user_info":{"username":"alice","name":"Alice","email":"alice@example.com"}}"#.into(),
        ),
        (Method::GET, "/v1/u/alice/p") => (
            StatusCode::OK,
            r#"[
                {"id":"sales","name":"Sales","shortname":"aBc12","type":"bar","uri":"https://novem.io/p/aBc12"},
                {"id":"churn","name":"Churn","type":"line","permissions":["r"]}
            ]"#
            .into(),
        ),
        (Method::GET, "/v1/u/alice/m") => (StatusCode::OK, r#"{"status":"no mails"}"#.into()),
        (Method::GET, "/v1/vis/plots/sales") => (
            StatusCode::OK,
            r#"[
                {"name":"data","type":"file","permissions":["r","w"]},
                {"name":"config","type":"dir","permissions":["r"]}
            ]"#
            .into(),
        ),
        (Method::GET, "/v1/vis/plots/sales/config") => (
            StatusCode::OK,
            r#"[{"name":"type","type":"file","permissions":["r","w"]}]"#.into(),
        ),
        (Method::GET, "/v1/vis/plots/sales/data") => (StatusCode::OK, "region,amount\nnorth,12\n".into()),
        (Method::GET, "/v1/repos/site/url") => (
            StatusCode::OK,
            "https://git.novem.io/alice/site.git\n".into(),
        ),
        (Method::GET, "/v1/i/aBc12") => (StatusCode::OK, r#"{"about":{"name":"Sales"}}"#.into()),
        (Method::POST, "/v1/token") => (
            StatusCode::OK,
            r#"{"token":"nbt-new","token_id":"42","token_name":"novem_ext-ab12c"}"#.into(),
        ),
        (Method::GET, _) => (StatusCode::NOT_FOUND, "not found".into()),
        _ => (StatusCode::OK, String::new()),
    }
}
