//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use novem_host::{
    ActivateOptions, AppContext, ConfigResolver, ConfigStore, InputRequest, PickItem, Prompter,
    ViewerHost,
};
use novem_protocol::HostMessage;
use tempfile::TempDir;
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────────────
// Mock API
// ─────────────────────────────────────────────────────────────────────────────

type Log = Arc<Mutex<Vec<(Method, String, String)>>>;

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

    pub fn api_root(&self) -> String {
        format!("http://{}/v1/", self.addr)
    }

    /// `(method, path, body)` of every request except profile lookups
    pub fn mutations(&self) -> Vec<(Method, String, String)> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| *m != Method::GET)
            .cloned()
            .collect()
    }
}

async fn respond(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    log.lock()
        .unwrap()
        .push((method.clone(), path.clone(), body));

    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());
    if authorization == Some("Bearer revoked") {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"token revoked"}"#.into());
    }

    match (method, path.as_str()) {
        (Method::GET, "/v1/admin/profile/overview") => (
            StatusCode::OK,
            r#"{"user_info":{"username":"alice","name":"Alice"}}"#.into(),
        ),
        (Method::GET, "/v1/u/alice/p") => (
            StatusCode::OK,
            r#"[
                {"id":"sales","name":"Sales","shortname":"aBc12","type":"bar","uri":"https://novem.io/p/aBc12"},
                {"id":"churn","name":"Churn","type":"line","permissions":["r"]}
            ]"#
            .into(),
        ),
        (Method::GET, "/v1/u/bob/m") => (
            StatusCode::OK,
            r#"[{"id":"digest","name":"Digest","shortname":"xYz9","uri":"https://novem.io/m/xYz9"}]"#.into(),
        ),
        (Method::GET, "/v1/u/alice/j") => (
            StatusCode::OK,
            r#"[{"id":"etl","name":"etl"}]"#.into(),
        ),
        (Method::GET, "/v1/u/alice/m" | "/v1/u/alice/r") => (StatusCode::OK, "[]".into()),
        (Method::GET, "/v1/vis/plots/sales") => (
            StatusCode::OK,
            r#"[
                {"name":"data","type":"file","permissions":["r","w"]},
                {"name":"tags","type":"dir","permissions":["r","w"]},
                {"name":"config","type":"dir","permissions":["r"]}
            ]"#
            .into(),
        ),
        (Method::GET, "/v1/jobs/etl") => (StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
        (Method::GET, "/v1/vis/plots/sales/data") => {
            (StatusCode::OK, "region,amount\nnorth,12\n".into())
        }
        (Method::GET, _) => (StatusCode::NOT_FOUND, "not found".into()),
        _ => (StatusCode::OK, String::new()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted user
// ─────────────────────────────────────────────────────────────────────────────

/// Answers prompts from queues and records every notice
#[derive(Default)]
pub struct ScriptedPrompter {
    inputs: Mutex<VecDeque<Option<String>>>,
    picks: Mutex<VecDeque<Option<usize>>>,
    confirms: Mutex<VecDeque<bool>>,
    folder: Mutex<Option<PathBuf>>,
    pub prompts: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedPrompter {
    pub fn queue_input(&self, answer: Option<&str>) -> &Self {
        self.inputs
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
        self
    }

    pub fn queue_pick(&self, answer: Option<usize>) -> &Self {
        self.picks.lock().unwrap().push_back(answer);
        self
    }

    pub fn queue_confirm(&self, answer: bool) -> &Self {
        self.confirms.lock().unwrap().push_back(answer);
        self
    }

    pub fn set_folder(&self, folder: PathBuf) -> &Self {
        *self.folder.lock().unwrap() = Some(folder);
        self
    }

    pub fn notices(&self) -> Vec<(&'static str, String)> {
        self.notices.lock().unwrap().clone()
    }

    fn notice(&self, level: &'static str, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn input(&self, request: &InputRequest) -> Option<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.inputs.lock().unwrap().pop_front().flatten()
    }

    async fn pick(&self, _placeholder: &str, _items: &[PickItem]) -> Option<usize> {
        self.picks.lock().unwrap().pop_front().flatten()
    }

    async fn confirm(&self, message: &str, _action: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.confirms.lock().unwrap().pop_front().unwrap_or(false)
    }

    async fn pick_folder(&self, _title: &str) -> Option<PathBuf> {
        self.folder.lock().unwrap().clone()
    }

    fn info(&self, message: &str) {
        self.notice("info", message);
    }

    fn warn(&self, message: &str) {
        self.notice("warn", message);
    }

    fn error(&self, message: &str) {
        self.notice("error", message);
    }
}

/// Keeps the receiving end of every panel it opens
#[derive(Default)]
pub struct RecordingViewer {
    pub panels: Mutex<Vec<(String, mpsc::UnboundedReceiver<HostMessage>)>>,
}

impl ViewerHost for RecordingViewer {
    fn open_panel(&self, title: &str) -> mpsc::UnboundedSender<HostMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.panels.lock().unwrap().push((title.to_string(), rx));
        tx
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

/// Temp config dir + mock API + scripted user
pub struct TestHarness {
    pub tmp_dir: TempDir,
    pub mock: MockNovem,
    pub prompter: Arc<ScriptedPrompter>,
    pub viewer: Arc<RecordingViewer>,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            tmp_dir: TempDir::new()?,
            mock: MockNovem::start().await?,
            prompter: Arc::default(),
            viewer: Arc::default(),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.tmp_dir.path().join("novem").join("novem.conf")
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.config_path(), ConfigResolver::default())
    }

    /// Write a config whose default profile `alice` uses `token`
    pub fn write_config(&self, token: &str) -> Result<()> {
        let text = format!(
            "[general]\nprofile = alice\napi_root = {root}\n\n\
             [profile:alice]\nusername = alice\ntoken = {token}\n\n\
             [profile:staging]\nusername = alice\ntoken = staging-token\napi_root = {root}\n",
            root = self.mock.api_root()
        );
        std::fs::create_dir_all(self.tmp_dir.path().join("novem"))?;
        std::fs::write(self.config_path(), text)?;
        Ok(())
    }

    pub fn read_config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.config_path())?)
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(
            ActivateOptions::new(self.store()),
            self.prompter.clone(),
            self.viewer.clone(),
        )
    }

    /// Activated context signed in as alice
    pub async fn signed_in(&self) -> Result<AppContext> {
        self.write_config("nbt-alice")?;
        let mut ctx = self.context();
        ctx.activate().await?;
        Ok(ctx)
    }
}
