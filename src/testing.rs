//! In-memory doubles shared by the unit tests

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use indicatif::ProgressBar;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::api::types::{Quota, SecurityGroup};
use crate::api::CloudControllerClient;
use crate::api::{
    Buildpack, BuildpackBitsRepository, BuildpackRepository, BuildpackUpdate, QuotaRepository,
    SecurityGroupRepository, StagingSecurityGroupsRepository,
};
use crate::cli::output::{usage_text, Ui};
use crate::core::{Config, FoundryError, FoundryResult};
use crate::requirements::{BuildpackRequirement, Requirement, RequirementsFactory};

/// JWT-shaped access token carrying `user_name`
pub fn access_token_for(user: &str) -> String {
    let claims = serde_json::json!({ "user_name": user, "scope": ["cloud_controller.admin"] });
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(&claims).unwrap());
    format!("bearer eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl", payload)
}

/// Session for `user` against a fake endpoint
pub fn logged_in_config(user: &str) -> Config {
    let mut config = Config::default();
    config.target.api_endpoint = Some("https://api.example.com".to_string());
    config.session.access_token = Some(access_token_for(user));
    config
}

/// [`Ui`] recording everything that would have been printed
#[derive(Default)]
pub struct FakeUi {
    outputs: Mutex<Vec<String>>,
}

impl FakeUi {
    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().clone()
    }

    /// Whether a single output entry contains every one of `parts`
    pub fn contains_line(&self, parts: &[&str]) -> bool {
        self.outputs
            .lock()
            .iter()
            .any(|line| parts.iter().all(|part| line.contains(part)))
    }

    fn record(&self, message: &str) {
        self.outputs
            .lock()
            .push(console::strip_ansi_codes(message).to_string());
    }
}

impl Ui for FakeUi {
    fn say(&self, message: &str) {
        self.record(message);
    }

    fn warn(&self, message: &str) {
        self.record(message);
    }

    fn ok(&self) {
        self.record("OK");
    }

    fn failed(&self, message: &str) {
        self.record("FAILED");
        self.record(message);
    }

    fn fail_with_usage(&self, message: &str, usage: &str) {
        self.record("FAILED");
        self.record(&usage_text(message, usage));
    }

    fn progress(&self, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }
}

/// Requirement that passes or fails on demand and records that it ran
struct FakeRequirement {
    name: &'static str,
    passes: bool,
    checked: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Requirement for FakeRequirement {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self) -> FoundryResult<()> {
        self.checked.lock().push(self.name.to_string());
        if self.passes {
            Ok(())
        } else {
            Err(FoundryError::NotLoggedIn)
        }
    }
}

/// Buildpack lookup used behind the fake buildpack requirement
struct BuildpackLookup {
    found: Option<Buildpack>,
    checked: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BuildpackRepository for BuildpackLookup {
    async fn find_by_name(&self, name: &str) -> FoundryResult<Buildpack> {
        self.checked.lock().push("buildpack".to_string());
        self.found
            .clone()
            .ok_or_else(|| FoundryError::not_found("Buildpack", name))
    }

    async fn update(&self, _update: &BuildpackUpdate) -> FoundryResult<Buildpack> {
        Err(FoundryError::remote("lookup only"))
    }
}

/// Requirements factory with switchable outcomes
pub struct FakeReqFactory {
    pub login_success: bool,
    pub buildpack_success: bool,
    pub checked: Arc<Mutex<Vec<String>>>,
}

impl FakeReqFactory {
    pub fn passing() -> Self {
        Self {
            login_success: true,
            buildpack_success: true,
            checked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Names of the requirements executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.checked.lock().clone()
    }
}

impl RequirementsFactory for FakeReqFactory {
    fn login_requirement(&self) -> Arc<dyn Requirement> {
        Arc::new(FakeRequirement {
            name: "login",
            passes: self.login_success,
            checked: self.checked.clone(),
        })
    }

    fn buildpack_requirement(&self, name: &str) -> Arc<BuildpackRequirement> {
        let found = self.buildpack_success.then(|| Buildpack {
            guid: format!("{}-guid", name),
            name: name.to_string(),
            ..Default::default()
        });
        let lookup = BuildpackLookup {
            found,
            checked: self.checked.clone(),
        };
        Arc::new(BuildpackRequirement::new(name, Arc::new(lookup)))
    }
}

#[derive(Default)]
pub struct FakeBuildpackRepository {
    buildpack: Option<Buildpack>,
    updates: Mutex<Vec<BuildpackUpdate>>,
    update_error: Mutex<bool>,
}

impl FakeBuildpackRepository {
    pub fn with_buildpack(buildpack: Buildpack) -> Self {
        Self {
            buildpack: Some(buildpack),
            ..Default::default()
        }
    }

    pub fn last_update(&self) -> Option<BuildpackUpdate> {
        self.updates.lock().last().cloned()
    }

    pub fn fail_updates(&self) {
        *self.update_error.lock() = true;
    }
}

#[async_trait]
impl BuildpackRepository for FakeBuildpackRepository {
    async fn find_by_name(&self, name: &str) -> FoundryResult<Buildpack> {
        self.buildpack
            .clone()
            .filter(|buildpack| buildpack.name == name)
            .ok_or_else(|| FoundryError::not_found("Buildpack", name))
    }

    async fn update(&self, update: &BuildpackUpdate) -> FoundryResult<Buildpack> {
        self.updates.lock().push(update.clone());
        if *self.update_error.lock() {
            return Err(FoundryError::Http {
                status: 400,
                code: "CF-BuildpackInvalid".to_string(),
                description: "Buildpack is invalid".to_string(),
            });
        }

        Ok(Buildpack {
            guid: update.guid.clone(),
            name: update.name.clone(),
            position: update.position,
            enabled: update.enabled,
            locked: update.locked,
            filename: None,
        })
    }
}

#[derive(Default)]
pub struct FakeBuildpackBitsRepository {
    upload_path: Mutex<Option<String>>,
    upload_error: Mutex<bool>,
}

impl FakeBuildpackBitsRepository {
    pub fn upload_path(&self) -> Option<String> {
        self.upload_path.lock().clone()
    }

    pub fn fail_uploads(&self) {
        *self.upload_error.lock() = true;
    }
}

#[async_trait]
impl BuildpackBitsRepository for FakeBuildpackBitsRepository {
    async fn upload_buildpack(&self, _buildpack: &Buildpack, path: &str) -> FoundryResult<()> {
        if *self.upload_error.lock() {
            return Err(FoundryError::remote(format!("Error opening buildpack file {}", path)));
        }
        *self.upload_path.lock() = Some(path.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQuotaRepository {
    quotas: Vec<Quota>,
    find_calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<Quota>>,
    update_error: Mutex<bool>,
}

impl FakeQuotaRepository {
    pub fn with_quotas(quotas: Vec<Quota>) -> Self {
        Self {
            quotas,
            ..Default::default()
        }
    }

    pub fn find_calls(&self) -> Vec<String> {
        self.find_calls.lock().clone()
    }

    pub fn updates(&self) -> Vec<Quota> {
        self.updates.lock().clone()
    }

    pub fn fail_updates(&self) {
        *self.update_error.lock() = true;
    }
}

#[async_trait]
impl QuotaRepository for FakeQuotaRepository {
    async fn find_by_name(&self, name: &str) -> FoundryResult<Quota> {
        self.find_calls.lock().push(name.to_string());
        self.quotas
            .iter()
            .find(|quota| quota.name == name)
            .cloned()
            .ok_or_else(|| FoundryError::not_found("Quota", name))
    }

    async fn update(&self, quota: &Quota) -> FoundryResult<()> {
        if *self.update_error.lock() {
            return Err(FoundryError::Http {
                status: 400,
                code: "CF-QuotaDefinitionInvalid".to_string(),
                description: "Quota Definition is invalid".to_string(),
            });
        }
        self.updates.lock().push(quota.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSecurityGroupRepository {
    groups: Vec<SecurityGroup>,
}

impl FakeSecurityGroupRepository {
    pub fn with_groups(groups: Vec<SecurityGroup>) -> Self {
        Self { groups }
    }
}

#[async_trait]
impl SecurityGroupRepository for FakeSecurityGroupRepository {
    async fn read(&self, name: &str) -> FoundryResult<SecurityGroup> {
        self.groups
            .iter()
            .find(|group| group.name == name)
            .cloned()
            .ok_or_else(|| FoundryError::not_found("Security group", name))
    }
}

#[derive(Default)]
pub struct FakeStagingSecurityGroupsRepository {
    groups: Vec<SecurityGroup>,
    bound: Mutex<Vec<String>>,
    unbound: Mutex<Vec<String>>,
    error: Mutex<bool>,
}

impl FakeStagingSecurityGroupsRepository {
    pub fn with_groups(groups: Vec<SecurityGroup>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    pub fn bound(&self) -> Vec<String> {
        self.bound.lock().clone()
    }

    pub fn unbound(&self) -> Vec<String> {
        self.unbound.lock().clone()
    }

    pub fn fail_requests(&self) {
        *self.error.lock() = true;
    }

    fn check(&self) -> FoundryResult<()> {
        if *self.error.lock() {
            return Err(FoundryError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StagingSecurityGroupsRepository for FakeStagingSecurityGroupsRepository {
    async fn bind_to_staging_set(&self, guid: &str) -> FoundryResult<()> {
        self.check()?;
        self.bound.lock().push(guid.to_string());
        Ok(())
    }

    async fn unbind_from_staging_set(&self, guid: &str) -> FoundryResult<()> {
        self.check()?;
        self.unbound.lock().push(guid.to_string());
        Ok(())
    }

    async fn list(&self) -> FoundryResult<Vec<SecurityGroup>> {
        self.check()?;
        Ok(self.groups.clone())
    }
}

/// A request captured by [`StubServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, as sent on the request line
    pub target: String,
    /// Raw header block
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Local HTTP/1.1 server answering with canned `(status, body)` replies in order.
///
/// Requests beyond the canned replies get a 404 with an empty body.
pub struct StubServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(replies: Vec<(u16, String)>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            let mut replies = replies.into_iter();
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                recorded.lock().push(request);

                let (status, body) = replies.next().unwrap_or((404, String::new()));
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { endpoint, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Logged-in gateway pointed at this server (with an optional path prefix)
    pub fn gateway(&self, prefix: &str) -> Arc<CloudControllerClient> {
        let mut config = logged_in_config("admin");
        config.target.api_endpoint = Some(format!("{}{}", self.endpoint, prefix));
        Arc::new(CloudControllerClient::new(Arc::new(config)).unwrap())
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    RecordedRequest {
        method: request_line.next().unwrap_or_default().to_string(),
        target: request_line.next().unwrap_or_default().to_string(),
        body: buf[header_end..].to_vec(),
        head,
    }
}

/// One page of a listing in the cloud controller's envelope
pub fn page_json(next_url: Option<&str>, resources: &[(&str, serde_json::Value)]) -> String {
    let resources: Vec<serde_json::Value> = resources
        .iter()
        .map(|(guid, entity)| {
            serde_json::json!({
                "metadata": { "guid": guid, "url": "" },
                "entity": entity,
            })
        })
        .collect();
    serde_json::json!({ "next_url": next_url, "resources": resources }).to_string()
}
