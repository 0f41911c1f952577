// ABOUTME: Test support utilities.
// ABOUTME: In-process fakes for the deployment platform, HTTP, sleeping and output sinks.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use deployment_gate::github::{
    Creator, Deployment, DeploymentPlatform, DeploymentState, DeploymentStatus, PlatformError,
};
use deployment_gate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use deployment_gate::output::{OutputError, OutputSink};
use deployment_gate::retry::{RetryPolicy, Sleeper};
use deployment_gate::types::{DeploymentId, RepoRef};
use parking_lot::Mutex;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("deployment_gate=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ACTOR: &str = "vercel[bot]";

pub fn repo() -> RepoRef {
    RepoRef::parse("owner/repo").unwrap()
}

pub fn policy(max_secs: u64, interval_secs: u64) -> RetryPolicy {
    RetryPolicy::new(
        Duration::from_secs(max_secs),
        Duration::from_secs(interval_secs),
    )
    .unwrap()
}

pub fn deployment(id: u64, creator: &str, created_at_secs: i64) -> Deployment {
    Deployment {
        id: DeploymentId::new(id),
        creator: Some(Creator {
            login: creator.to_string(),
        }),
        created_at: Utc.timestamp_opt(created_at_secs, 0).unwrap(),
        environment: None,
        sha: None,
    }
}

pub fn status(state: DeploymentState, target_url: Option<&str>) -> DeploymentStatus {
    let status = DeploymentStatus::new(state);
    match target_url {
        Some(url) => status.with_target_url(url),
        None => status,
    }
}

/// A scripted platform answer. `Fail` carries the HTTP status the API answered with.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(u16),
}

pub const FAKE_API_URL: &str = "https://api.github.test";

impl<T: Clone> Reply<T> {
    fn into_result(self) -> Result<T, PlatformError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Fail(status) => Err(PlatformError::Status {
                url: FAKE_API_URL.to_string(),
                status,
            }),
        }
    }
}

/// Pops the next reply, repeating the last one once only it is left.
fn next_reply<T: Clone>(queue: &mut VecDeque<Reply<T>>, empty: T) -> Result<T, PlatformError> {
    let reply = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    };
    reply.unwrap_or(Reply::Ok(empty)).into_result()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentCall {
    pub environment: String,
    pub sha: Option<String>,
}

/// Platform fake scripted per environment and per deployment.
#[derive(Default)]
pub struct FakePlatform {
    deployments: Mutex<HashMap<String, VecDeque<Reply<Vec<Deployment>>>>>,
    statuses: Mutex<HashMap<DeploymentId, VecDeque<Reply<Vec<DeploymentStatus>>>>>,
    pull_requests: Mutex<HashMap<u64, String>>,
    deployment_calls: Mutex<Vec<DeploymentCall>>,
    status_calls: Mutex<Vec<DeploymentId>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deployments(self, environment: &str, replies: Vec<Reply<Vec<Deployment>>>) -> Self {
        self.deployments
            .lock()
            .insert(environment.to_string(), replies.into());
        self
    }

    pub fn statuses(self, id: u64, replies: Vec<Reply<Vec<DeploymentStatus>>>) -> Self {
        self.statuses
            .lock()
            .insert(DeploymentId::new(id), replies.into());
        self
    }

    pub fn pull_request(self, number: u64, head_sha: &str) -> Self {
        self.pull_requests
            .lock()
            .insert(number, head_sha.to_string());
        self
    }

    pub fn deployment_calls(&self) -> Vec<DeploymentCall> {
        self.deployment_calls.lock().clone()
    }

    pub fn status_calls(&self) -> Vec<DeploymentId> {
        self.status_calls.lock().clone()
    }
}

#[async_trait]
impl DeploymentPlatform for FakePlatform {
    async fn list_deployments(
        &self,
        _repo: &RepoRef,
        environment: &str,
        sha: Option<&str>,
    ) -> Result<Vec<Deployment>, PlatformError> {
        self.deployment_calls.lock().push(DeploymentCall {
            environment: environment.to_string(),
            sha: sha.map(str::to_string),
        });
        let mut scripts = self.deployments.lock();
        let queue = scripts.entry(environment.to_string()).or_default();
        next_reply(queue, Vec::new())
    }

    async fn list_deployment_statuses(
        &self,
        _repo: &RepoRef,
        deployment_id: DeploymentId,
    ) -> Result<Vec<DeploymentStatus>, PlatformError> {
        self.status_calls.lock().push(deployment_id);
        let mut scripts = self.statuses.lock();
        let queue = scripts.entry(deployment_id).or_default();
        next_reply(queue, Vec::new())
    }

    async fn pull_request_head_sha(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<String, PlatformError> {
        self.pull_requests
            .lock()
            .get(&number)
            .cloned()
            .ok_or(PlatformError::PullRequestUnavailable)
    }
}

/// A scripted HTTP answer.
#[derive(Debug, Clone)]
pub enum HttpReply {
    Status(u16, Vec<(&'static str, &'static str)>),
    NoResponse,
}

impl HttpReply {
    pub fn ok() -> Self {
        HttpReply::Status(200, Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<String>,
    pub follow_redirects: bool,
}

/// HTTP fake with separate GET and POST scripts.
///
/// Statuses outside a request's accepted range are turned into
/// `HttpError::Status`, as the real client does.
#[derive(Default)]
pub struct FakeHttp {
    gets: Mutex<VecDeque<HttpReply>>,
    posts: Mutex<VecDeque<HttpReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn next_http(queue: &mut VecDeque<HttpReply>) -> HttpReply {
    let reply = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    };
    reply.unwrap_or_else(HttpReply::ok)
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(self, replies: Vec<HttpReply>) -> Self {
        *self.gets.lock() = replies.into();
        self
    }

    pub fn posts(self, replies: Vec<HttpReply>) -> Self {
        *self.posts.lock() = replies.into();
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

fn header_string(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.to_string(),
            cookie: header_string(&request, "cookie"),
            content_type: header_string(&request, "content-type"),
            body: request.body.clone(),
            follow_redirects: request.follow_redirects,
        });

        let reply = if request.method == Method::POST {
            next_http(&mut self.posts.lock())
        } else {
            next_http(&mut self.gets.lock())
        };

        match reply {
            HttpReply::NoResponse => Err(HttpError::NoResponse {
                url: request.url.to_string(),
                reason: "connection refused".to_string(),
            }),
            HttpReply::Status(code, headers) => {
                let status = StatusCode::from_u16(code).unwrap();
                if !request.accepts(status) {
                    return Err(HttpError::Status {
                        url: request.url.to_string(),
                        status,
                    });
                }
                let mut response = HttpResponse::new(status);
                for (name, value) in headers {
                    response = response.with_header(
                        HeaderName::from_static(name),
                        HeaderValue::from_static(value),
                    );
                }
                Ok(response)
            }
        }
    }
}

/// Records waits instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.waits.lock().len()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().push(duration);
    }
}

/// Collects exported pairs in export order.
#[derive(Default)]
pub struct RecordingSink {
    exports: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.exports.lock().clone()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.exports
            .lock()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl OutputSink for RecordingSink {
    fn export(&self, key: &str, value: &str) -> Result<(), OutputError> {
        self.exports
            .lock()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}
