//! In-memory fakes for the platform traits (testing only)
//!
//! `FakePlatform` replays scripted responses per endpoint and records every
//! call, `FakeArchive` hands out a fixed archive URL, and `ScriptedRunner`
//! stands in for the Heroku CLI.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::auth::CommandRunner;
use crate::client::PlatformApi;
use crate::github::ArchiveSource;
use crate::models::{App, Build, CreateReviewApp, ReviewApp, ReviewAppStatus};
use crate::{Error, Result};

/// One scripted reply: a payload or an HTTP failure status.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16),
}

impl<T: Clone> Reply<T> {
    fn resolve(&self, url: &str) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Status(status) => Err(http_error(*status, url)),
        }
    }
}

fn http_error(status: u16, url: &str) -> Error {
    Error::Http {
        status,
        url: url.to_string(),
        body: serde_json::json!({ "id": "scripted", "message": format!("status {}", status) }),
    }
}

/// Replies are consumed in order; the last one repeats forever.
#[derive(Debug)]
struct Script<T>(Mutex<VecDeque<Reply<T>>>);

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }

    fn push(&self, reply: Reply<T>) {
        self.0.lock().push_back(reply);
    }

    fn next(&self, url: &str) -> Result<T> {
        let mut queue = self.0.lock();
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match reply {
            Some(reply) => reply.resolve(url),
            None => Err(http_error(404, url)),
        }
    }
}

pub fn review_app(id: &str, branch: &str, status: ReviewAppStatus, app_id: Option<&str>) -> ReviewApp {
    ReviewApp {
        id: id.to_string(),
        branch: branch.to_string(),
        status,
        app: app_id.map(|id| crate::models::AppRef { id: id.to_string() }),
        message: None,
    }
}

pub fn build(id: &str, app_id: &str, commit: &str, status: &str) -> Build {
    Build {
        id: id.to_string(),
        status: status.to_string(),
        source_blob: crate::models::SourceBlob {
            url: None,
            version: Some(commit.to_string()),
        },
        app: crate::models::AppRef {
            id: app_id.to_string(),
        },
    }
}

pub struct FakePlatform {
    review_app: Script<ReviewApp>,
    builds: Script<Vec<Build>>,
    pipeline_review_apps: Mutex<Vec<ReviewApp>>,
    apps: Mutex<HashMap<String, App>>,
    create_reply: Mutex<Reply<ReviewApp>>,
    created: Mutex<Vec<CreateReviewApp>>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            review_app: Script::new(),
            builds: Script::new(),
            pipeline_review_apps: Mutex::new(Vec::new()),
            apps: Mutex::new(HashMap::new()),
            create_reply: Mutex::new(Reply::Ok(review_app(
                "ra-new",
                "",
                ReviewAppStatus::Pending,
                None,
            ))),
            created: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_review_app(&self, reply: Reply<ReviewApp>) -> &Self {
        self.review_app.push(reply);
        self
    }

    pub fn push_builds(&self, reply: Reply<Vec<Build>>) -> &Self {
        self.builds.push(reply);
        self
    }

    pub fn set_pipeline_review_apps(&self, apps: Vec<ReviewApp>) -> &Self {
        *self.pipeline_review_apps.lock() = apps;
        self
    }

    pub fn insert_app(&self, id: &str, name: &str) -> &Self {
        self.apps.lock().insert(
            id.to_string(),
            App {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn set_create_reply(&self, reply: Reply<ReviewApp>) -> &Self {
        *self.create_reply.lock() = reply;
        self
    }

    pub fn created(&self) -> Vec<CreateReviewApp> {
        self.created.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) -> String {
        self.calls.lock().push(call.clone());
        call
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn get_app(&self, app_id: &str) -> Result<App> {
        let url = self.record(format!("GET /apps/{}", app_id));
        self.apps
            .lock()
            .get(app_id)
            .cloned()
            .ok_or_else(|| http_error(404, &url))
    }

    async fn get_builds(&self, app_id: &str) -> Result<Vec<Build>> {
        let url = self.record(format!("GET /apps/{}/builds", app_id));
        self.builds.next(&url)
    }

    async fn get_pipeline_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>> {
        self.record(format!("GET /pipelines/{}/review-apps", pipeline_id));
        Ok(self.pipeline_review_apps.lock().clone())
    }

    async fn get_review_app(&self, review_app_id: &str) -> Result<ReviewApp> {
        let url = self.record(format!("GET /review-apps/{}", review_app_id));
        self.review_app.next(&url)
    }

    async fn create_review_app(&self, body: &CreateReviewApp) -> Result<ReviewApp> {
        let url = self.record("POST /review-apps".to_string());
        self.created.lock().push(body.clone());
        let mut created = self.create_reply.lock().resolve(&url)?;
        if created.branch.is_empty() {
            created.branch = body.branch.clone();
        }
        Ok(created)
    }
}

pub struct FakeArchive {
    url: Url,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeArchive {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ArchiveSource for FakeArchive {
    async fn archive_url(&self, repo_name: &str, branch: &str, _github_token: &str) -> Result<Url> {
        self.calls
            .lock()
            .push((repo_name.to_string(), branch.to_string()));
        Ok(self.url.clone())
    }
}

/// Heroku CLI stand-in keyed by the full command line.
pub struct ScriptedRunner {
    outputs: HashMap<String, std::result::Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_output(mut self, command: &str, output: std::result::Result<&str, &str>) -> Self {
        self.outputs.insert(
            command.to_string(),
            output.map(str::to_string).map_err(str::to_string),
        );
        self
    }

    pub fn authenticated(token: &str) -> Self {
        Self::new()
            .with_output("heroku auth:whoami", Ok("dev@example.com\n"))
            .with_output("heroku auth:token", Ok(token))
    }

    pub fn unauthenticated() -> Self {
        Self::new()
            .with_output("heroku auth:whoami", Err("not logged in"))
            .with_output("heroku auth:token", Err("not logged in"))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = format!("{} {}", program, args.join(" "));
        self.calls.lock().push(command.clone());
        // Yield so concurrent callers interleave.
        tokio::task::yield_now().await;
        match self.outputs.get(&command) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => Err(Error::CommandFailed {
                command,
                status: "exit code 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Err(Error::CommandFailed {
                command,
                status: "exit code 127".to_string(),
                stderr: "command not found".to_string(),
            }),
        }
    }
}
