//! Source archive URLs from GitHub.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, redirect};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Short-lived URL of the tarball for `branch` of `repo_name` (`owner/name`).
    async fn archive_url(&self, repo_name: &str, branch: &str, github_token: &str) -> Result<Url>;
}

pub struct GithubArchive {
    api_url: Url,
    http: Client,
}

impl GithubArchive {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("deployctl/", env!("CARGO_PKG_VERSION")))
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            api_url: crate::client::parse_base(&api_url.into())?,
            http,
        })
    }

    /// Owner and name are separate segments. A `/` in the branch stays a
    /// path separator; every other reserved character is percent-encoded.
    pub fn tarball_url(&self, repo_name: &str, branch: &str) -> Result<Url> {
        let segments = std::iter::once("repos")
            .chain(repo_name.split('/'))
            .chain(std::iter::once("tarball"))
            .chain(branch.split('/'));
        crate::client::endpoint(&self.api_url, segments)
    }
}

#[async_trait]
impl ArchiveSource for GithubArchive {
    async fn archive_url(&self, repo_name: &str, branch: &str, github_token: &str) -> Result<Url> {
        let url = self.tarball_url(repo_name, branch)?;
        debug!("Resolving archive redirect from {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(github_token)
            .send()
            .await?;

        if !response.status().is_redirection() {
            crate::client::error_for_status(response).await?;
            return Err(Error::MissingRedirect(url.to_string()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::MissingRedirect(url.to_string()))?;

        Ok(Url::parse(location)?)
    }
}
