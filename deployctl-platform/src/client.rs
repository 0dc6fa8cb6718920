//! Heroku Platform API client.
//!
//! Thin wrapper over `reqwest` issuing authenticated requests to the
//! endpoints the review-app flow needs. Non-2xx responses are turned into
//! [`Error::Http`] carrying the provider's JSON error body.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::models::{App, Build, CreateReviewApp, ReviewApp};
use crate::{Error, Result};

pub const ACCEPT_V3: &str = "application/vnd.heroku+json; version=3";
pub const ACCEPT_REVIEW_APPS: &str = "application/vnd.heroku+json; version=3.review-apps";

#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn get_app(&self, app_id: &str) -> Result<App>;

    async fn get_builds(&self, app_id: &str) -> Result<Vec<Build>>;

    async fn get_pipeline_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>>;

    async fn get_review_app(&self, review_app_id: &str) -> Result<ReviewApp>;

    async fn create_review_app(&self, body: &CreateReviewApp) -> Result<ReviewApp>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiVariant {
    Default,
    ReviewApps,
}

impl ApiVariant {
    fn accept(self) -> &'static str {
        match self {
            ApiVariant::Default => ACCEPT_V3,
            ApiVariant::ReviewApps => ACCEPT_REVIEW_APPS,
        }
    }
}

pub struct HerokuClient {
    base_url: Url,
    http: Client,
    tokens: Arc<TokenProvider>,
}

impl HerokuClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenProvider>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("deployctl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(base_url, http, tokens)
    }

    fn with_client(
        base_url: impl Into<String>,
        http: Client,
        tokens: Arc<TokenProvider>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: parse_base(&base_url.into())?,
            http,
            tokens,
        })
    }

    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        endpoint(&self.base_url, segments.iter().copied())
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        variant: ApiVariant,
    ) -> Result<RequestBuilder> {
        let token = self.tokens.token().await?;
        let url = self.url(segments)?;
        debug!("{} {}", method, url);
        Ok(self
            .http
            .request(method, url)
            .header(ACCEPT, variant.accept())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = error_for_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

/// Parses an API root that path segments can be appended to.
pub fn parse_base(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    Ok(url)
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
///
/// Ids and branch names may contain `#`, `?`, `%` or `/`; none of them may
/// change which resource is addressed.
pub fn endpoint<'a, I>(base: &Url, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Passes 2xx responses through; anything else becomes [`Error::Http`].
pub async fn error_for_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
        Err(e) => {
            warn!("Could not read error body from {}: {}", url, e);
            serde_json::Value::Null
        }
    };

    error!("Fetch error: {} {} {}", status, url, body);
    Err(Error::Http { status, url, body })
}

#[async_trait]
impl PlatformApi for HerokuClient {
    async fn get_app(&self, app_id: &str) -> Result<App> {
        let request = self
            .request(Method::GET, &["apps", app_id], ApiVariant::Default)
            .await?;
        self.fetch(request).await
    }

    async fn get_builds(&self, app_id: &str) -> Result<Vec<Build>> {
        let request = self
            .request(Method::GET, &["apps", app_id, "builds"], ApiVariant::Default)
            .await?;
        self.fetch(request).await
    }

    async fn get_pipeline_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>> {
        let request = self
            .request(
                Method::GET,
                &["pipelines", pipeline_id, "review-apps"],
                ApiVariant::ReviewApps,
            )
            .await?;
        self.fetch(request).await
    }

    async fn get_review_app(&self, review_app_id: &str) -> Result<ReviewApp> {
        let request = self
            .request(
                Method::GET,
                &["review-apps", review_app_id],
                ApiVariant::ReviewApps,
            )
            .await?;
        self.fetch(request).await
    }

    async fn create_review_app(&self, body: &CreateReviewApp) -> Result<ReviewApp> {
        let request = self
            .request(Method::POST, &["review-apps"], ApiVariant::ReviewApps)
            .await?
            .body(serde_json::to_vec(body)?);
        self.fetch(request).await
    }
}
