//! Review-app lifecycle: create, wait until created, wait until built.
//!
//! Everything after the create call is observed through polling. A review
//! app that turns up `deleted` is a permanent failure; any other status,
//! a missing build, or a failed request is retried until the policy runs out.

use deployctl_core::{Check, PollError, PollObserver, RetryPolicy, TracingObserver, poll};
use std::sync::Arc;
use tracing::info;

use crate::client::PlatformApi;
use crate::github::ArchiveSource;
use crate::models::{Build, CreateReviewApp, NewSourceBlob, ReviewApp, ReviewAppStatus};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    pub pipeline_id: String,
    pub repo_name: String,
    pub branch: String,
    pub commit: String,
    pub github_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub review_app_id: String,
    pub app_id: String,
    pub app_name: String,
    /// An existing review app for the branch was picked up instead of creating one.
    pub reused: bool,
}

pub struct ReviewApps {
    api: Arc<dyn PlatformApi>,
    archive: Arc<dyn ArchiveSource>,
    policy: RetryPolicy,
    observer: Arc<dyn PollObserver>,
}

impl ReviewApps {
    pub fn new(api: Arc<dyn PlatformApi>, archive: Arc<dyn ArchiveSource>) -> Self {
        Self {
            api,
            archive,
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PollObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// POST a new review app built from the branch archive. Never retried.
    pub async fn create(&self, params: &CreateParams) -> Result<ReviewApp> {
        let archive_url = self
            .archive
            .archive_url(&params.repo_name, &params.branch, &params.github_token)
            .await?;

        let body = CreateReviewApp {
            pipeline: params.pipeline_id.clone(),
            branch: params.branch.clone(),
            source_blob: NewSourceBlob {
                url: archive_url.to_string(),
                version: params.commit.clone(),
            },
        };

        let review_app = self.api.create_review_app(&body).await?;
        info!(
            "Created review app {} for {} at {}",
            review_app.id, params.branch, params.commit
        );
        Ok(review_app)
    }

    /// Polls the review app until it is `created` and returns its app id.
    pub async fn wait_till_created(&self, review_app_id: &str) -> Result<String> {
        let api = &self.api;
        poll(&self.policy, self.observer.as_ref(), move || async move {
            match api.get_review_app(review_app_id).await {
                Ok(review_app) => created_check(&review_app),
                Err(err) => retry_or_abort(err),
            }
        })
        .await
        .map_err(into_error)
    }

    /// Polls the app's builds until the one for `commit` has succeeded.
    pub async fn wait_for_build(&self, app_id: &str, commit: &str) -> Result<String> {
        let api = &self.api;
        poll(&self.policy, self.observer.as_ref(), move || async move {
            match api.get_builds(app_id).await {
                Ok(builds) => build_check(&builds, app_id, commit),
                Err(err) => retry_or_abort(err),
            }
        })
        .await
        .map_err(into_error)
    }

    /// First review app of the pipeline on `branch`, if any.
    pub async fn find_created(&self, pipeline_id: &str, branch: &str) -> Result<Option<ReviewApp>> {
        let review_apps = self.api.get_pipeline_review_apps(pipeline_id).await?;
        Ok(review_apps.into_iter().find(|app| app.branch == branch))
    }

    pub async fn app_name(&self, app_id: &str) -> Result<String> {
        Ok(self.api.get_app(app_id).await?.name)
    }

    /// Reuse or create the branch's review app, then wait for the commit's build.
    pub async fn deploy(&self, params: &CreateParams) -> Result<Deployment> {
        let (review_app, reused) = match self
            .find_created(&params.pipeline_id, &params.branch)
            .await?
        {
            Some(existing) => {
                info!(
                    "Found existing review app {} for branch {}",
                    existing.id, params.branch
                );
                (existing, true)
            }
            None => (self.create(params).await?, false),
        };

        let app_id = self.wait_till_created(&review_app.id).await?;
        info!("Review app {} created as app {}", review_app.id, app_id);

        let app_id = self.wait_for_build(&app_id, &params.commit).await?;
        let app_name = self.app_name(&app_id).await?;
        info!("Build for {} succeeded on {}", params.commit, app_name);

        Ok(Deployment {
            review_app_id: review_app.id,
            app_id,
            app_name,
            reused,
        })
    }
}

fn created_check(review_app: &ReviewApp) -> Check<String, Error> {
    match (&review_app.status, review_app.app_id()) {
        (ReviewAppStatus::Deleted, _) => Check::Abort(Error::ReviewAppDeleted(
            review_app
                .message
                .clone()
                .unwrap_or_else(|| "no message".to_string()),
        )),
        (ReviewAppStatus::Created, Some(app_id)) => Check::Ready(app_id.to_string()),
        (ReviewAppStatus::Creating, Some(app_id)) => Check::NotReady(format!(
            "Review app not created yet. Current status: {}, appId: {}",
            review_app.status, app_id
        )),
        (status, _) => Check::NotReady(format!(
            "Review app not created yet. Current status: {}",
            status
        )),
    }
}

fn build_check(builds: &[Build], app_id: &str, commit: &str) -> Check<String, Error> {
    let Some(build) = builds.iter().find(|b| b.is_for_commit(commit)) else {
        return Check::NotReady(format!(
            "No review app build found for app id {}, commit {}",
            app_id, commit
        ));
    };

    if !build.succeeded() {
        return Check::NotReady(format!(
            "Review app build for app id {} (commit {}) not done yet: {}",
            app_id, commit, build.status
        ));
    }

    Check::Ready(build.app.id.clone())
}

fn retry_or_abort<T>(err: Error) -> Check<T, Error> {
    if err.is_transient() {
        Check::NotReady(err.to_string())
    } else {
        Check::Abort(err)
    }
}

fn into_error(err: PollError<Error>) -> Error {
    match err {
        PollError::Aborted(err) => err,
        PollError::Exhausted { attempts, last } => Error::RetriesExhausted { attempts, last },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{build, review_app};

    #[test]
    fn test_created_check_statuses() {
        let pending = review_app("ra", "b", ReviewAppStatus::Pending, None);
        match created_check(&pending) {
            Check::NotReady(msg) => {
                assert_eq!(msg, "Review app not created yet. Current status: pending")
            }
            other => panic!("unexpected {other:?}"),
        }

        let creating = review_app("ra", "b", ReviewAppStatus::Creating, Some("app-1"));
        match created_check(&creating) {
            Check::NotReady(msg) => assert!(msg.ends_with("creating, appId: app-1")),
            other => panic!("unexpected {other:?}"),
        }

        let created = review_app("ra", "b", ReviewAppStatus::Created, Some("app-1"));
        assert!(matches!(created_check(&created), Check::Ready(id) if id == "app-1"));

        let created_without_app = review_app("ra", "b", ReviewAppStatus::Created, None);
        assert!(matches!(created_check(&created_without_app), Check::NotReady(_)));

        let mut deleted = review_app("ra", "b", ReviewAppStatus::Deleted, None);
        deleted.message = Some("build failed".to_string());
        match created_check(&deleted) {
            Check::Abort(err) => assert_eq!(err.to_string(), "Review app was deleted: build failed"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_build_check_picks_commit() {
        let builds = vec![
            build("b-1", "app-1", "old", "succeeded"),
            build("b-2", "app-1", "abc", "pending"),
        ];
        assert!(matches!(
            build_check(&builds, "app-1", "abc"),
            Check::NotReady(msg) if msg.ends_with("not done yet: pending")
        ));

        let builds = vec![build("b-2", "app-1", "abc", "succeeded")];
        assert!(matches!(build_check(&builds, "app-1", "abc"), Check::Ready(id) if id == "app-1"));

        assert!(matches!(
            build_check(&[], "app-1", "abc"),
            Check::NotReady(msg) if msg == "No review app build found for app id app-1, commit abc"
        ));
    }

    #[test]
    fn test_auth_errors_abort_polling() {
        let check: Check<(), Error> = retry_or_abort(Error::Authentication("log in".to_string()));
        assert!(matches!(check, Check::Abort(Error::Authentication(_))));
    }
}
