//! Heroku review-app orchestration.
//!
//! [`review_app::ReviewApps`] drives the create/wait flow over the
//! [`client::PlatformApi`] and [`github::ArchiveSource`] seams, with the
//! bearer token resolved by [`auth::TokenProvider`].

pub mod auth;
pub mod client;
pub mod error;
pub mod fakes;
pub mod github;
pub mod models;
pub mod review_app;

pub use auth::{CommandRunner, SystemRunner, TokenProvider};
pub use client::{HerokuClient, PlatformApi};
pub use error::{Error, Result};
pub use github::{ArchiveSource, GithubArchive};
pub use models::{App, Build, CreateReviewApp, ReviewApp, ReviewAppStatus};
pub use review_app::{CreateParams, Deployment, ReviewApps};
