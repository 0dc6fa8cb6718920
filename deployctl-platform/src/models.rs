//! Platform API payloads.
//!
//! Only the fields the orchestration reads are modelled; everything else in
//! the responses is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAppStatus {
    Pending,
    Creating,
    Created,
    Deleted,
    #[serde(other)]
    Other,
}

impl fmt::Display for ReviewAppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::Other => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewApp {
    pub id: String,
    pub branch: String,
    pub status: ReviewAppStatus,
    #[serde(default)]
    pub app: Option<AppRef>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReviewApp {
    pub fn app_id(&self) -> Option<&str> {
        self.app.as_ref().map(|a| a.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBlob {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub status: String,
    pub source_blob: SourceBlob,
    pub app: AppRef,
}

impl Build {
    pub const SUCCEEDED: &'static str = "succeeded";

    pub fn is_for_commit(&self, commit: &str) -> bool {
        self.source_blob.version.as_deref() == Some(commit)
    }

    pub fn succeeded(&self) -> bool {
        self.status == Self::SUCCEEDED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSourceBlob {
    pub url: String,
    pub version: String,
}

/// Body of `POST /review-apps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewApp {
    pub pipeline: String,
    pub branch: String,
    pub source_blob: NewSourceBlob,
}
