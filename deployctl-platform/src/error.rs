use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Authentication(String),

    /// Non-2xx response; `body` is the provider's error payload as returned.
    #[error("HTTP {status} from {url}: {}", describe_body(.body))]
    Http {
        status: u16,
        url: String,
        body: serde_json::Value,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No archive redirect returned by {0}")]
    MissingRedirect(String),

    #[error("Review app was deleted: {0}")]
    ReviewAppDeleted(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error(transparent)]
    Core(#[from] deployctl_core::Error),
}

impl Error {
    /// Errors worth another poll attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Transport(_) | Error::Json(_))
    }
}

fn describe_body(body: &serde_json::Value) -> String {
    match body.get("message").and_then(|m| m.as_str()) {
        Some(message) => message.to_string(),
        None => body.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
