pub mod loader;

use serde::{Deserialize, Serialize};

use crate::RetryPolicy;

pub use loader::ConfigLoader;

pub const DEFAULT_HEROKU_API_URL: &str = "https://api.heroku.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub heroku_api_url: String,
    pub github_api_url: String,
    pub retry: RetryPolicy,
    pub local_dev: LocalDevConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            heroku_api_url: DEFAULT_HEROKU_API_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            retry: RetryPolicy::default(),
            local_dev: LocalDevConfig::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [
            ("heroku_api_url", &self.heroku_api_url),
            ("github_api_url", &self.github_api_url),
        ] {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(crate::Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    field, value
                )));
            }
        }

        if !self.retry.factor.is_finite() || self.retry.factor < 1.0 {
            return Err(crate::Error::Config(format!(
                "retry.factor must be >= 1, got {}",
                self.retry.factor
            )));
        }

        if !(0.0..=1.0).contains(&self.retry.jitter) {
            return Err(crate::Error::Config(format!(
                "retry.jitter must be between 0 and 1, got {}",
                self.retry.jitter
            )));
        }

        self.local_dev.validate()
    }
}

/// Processes started for local development.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDevConfig {
    pub app_port: u16,
    pub router_port: u16,
    pub app_command: String,
    pub app_args: Vec<String>,
    pub router_command: String,
    pub router_args: Vec<String>,
    pub router_debug: String,
    pub router_docs_url: String,
}

impl Default for LocalDevConfig {
    fn default() -> Self {
        Self {
            app_port: 3002,
            router_port: 5050,
            app_command: "nodemon".to_string(),
            app_args: vec![
                "server/app".to_string(),
                "--watch".to_string(),
                "server".to_string(),
            ],
            router_command: "next-router".to_string(),
            router_args: Vec::new(),
            router_debug: "proxy".to_string(),
            router_docs_url: "http://git.svc.ft.com/projects/NEXT/repos/router/browse".to_string(),
        }
    }
}

impl LocalDevConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.app_port == 0 || self.router_port == 0 {
            return Err(crate::Error::Config("ports must be non-zero".to_string()));
        }
        if self.app_port == self.router_port {
            return Err(crate::Error::Config(format!(
                "app and router cannot share port {}",
                self.app_port
            )));
        }
        if self.app_command.trim().is_empty() || self.router_command.trim().is_empty() {
            return Err(crate::Error::Config(
                "app_command and router_command are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"retry": {"retries": 5}, "local_dev": {"app_port": 4000}}"#)
                .unwrap();

        assert_eq!(settings.retry.retries, 5);
        assert_eq!(settings.retry.min_timeout_ms, 10_000);
        assert_eq!(settings.local_dev.app_port, 4000);
        assert_eq!(settings.local_dev.router_port, 5050);
        assert_eq!(settings.heroku_api_url, DEFAULT_HEROKU_API_URL);
    }

    #[test]
    fn test_rejects_shared_port() {
        let mut settings = Settings::default();
        settings.local_dev.router_port = settings.local_dev.app_port;
        assert!(matches!(settings.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_rejects_shrinking_factor() {
        let mut settings = Settings::default();
        settings.retry.factor = 0.5;
        assert!(settings.validate().is_err());
    }
}
