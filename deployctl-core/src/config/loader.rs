use super::Settings;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "deployctl.json";
const PACKAGE_SECTION: &str = "deployctl";

/// Settings loader with auto-discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![
                PathBuf::from("."),
                PathBuf::from("./config"),
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            ],
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that only looks in the given directories.
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Auto-discover and load settings
    pub async fn load(&self) -> crate::Result<Settings> {
        // Priority order:
        // 1. deployctl.json
        // 2. package.json with a deployctl section

        for dir in &self.search_paths {
            let config_json = dir.join(CONFIG_FILE);
            if config_json.exists() {
                return self.load_settings_json(&config_json).await;
            }

            let package_json = dir.join("package.json");
            if package_json.exists()
                && let Some(settings) = self.load_package_json(&package_json).await?
            {
                return Ok(settings);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Settings::default())
    }

    /// Load a specific config file
    pub async fn load_file(&self, path: &Path) -> crate::Result<Settings> {
        let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if filename == "package.json" {
            return self.load_package_json(path).await?.ok_or_else(|| {
                crate::Error::Config(format!(
                    "No {} section in {}",
                    PACKAGE_SECTION,
                    path.display()
                ))
            });
        }

        self.load_settings_json(path).await
    }

    async fn load_settings_json(&self, path: &Path) -> crate::Result<Settings> {
        tracing::debug!("Loading settings from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    async fn load_package_json(&self, path: &Path) -> crate::Result<Option<Settings>> {
        let package = read_package_json(path).await?;

        let Some(section) = package.get(PACKAGE_SECTION) else {
            return Ok(None);
        };

        let settings: Settings = serde_json::from_value(section.clone()).map_err(|e| {
            crate::Error::Config(format!("Failed to parse {} section: {}", PACKAGE_SECTION, e))
        })?;
        settings.validate()?;
        Ok(Some(settings))
    }
}

/// The `name` field of `package.json` in `dir`.
pub async fn read_package_name(dir: &Path) -> crate::Result<String> {
    let path = dir.join("package.json");
    let package = read_package_json(&path).await?;
    package
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| crate::Error::Config(format!("No name in {}", path.display())))
}

async fn read_package_json(path: &Path) -> crate::Result<serde_json::Value> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content)
        .map_err(|e| crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}
