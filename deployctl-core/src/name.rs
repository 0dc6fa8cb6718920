//! Application name normalization.

const ENV_PREFIXES: [&str; 2] = ["ft-", "next-"];
const ORG_SCOPE: &str = "@financial-times/";
const VERSION_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep the `-vNNN` suffix of versioned app names.
    pub version: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { version: true }
    }
}

impl NormalizeOptions {
    pub fn without_version() -> Self {
        Self { version: false }
    }
}

/// Strips the environment prefix from an app or package name.
///
/// Scoped package names are left alone unless the version is being dropped,
/// in which case the organisation scope goes too. Only three-digit version
/// suffixes (`-v123`) are treated as versions.
pub fn normalize_name(name: &str, options: NormalizeOptions) -> String {
    if options.version {
        if name.starts_with('@') {
            return name.to_string();
        }
        return strip_env_prefix(name).to_string();
    }

    let unscoped = name.strip_prefix(ORG_SCOPE).unwrap_or(name);
    strip_version(strip_env_prefix(unscoped)).to_string()
}

/// Environment variable key the router reads the upstream port from.
pub fn env_key(package_name: &str) -> String {
    normalize_name(package_name, NormalizeOptions::without_version())
}

fn strip_env_prefix(name: &str) -> &str {
    ENV_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

fn strip_version(name: &str) -> &str {
    let Some(idx) = name.rfind("-v") else {
        return name;
    };
    let digits = &name[idx + 2..];
    if idx > 0 && digits.len() == VERSION_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        &name[..idx]
    } else {
        name
    }
}
