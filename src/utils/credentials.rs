//! Search-index credential loading: env vars, then a permission-checked
//! secrets file. The crawl engine itself never reads these; only the search
//! index bridge does.

use anyhow::{Context, Result};
use std::path::PathBuf;

const USER_KEY: &str = "OPENSEARCH_USER";
const PASS_KEY: &str = "OPENSEARCH_PASS";

/// Basic-auth credentials for the search index.
#[derive(Clone, Debug)]
pub struct SearchCredentials {
    pub user: String,
    pub password: String,
}

/// TLS behavior for the search index connection, from environment toggles.
#[derive(Clone, Copy, Debug)]
pub struct SslSettings {
    pub use_ssl: bool,
    pub verify_certs: bool,
}

impl Default for SslSettings {
    fn default() -> Self {
        Self {
            use_ssl: true,
            verify_certs: false,
        }
    }
}

pub fn ssl_settings() -> SslSettings {
    let mut s = SslSettings::default();
    if let Ok(v) = std::env::var("OPENSEARCH_USE_SSL") {
        s.use_ssl = v.eq_ignore_ascii_case("true") || v == "1";
    }
    if let Ok(v) = std::env::var("OPENSEARCH_VERIFY_CERTS") {
        s.verify_certs = v.eq_ignore_ascii_case("true") || v == "1";
    }
    s
}

fn credential_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(format!(".{}-credentials.conf", env!("CARGO_PKG_NAME"))));
    }
    paths.push(PathBuf::from(format!(
        "/etc/{}/credentials.conf",
        env!("CARGO_PKG_NAME")
    )));
    paths
}

/// Reject credential files readable by group or other.
#[cfg(unix)]
fn check_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let meta = std::fs::metadata(path)
        .with_context(|| format!("read metadata for {}", path.display()))?;
    let mode = meta.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        anyhow::bail!(
            "credentials file {} has mode {:o}; must not be group/world accessible (chmod 600)",
            path.display(),
            mode
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

fn from_env() -> Option<SearchCredentials> {
    let user = std::env::var(USER_KEY).ok().filter(|s| !s.is_empty())?;
    let password = std::env::var(PASS_KEY).ok().filter(|s| !s.is_empty())?;
    Some(SearchCredentials { user, password })
}

/// Load credentials: environment first, then the first readable secrets file
/// (`KEY=VALUE` lines, dotenv syntax). A file with lax permissions is a hard
/// error, not a fallback.
pub fn load_credentials() -> Result<SearchCredentials> {
    if let Some(creds) = from_env() {
        return Ok(creds);
    }
    for path in credential_paths() {
        if !path.is_file() {
            continue;
        }
        check_permissions(&path)?;
        dotenvy::from_path(&path)
            .with_context(|| format!("parse credentials file {}", path.display()))?;
        if let Some(creds) = from_env() {
            log::debug!("Credentials loaded from {}", path.display());
            return Ok(creds);
        }
    }
    anyhow::bail!(
        "no search-index credentials: set {USER_KEY}/{PASS_KEY} or create a credentials file"
    )
}
