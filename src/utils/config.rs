//! Application configuration: tuning constants, layered config load.
//! Precedence: built-in defaults < config file < environment < CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::types::{HashAlgo, SessionBackend};

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                env_prefix: format!("{}_", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Config file search order: system, then user, then working directory.
    pub fn config_search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(format!("/etc/{}/config.toml", self.pkg_name))];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join(self.pkg_name)
                    .join("config.toml"),
            );
        }
        paths.push(PathBuf::from(self.config_filename()));
        paths
    }
}

// ---- Fixed tuning ----

/// Bound for the discovery channel between the walk thread and the workers.
pub const PATH_CHANNEL_CAP: usize = 1024;

/// Deadline for the MIME probe invocation (classification is cheap; a hung
/// probe must not eat into the extraction budget).
pub const MIME_PROBE_TIMEOUT_SECS: u64 = 10;

/// Captured child output is truncated past this many bytes; the child is
/// still drained so it cannot block on a full pipe.
pub const COMMAND_CAPTURE_MAX: usize = 16 * 1024 * 1024;

/// Poll interval while waiting on a child process deadline.
pub const COMMAND_POLL_MS: u64 = 25;

/// Batch size for progress bar updates (reduce lock contention).
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 50;

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below the mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Runtime configuration ----

/// Effective configuration after layering. Field names mirror the documented
/// kebab-case keys.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub default_thread_count: usize,
    pub command_timeout_seconds: u64,
    pub image_timeout_seconds: u64,
    pub audio_timeout_seconds: u64,
    pub max_recursion_depth: usize,
    pub temp_dir: PathBuf,
    pub ocr_languages: Vec<String>,
    pub ocr_min_text: usize,
    pub ocr_max_images: usize,
    pub ocr_disabled: bool,
    pub audio_disabled: bool,
    pub images_dir: Option<PathBuf>,
    pub exclude_dirs: Vec<String>,
    pub dedupe_enabled: bool,
    pub dedupe_hash: HashAlgo,
    pub csv_buffer_bytes: usize,
    pub session_backend: SessionBackend,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_thread_count: 4,
            command_timeout_seconds: 60,
            image_timeout_seconds: 120,
            audio_timeout_seconds: 300,
            max_recursion_depth: 5,
            temp_dir: std::env::temp_dir(),
            ocr_languages: vec!["eng".to_string()],
            ocr_min_text: 100,
            ocr_max_images: 10,
            ocr_disabled: false,
            audio_disabled: false,
            images_dir: None,
            exclude_dirs: Vec::new(),
            dedupe_enabled: false,
            dedupe_hash: HashAlgo::Md5,
            csv_buffer_bytes: 64 * 1024,
            session_backend: SessionBackend::Sqlite,
            log_level: "INFO".to_string(),
            log_file: None,
        }
    }
}

/// On-disk shape of the config file. Every key optional; only present keys
/// override the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    default_thread_count: Option<usize>,
    command_timeout_seconds: Option<u64>,
    image_timeout_seconds: Option<u64>,
    audio_timeout_seconds: Option<u64>,
    max_recursion_depth: Option<usize>,
    temp_dir: Option<String>,
    ocr_languages: Option<Vec<String>>,
    ocr_min_text: Option<usize>,
    ocr_max_images: Option<usize>,
    ocr_disabled: Option<bool>,
    audio_disabled: Option<bool>,
    images_dir: Option<String>,
    exclude_dirs: Option<Vec<String>>,
    dedupe_enabled: Option<bool>,
    dedupe_hash: Option<String>,
    csv_buffer_bytes: Option<usize>,
    session_backend: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

/// Overwrite a config field from the file when the key is present.
macro_rules! apply_file_opt {
    ($file:expr, $cfg:expr, $field:ident) => {
        if let Some(v) = $file.$field {
            $cfg.$field = v;
        }
    };
}

fn apply_file(file: ConfigFile, cfg: &mut AppConfig) -> Result<()> {
    apply_file_opt!(file, cfg, default_thread_count);
    apply_file_opt!(file, cfg, command_timeout_seconds);
    apply_file_opt!(file, cfg, image_timeout_seconds);
    apply_file_opt!(file, cfg, audio_timeout_seconds);
    apply_file_opt!(file, cfg, max_recursion_depth);
    if let Some(v) = file.temp_dir {
        cfg.temp_dir = PathBuf::from(v);
    }
    apply_file_opt!(file, cfg, ocr_languages);
    apply_file_opt!(file, cfg, ocr_min_text);
    apply_file_opt!(file, cfg, ocr_max_images);
    apply_file_opt!(file, cfg, ocr_disabled);
    apply_file_opt!(file, cfg, audio_disabled);
    if let Some(v) = file.images_dir {
        cfg.images_dir = Some(PathBuf::from(v));
    }
    apply_file_opt!(file, cfg, exclude_dirs);
    apply_file_opt!(file, cfg, dedupe_enabled);
    if let Some(v) = file.dedupe_hash {
        cfg.dedupe_hash = v.parse()?;
    }
    apply_file_opt!(file, cfg, csv_buffer_bytes);
    if let Some(v) = file.session_backend {
        cfg.session_backend = v.parse()?;
    }
    apply_file_opt!(file, cfg, log_level);
    if let Some(v) = file.log_file {
        cfg.log_file = Some(PathBuf::from(v));
    }
    Ok(())
}

/// Read one environment override. Key is the kebab-case config key, mapped to
/// `SHARECRAWL_<KEY>` with dashes as underscores.
fn env_var(key: &str) -> Option<String> {
    let name = format!(
        "{}{}",
        PackagePaths::get().env_prefix(),
        key.to_uppercase().replace('-', "_")
    );
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("invalid {} environment override: {}", key, e)),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match env_var(key) {
        None => Ok(None),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => anyhow::bail!("invalid {} environment override: {}", key, other),
        },
    }
}

fn apply_env(cfg: &mut AppConfig) -> Result<()> {
    if let Some(v) = env_parse("default-thread-count")? {
        cfg.default_thread_count = v;
    }
    if let Some(v) = env_parse("command-timeout-seconds")? {
        cfg.command_timeout_seconds = v;
    }
    if let Some(v) = env_parse("max-recursion-depth")? {
        cfg.max_recursion_depth = v;
    }
    if let Some(v) = env_var("temp-dir") {
        cfg.temp_dir = PathBuf::from(v);
    }
    if let Some(v) = env_var("ocr-languages") {
        cfg.ocr_languages = v.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(v) = env_parse("ocr-min-text")? {
        cfg.ocr_min_text = v;
    }
    if let Some(v) = env_parse("ocr-max-images")? {
        cfg.ocr_max_images = v;
    }
    if let Some(v) = env_bool("ocr-disabled")? {
        cfg.ocr_disabled = v;
    }
    if let Some(v) = env_bool("audio-disabled")? {
        cfg.audio_disabled = v;
    }
    if let Some(v) = env_var("images-dir") {
        cfg.images_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = env_var("exclude-dirs") {
        cfg.exclude_dirs = v.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(v) = env_bool("dedupe-enabled")? {
        cfg.dedupe_enabled = v;
    }
    if let Some(v) = env_parse::<HashAlgo>("dedupe-hash")? {
        cfg.dedupe_hash = v;
    }
    if let Some(v) = env_parse("csv-buffer-bytes")? {
        cfg.csv_buffer_bytes = v;
    }
    if let Some(v) = env_parse::<SessionBackend>("session-backend")? {
        cfg.session_backend = v;
    }
    if let Some(v) = env_var("log-level") {
        cfg.log_level = v;
    }
    if let Some(v) = env_var("log-file") {
        cfg.log_file = Some(PathBuf::from(v));
    }
    Ok(())
}

/// Load layered configuration: defaults, then the first config file found in
/// the documented search paths, then environment overrides. CLI flags are
/// applied by the command handlers on top of the result.
pub fn load_config() -> Result<AppConfig> {
    let mut cfg = AppConfig::default();
    for path in PackagePaths::get().config_search_paths() {
        if path.is_file() {
            apply_config_file(&path, &mut cfg)?;
            break;
        }
    }
    apply_env(&mut cfg)?;
    Ok(cfg)
}

fn apply_config_file(path: &Path, cfg: &mut AppConfig) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let file: ConfigFile =
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());
    apply_file(file, cfg)
}
