//! Configuration for holesync.
//!
//! TOML file + `HOLESYNC_*` environment (figment), password resolution
//! (env, keyring, plaintext), and translation to `holesync_core::SyncConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use holesync_core::{SyncConfig, TlsVerification};

pub const ENV_PREFIX: &str = "HOLESYNC_";
pub const PASSWORD_ENV: &str = "HOLESYNC_PASSWORD";
const KEYRING_SERVICE: &str = "holesync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for {url}")]
    NoPassword { url: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Pi-hole base URL (e.g. "http://pi.hole").
    pub url: Option<String>,

    /// Web/app password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name holding the password.
    pub password_env: Option<String>,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_reauth_every")]
    pub reauth_every: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Device store location. Defaults to the platform data dir.
    pub state_file: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Raise the default log level to debug.
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            password: None,
            password_env: None,
            interval_secs: default_interval(),
            reauth_every: default_reauth_every(),
            timeout_secs: default_timeout(),
            state_file: None,
            insecure: false,
            ca_cert: None,
            debug: false,
        }
    }
}

fn default_interval() -> u64 {
    60
}
fn default_reauth_every() -> u32 {
    10
}
fn default_timeout() -> u64 {
    5
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "holesync", "holesync")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("holesync");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default device store location.
pub fn default_state_file() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("devices.json"),
        |dirs| dirs.data_dir().join("devices.json"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load config: defaults, then the TOML file (`path` or the platform
/// default), then `HOLESYNC_*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

impl Config {
    pub fn state_file(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_file)
    }

    /// Copy with the password blanked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_user(url: &str) -> String {
    format!("{url}/password")
}

fn keyring_lookup(url: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(url))
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store `password` in the system keyring for `url`.
pub fn store_password(url: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(url))?.set_password(password)?;
    Ok(())
}

/// Resolve the password: `HOLESYNC_PASSWORD` or `password_env`, then the
/// keyring, then plaintext in the config.
pub fn resolve_password(cfg: &Config) -> Result<SecretString, ConfigError> {
    resolve_password_with(cfg, |name| std::env::var(name).ok(), keyring_lookup)
}

fn resolve_password_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let url = cfg.url.clone().unwrap_or_default();

    // 1. Env vars
    let from_env = env(PASSWORD_ENV).or_else(|| cfg.password_env.as_deref().and_then(&env));
    if let Some(pw) = from_env {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring(&url) {
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = cfg.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoPassword { url })
}

// ── Translation ─────────────────────────────────────────────────────

fn validation(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Build the core `SyncConfig`, validating every field.
pub fn to_sync_config(cfg: &Config) -> Result<SyncConfig, ConfigError> {
    let raw = cfg.url.as_deref().ok_or_else(|| validation("url", "not set"))?;
    let url: url::Url = raw
        .parse()
        .map_err(|_| validation("url", format!("invalid URL: {raw}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(validation("url", format!("unsupported scheme '{}'", url.scheme())));
    }
    if cfg.interval_secs == 0 {
        return Err(validation("interval_secs", "must be at least 1"));
    }
    if cfg.reauth_every == 0 {
        return Err(validation("reauth_every", "must be at least 1"));
    }
    if cfg.timeout_secs == 0 {
        return Err(validation("timeout_secs", "must be at least 1"));
    }

    let password = resolve_password(cfg)?;
    Ok(build_sync_config(cfg, url, password))
}

fn build_sync_config(cfg: &Config, url: url::Url, password: SecretString) -> SyncConfig {
    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut sync = SyncConfig::new(url, password);
    sync.tls = tls;
    sync.timeout = Duration::from_secs(cfg.timeout_secs);
    sync.interval = Duration::from_secs(cfg.interval_secs);
    sync.reauth_every = cfg.reauth_every;
    sync
}
