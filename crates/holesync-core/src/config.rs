// ── Runtime sync configuration ──
//
// Describes how to reach the appliance and how often to poll it. Carries
// credentials but never touches disk; the binary builds a `SyncConfig`
// from holesync-config and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use holesync_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_REAUTH_EVERY: u32 = 10;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Appliance base URL (e.g. `http://pi.hole`).
    pub url: Url,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-call network timeout.
    pub timeout: Duration,
    /// Heartbeat period.
    pub interval: Duration,
    /// Re-authenticate on every Nth tick regardless of failures.
    pub reauth_every: u32,
}

impl SyncConfig {
    pub fn new(url: Url, password: SecretString) -> Self {
        Self {
            url,
            password,
            tls: TlsVerification::default(),
            timeout: holesync_api::DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            reauth_every: DEFAULT_REAUTH_EVERY,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig::default().with_tls(tls).with_timeout(self.timeout)
    }
}
