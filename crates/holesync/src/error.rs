//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use holesync_config::ConfigError;
use holesync_core::{CoreError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Pi-hole at {url}")]
    #[diagnostic(
        code(holesync::connection_failed),
        help(
            "Check that Pi-hole is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(holesync::timeout),
        help("Increase the timeout with --timeout or check Pi-hole responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(holesync::auth_failed),
        help(
            "Verify the Pi-hole web/app password.\n\
             Set HOLESYNC_PASSWORD or run: holesync config init"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for {url}")]
    #[diagnostic(
        code(holesync::no_password),
        help("Run: holesync config init\nOr set the HOLESYNC_PASSWORD environment variable.")
    )]
    NoPassword { url: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(holesync::not_found),
        help("Run: holesync {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Pi-hole rejected the request: {message}")]
    #[diagnostic(code(holesync::api_error))]
    ApiError { message: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Device store error: {message}")]
    #[diagnostic(
        code(holesync::store),
        help("Check --state-file / state_file, or move the file aside to start fresh.")
    )]
    Store { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(holesync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No Pi-hole URL configured")]
    #[diagnostic(
        code(holesync::no_config),
        help(
            "Create a config with: holesync config init\n\
             Expected at: {path}\n\
             Or pass --url / set HOLESYNC_URL."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(holesync::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(code(holesync::keyring))]
    Keyring(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(holesync::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(holesync::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoPassword { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::ControllerStopped => CliError::Internal("sync controller stopped".into()),
            CoreError::Api { message, .. } => CliError::ApiError { message },
            CoreError::NotFound { kind, remote_id } => CliError::NotFound {
                resource_type: kind.to_string(),
                identifier: remote_id.to_string(),
                list_command: "sync".into(),
            },
            CoreError::Store(e) => e.into(),
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            e @ (CoreError::SlotsExhausted { .. } | CoreError::Mapping { .. }) => {
                CliError::Internal(e.to_string())
            }
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Store {
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoPassword { url } => CliError::NoPassword { url },
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_exit_3() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "incorrect password".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn connection_and_timeout_codes() {
        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "http://pi.hole".into(),
            reason: "refused".into(),
        });
        let timeout = CliError::from(CoreError::Timeout {
            url: "http://pi.hole".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn config_validation_is_usage() {
        let err = CliError::from(ConfigError::Validation {
            field: "url".into(),
            reason: "not set".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
