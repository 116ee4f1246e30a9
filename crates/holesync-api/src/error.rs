use thiserror::Error;

/// Top-level error type for the `holesync-api` crate.
///
/// Covers every failure mode of the Pi-hole REST surface: authentication,
/// transport, API-reported errors, and response decoding.
/// `holesync-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong password, `valid: false`, missing SID, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The appliance answered 401 on a session-scoped call.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response or an error payload reported by the appliance.
    #[error("{}", api_message(*status, message))]
    Api { status: Option<u16>, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn api_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Pi-hole API error (HTTP {code}): {message}"),
        None => format!("Pi-hole API error: {message}"),
    }
}

impl Error {
    /// Returns `true` if this error indicates the session is gone
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a network-level failure (connect or timeout).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::SessionExpired => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_is_auth_shaped() {
        assert!(Error::SessionExpired.is_auth_expired());
        assert!(
            Error::Authentication {
                message: "incorrect password".into()
            }
            .is_auth_expired()
        );
    }

    #[test]
    fn api_error_is_not_auth_shaped() {
        let err = Error::Api {
            status: Some(400),
            message: "bad_request".into(),
        };
        assert!(!err.is_auth_expired());
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Pi-hole API error (HTTP 400): bad_request"
        );
    }

    #[test]
    fn api_error_without_status_renders_message_only() {
        let err = Error::Api {
            status: None,
            message: "database locked".into(),
        };
        assert_eq!(err.to_string(), "Pi-hole API error: database locked");
    }
}
