// ── Core error types ──
//
// Errors surfaced by holesync-core. Consumers never see raw HTTP status
// handling or JSON decoding failures; `From<holesync_api::Error>` folds
// them into the taxonomy below.

use thiserror::Error;

use crate::model::{CollectionKind, RemoteId, Slot};
use crate::store::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to Pi-hole at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Sync controller stopped")]
    ControllerStopped,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Reconciliation errors ────────────────────────────────────────
    #[error("No free {kind} slot for remote id {remote_id}")]
    SlotsExhausted {
        kind: CollectionKind,
        remote_id: RemoteId,
    },

    #[error("Slot {slot}: {reason}")]
    Mapping { slot: Slot, reason: String },

    #[error("Remote {kind} {remote_id} not found")]
    NotFound {
        kind: CollectionKind,
        remote_id: RemoteId,
    },

    // ── Local store ──────────────────────────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// An authentication-shaped failure: the session must be renewed
    /// before any further call in this cycle is worth making.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Network-level failure (connect or timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<holesync_api::Error> for CoreError {
    fn from(err: holesync_api::Error) -> Self {
        match err {
            holesync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            holesync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            holesync_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<unknown>".into());
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            holesync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            holesync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            holesync_api::Error::Api { status, message } => CoreError::Api { message, status },
            holesync_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry_is_auth_shaped() {
        let err = CoreError::from(holesync_api::Error::SessionExpired);
        assert!(err.is_auth_expired());
        assert!(!err.is_transport());
    }

    #[test]
    fn api_errors_keep_status() {
        let err = CoreError::from(holesync_api::Error::Api {
            status: Some(404),
            message: "Not found".into(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn decoding_failures_become_api_errors() {
        let err = CoreError::from(holesync_api::Error::Deserialization {
            message: "missing field".into(),
            body: "{}".into(),
        });
        assert!(err.to_string().contains("unexpected response"));
    }

    #[test]
    fn exhausted_message_names_kind() {
        let err = CoreError::SlotsExhausted {
            kind: CollectionKind::List,
            remote_id: 42,
        };
        assert_eq!(err.to_string(), "No free list slot for remote id 42");
    }
}
