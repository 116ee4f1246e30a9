// Session authentication
//
// `POST /api/auth` exchanges the web-interface password for a session id
// (SID). The SID is then sent as `X-FTL-SID` on every call. Sessions expire
// on the appliance's schedule; nothing here revokes them.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{PiholeClient, preview};
use crate::error::Error;
use crate::models::AuthResponse;

/// An established appliance session.
#[derive(Debug, Clone)]
pub struct Session {
    sid: SecretString,
    validity: Option<Duration>,
}

impl Session {
    pub fn new(sid: SecretString, validity: Option<Duration>) -> Self {
        Self { sid, validity }
    }

    /// The opaque session id.
    pub fn sid(&self) -> &SecretString {
        &self.sid
    }

    /// Lifetime reported by the appliance at login, if it reported one.
    pub fn validity(&self) -> Option<Duration> {
        self.validity
    }

    pub(crate) fn header_value(&self) -> &str {
        self.sid.expose_secret()
    }
}

impl PiholeClient {
    /// Authenticate with the web-interface password.
    ///
    /// Succeeds only when the appliance answers `session.valid == true`
    /// with a non-empty `sid`. Every other outcome -- network failure,
    /// malformed body, `valid: false`, missing SID -- is
    /// [`Error::Authentication`]. On failure the previously held session
    /// is left untouched.
    pub async fn authenticate(&mut self, password: &SecretString) -> Result<Session, Error> {
        let url = self.api_url("auth")?;
        debug!("authenticating at {}", url);

        let body = json!({ "password": password.expose_secret() });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read response: {e}"),
        })?;

        let parsed: AuthResponse =
            serde_json::from_str(&text).map_err(|e| Error::Authentication {
                message: format!(
                    "malformed response (HTTP {status}): {e}; body: {:?}",
                    preview(&text)
                ),
            })?;

        let session = parsed.session;
        if !session.valid {
            let message = session
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("session not valid (HTTP {status})"));
            return Err(Error::Authentication { message });
        }

        let sid = session
            .sid
            .filter(|sid| !sid.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "no session id received".into(),
            })?;

        let established = Session::new(
            SecretString::from(sid),
            session.validity.map(Duration::from_secs),
        );
        self.session = Some(established.clone());

        info!(url = %self.base_url(), "authenticated with Pi-hole");
        Ok(established)
    }
}
