// Pi-hole API HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, session header
// injection, and response classification. Endpoint wrappers (lists,
// groups, stats) are inherent methods in sibling modules so this file
// stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Session;
use crate::error::Error;
use crate::models::{ErrorBody, ProcessedBody};
use crate::transport::TransportConfig;

/// Header carrying the session id on every authenticated call.
pub const SESSION_HEADER: &str = "X-FTL-SID";

/// Async client for a single Pi-hole appliance.
///
/// Holds the session established by [`authenticate`](Self::authenticate).
/// Calls made without a session are sent unauthenticated; the appliance
/// decides whether that is acceptable. No call retries internally.
pub struct PiholeClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) session: Option<Session>,
}

impl PiholeClient {
    /// Create a client for the appliance at `base_url` (e.g. `http://pi.hole`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            session: None,
        }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session currently held, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`. Trailing slashes on the base are ignored.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// `GET /api/{path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        self.get_url(url).await
    }

    /// `PUT /api/{path}` with a full-replace JSON body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        self.put_url(url, body).await
    }

    pub(crate) async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .apply_session(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    pub(crate) async fn put_url<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .apply_session(self.http.put(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// Attach the session header when a session is held.
    fn apply_session(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => builder.header(SESSION_HEADER, session.header_value()),
            None => builder,
        }
    }

    /// Classify the response and decode a success body.
    ///
    /// - 401 is [`Error::SessionExpired`]
    /// - any other non-2xx is [`Error::Api`], with the appliance's error text when present
    /// - a 2xx body carrying `error` or non-empty `processed.errors` is [`Error::Api`]
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::describe)
                .unwrap_or_else(|| {
                    let reason = status.canonical_reason().unwrap_or("error");
                    format!("{reason}: {}", preview(&body))
                });
            return Err(Error::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");

        if let Some(message) = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::describe)
        {
            return Err(Error::Api {
                status: None,
                message,
            });
        }

        if let Ok(ProcessedBody {
            processed: Some(processed),
        }) = serde_json::from_str::<ProcessedBody>(&body)
        {
            if !processed.errors.is_empty() {
                let errors: Vec<String> = processed.errors.iter().map(ToString::to_string).collect();
                return Err(Error::Api {
                    status: None,
                    message: format!("rejected: {}", errors.join(", ")),
                });
            }
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// First 200 bytes of a body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Decode raw collection entries one by one, dropping the ones that fail.
pub(crate) fn decode_entries<T: DeserializeOwned>(
    raw: Vec<serde_json::Value>,
    kind: &str,
) -> Vec<T> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(kind, error = %e, "dropping malformed entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> PiholeClient {
        PiholeClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_strips_trailing_slash() {
        let c = client("http://pi.hole/");
        assert_eq!(
            c.api_url("lists").unwrap().as_str(),
            "http://pi.hole/api/lists"
        );
    }

    #[test]
    fn api_url_keeps_base_path() {
        let c = client("http://10.0.20.4:8080/admin");
        assert_eq!(
            c.api_url("/stats/summary").unwrap().as_str(),
            "http://10.0.20.4:8080/admin/api/stats/summary"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(cut));
    }
}
