// Pi-hole v6 response and request records
//
// Every field the appliance may omit, null out, or mistype is defaulted
// here, so nothing downstream has to deal with dict-shaped JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a value, falling back to `T::default()` on null or a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(true))
}

fn default_true() -> bool {
    true
}

fn default_list_type() -> String {
    "block".into()
}

fn lenient_list_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .filter(|s| !s.is_empty())
        .map_or_else(default_list_type, str::to_owned))
}

// ── Authentication ───────────────────────────────────────────────────

/// `POST /api/auth` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub session: AuthSession,
}

/// The `session` object inside [`AuthResponse`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSession {
    #[serde(default, deserialize_with = "lenient")]
    pub valid: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub sid: Option<String>,
    /// Seconds until the session expires, as reported by the appliance.
    #[serde(default, deserialize_with = "lenient")]
    pub validity: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

// ── Lists ────────────────────────────────────────────────────────────

/// `GET /api/lists` response.
///
/// Entries stay raw so one malformed entry cannot poison the whole
/// collection; an absent `lists` key is a failed fetch, not an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListsResponse {
    #[serde(default)]
    pub lists: Option<Vec<serde_json::Value>>,
}

/// A subscribed block/allow list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: String,
    #[serde(
        rename = "type",
        default = "default_list_type",
        deserialize_with = "lenient_list_type"
    )]
    pub list_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub groups: Vec<i64>,
}

/// Full-replace body for `PUT /api/lists/{address}?type={type}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListUpdate {
    pub enabled: bool,
    pub comment: String,
    pub groups: Vec<i64>,
    pub address: String,
    #[serde(rename = "type")]
    pub list_type: String,
}

impl ListRecord {
    /// Build the full-replace update body, preserving every field but `enabled`.
    pub fn to_update(&self, enabled: bool) -> ListUpdate {
        ListUpdate {
            enabled,
            comment: self.comment.clone().unwrap_or_default(),
            groups: self.groups.clone(),
            address: self.address.clone(),
            list_type: self.list_type.clone(),
        }
    }
}

// ── Groups ───────────────────────────────────────────────────────────

/// `GET /api/groups` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Option<Vec<serde_json::Value>>,
}

/// A client group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default = "default_true", deserialize_with = "lenient_true")]
    pub enabled: bool,
}

/// Full-replace body for `PUT /api/groups/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupUpdate {
    pub enabled: bool,
    pub name: String,
    pub description: String,
}

impl GroupRecord {
    /// Build the full-replace update body, preserving every field but `enabled`.
    pub fn to_update(&self, enabled: bool) -> GroupUpdate {
        GroupUpdate {
            enabled,
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

// ── Statistics ───────────────────────────────────────────────────────

/// `GET /api/stats/summary` response (subset used for statistics devices).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub queries: QueryStats,
    #[serde(default, deserialize_with = "lenient")]
    pub clients: ClientStats,
    #[serde(default, deserialize_with = "lenient")]
    pub gravity: GravityStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryStats {
    #[serde(deserialize_with = "lenient")]
    pub total: u64,
    #[serde(deserialize_with = "lenient")]
    pub blocked: u64,
    #[serde(deserialize_with = "lenient")]
    pub percent_blocked: f64,
    #[serde(deserialize_with = "lenient")]
    pub unique_domains: u64,
    #[serde(deserialize_with = "lenient")]
    pub forwarded: u64,
    #[serde(deserialize_with = "lenient")]
    pub cached: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientStats {
    #[serde(deserialize_with = "lenient")]
    pub active: u64,
    #[serde(deserialize_with = "lenient")]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityStats {
    #[serde(deserialize_with = "lenient")]
    pub domains_being_blocked: u64,
}

// ── Error payloads ───────────────────────────────────────────────────

/// Pi-hole error body: `{"error":{"key":"...","message":"...","hint":...}}`.
///
/// Any non-null `error` counts; a bare string or other shape is echoed as-is.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn describe(self) -> Option<String> {
        match self.error? {
            serde_json::Value::String(text) => Some(text),
            detail @ serde_json::Value::Object(_) => Some(
                ErrorDetail::deserialize(&detail).map_or_else(|_| detail.to_string(), |d| d.describe()),
            ),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hint: Option<String>,
}

impl ErrorDetail {
    pub(crate) fn describe(&self) -> String {
        let base = self
            .message
            .as_deref()
            .or(self.key.as_deref())
            .unwrap_or("unknown error");
        match self.hint.as_deref() {
            Some(hint) if !hint.is_empty() => format!("{base} ({hint})"),
            _ => base.to_owned(),
        }
    }
}

/// Batch mutation result: `{"processed":{"success":[...],"errors":[...]}}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessedBody {
    #[serde(default)]
    pub processed: Option<Processed>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Processed {
    #[serde(default, deserialize_with = "lenient")]
    pub errors: Vec<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn list_record_defaults_missing_fields() {
        let list: ListRecord = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(list.id, Some(7));
        assert_eq!(list.list_type, "block");
        assert!(!list.enabled);
        assert!(list.groups.is_empty());
        assert_eq!(list.comment, None);
    }

    #[test]
    fn list_record_tolerates_mistyped_fields() {
        let list: ListRecord = serde_json::from_value(json!({
            "id": 3,
            "comment": null,
            "enabled": "yes",
            "groups": "0,1"
        }))
        .unwrap();
        assert_eq!(list.comment, None);
        assert!(!list.enabled);
        assert!(list.groups.is_empty());
    }

    #[test]
    fn group_enabled_defaults_to_true() {
        let group: GroupRecord = serde_json::from_value(json!({ "id": 0 })).unwrap();
        assert!(group.enabled);
        let group: GroupRecord =
            serde_json::from_value(json!({ "id": 0, "enabled": null })).unwrap();
        assert!(group.enabled);
    }

    #[test]
    fn list_update_preserves_fields() {
        let list: ListRecord = serde_json::from_value(json!({
            "id": 3,
            "address": "https://example.com/ads.txt",
            "type": "block",
            "comment": "Ads",
            "enabled": true,
            "groups": [0, 1]
        }))
        .unwrap();

        let body = serde_json::to_value(list.to_update(false)).unwrap();
        assert_eq!(
            body,
            json!({
                "enabled": false,
                "comment": "Ads",
                "groups": [0, 1],
                "address": "https://example.com/ads.txt",
                "type": "block"
            })
        );
    }

    #[test]
    fn group_update_fills_missing_text_with_empty_strings() {
        let group: GroupRecord =
            serde_json::from_value(json!({ "id": 4, "enabled": false })).unwrap();
        let body = serde_json::to_value(group.to_update(true)).unwrap();
        assert_eq!(
            body,
            json!({ "enabled": true, "name": "", "description": "" })
        );
    }

    #[test]
    fn stats_summary_defaults_absent_sections() {
        let stats: StatsSummary = serde_json::from_value(json!({
            "queries": { "total": 1200, "percent_blocked": 12.5 }
        }))
        .unwrap();
        assert_eq!(stats.queries.total, 1200);
        assert_eq!(stats.queries.blocked, 0);
        assert_eq!(stats.clients.active, 0);
        assert_eq!(stats.gravity.domains_being_blocked, 0);
    }

    #[test]
    fn error_detail_prefers_message_and_appends_hint() {
        let body: ErrorBody = serde_json::from_value(json!({
            "error": { "key": "bad_request", "message": "Invalid type", "hint": "use block" }
        }))
        .unwrap();
        assert_eq!(body.describe().unwrap(), "Invalid type (use block)");
    }
}
