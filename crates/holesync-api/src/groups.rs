// Client groups: `/api/groups`.

use tracing::debug;

use crate::client::{PiholeClient, decode_entries};
use crate::error::Error;
use crate::models::{GroupRecord, GroupsResponse};

impl PiholeClient {
    /// Fetch every configured group.
    pub async fn groups(&self) -> Result<Vec<GroupRecord>, Error> {
        let resp: GroupsResponse = self.get("groups").await?;
        let raw = resp.groups.ok_or_else(|| Error::Deserialization {
            message: "response has no `groups` array".into(),
            body: String::new(),
        })?;

        let groups: Vec<GroupRecord> = decode_entries::<GroupRecord>(raw, "group")
            .into_iter()
            .filter(|group| group.id.is_some())
            .collect();

        debug!(count = groups.len(), "received groups");
        Ok(groups)
    }

    /// Enable or disable a group, resending name and description unchanged.
    pub async fn update_group(&self, group: &GroupRecord, enabled: bool) -> Result<(), Error> {
        let id = group.id.ok_or_else(|| Error::Api {
            status: None,
            message: "group has no id".into(),
        })?;

        let _: serde_json::Value = self
            .put(&format!("groups/{id}"), &group.to_update(enabled))
            .await?;
        Ok(())
    }
}
