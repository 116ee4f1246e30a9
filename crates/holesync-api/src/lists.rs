// Subscribed block/allow lists: `/api/lists`.

use tracing::debug;

use crate::client::{PiholeClient, decode_entries};
use crate::error::Error;
use crate::models::{ListRecord, ListsResponse};

impl PiholeClient {
    /// Fetch every configured list.
    ///
    /// Entries that fail to decode or carry no `id` are dropped. A body
    /// without a `lists` array is a failed fetch.
    pub async fn lists(&self) -> Result<Vec<ListRecord>, Error> {
        let resp: ListsResponse = self.get("lists").await?;
        let raw = resp.lists.ok_or_else(|| Error::Deserialization {
            message: "response has no `lists` array".into(),
            body: String::new(),
        })?;

        let lists: Vec<ListRecord> = decode_entries::<ListRecord>(raw, "list")
            .into_iter()
            .filter(|list| {
                if list.id.is_none() {
                    debug!(address = %list.address, "dropping list without id");
                }
                list.id.is_some()
            })
            .collect();

        debug!(count = lists.len(), "received lists");
        Ok(lists)
    }

    /// Enable or disable a list.
    ///
    /// `list` must be the latest representation from [`lists`](Self::lists):
    /// the appliance replaces the whole entity, so comment, groups, address,
    /// and type are resent unchanged.
    pub async fn update_list(&self, list: &ListRecord, enabled: bool) -> Result<(), Error> {
        if list.address.is_empty() {
            return Err(Error::Api {
                status: None,
                message: format!("list {} has no address", list.id.unwrap_or_default()),
            });
        }

        let mut url = self.api_url("lists")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(&list.address);
        url.query_pairs_mut().append_pair("type", &list.list_type);

        let _: serde_json::Value = self.put_url(url, &list.to_update(enabled)).await?;
        Ok(())
    }
}
