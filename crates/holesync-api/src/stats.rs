// Summary statistics: `/api/stats/summary`.

use crate::client::PiholeClient;
use crate::error::Error;
use crate::models::StatsSummary;

impl PiholeClient {
    /// Fetch the query/client/gravity summary.
    ///
    /// A body without a `queries` object is a failed fetch; other absent
    /// counters default to zero.
    pub async fn stats_summary(&self) -> Result<StatsSummary, Error> {
        let raw: serde_json::Value = self.get("stats/summary").await?;
        if !raw.get("queries").is_some_and(serde_json::Value::is_object) {
            return Err(Error::Deserialization {
                message: "summary has no `queries` object".into(),
                body: raw.to_string(),
            });
        }

        serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: raw.to_string(),
        })
    }
}
