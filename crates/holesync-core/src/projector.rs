// ── State projector ──
//
// Pushes remote readings into device values. A write only happens when the
// `(n_value, s_value)` pair differs from what the store already holds;
// every write is a user-visible event on the host.

use holesync_api::{PiholeClient, StatsSummary};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::identity::IdentityMap;
use crate::model::{
    CollectionKind, Device, DeviceUpdate, DeviceValue, RemoteEntity, Slot, StatMetric, SwitchState,
};
use crate::reconcile::fetch_collection;
use crate::store::{DeviceStore, StoreError};

/// Create any missing statistics device. Returns how many were created.
pub fn ensure_statistics(store: &mut impl DeviceStore) -> Result<usize, StoreError> {
    let mut created = 0;
    for metric in StatMetric::iter() {
        if store.contains(metric.slot()) {
            continue;
        }
        store.create(Device::new(
            metric.slot(),
            metric.name(),
            metric.device_type(),
            metric.initial_value(),
        ))?;
        info!(slot = %metric.slot(), name = metric.name(), "created statistics device");
        created += 1;
    }
    Ok(created)
}

/// Write `value` to `slot` unless it already holds it. Returns whether a
/// write happened.
pub fn write_value(
    store: &mut impl DeviceStore,
    slot: Slot,
    value: DeviceValue,
) -> Result<bool, StoreError> {
    let device = store.get(slot).ok_or(StoreError::Missing(slot))?;
    if device.value == value {
        return Ok(false);
    }
    debug!(%slot, n_value = value.n_value, s_value = %value.s_value, "updating device value");
    store.update(slot, DeviceUpdate::value(value))?;
    Ok(true)
}

/// Outcome of a full state refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub writes: usize,
    pub errors: Vec<CoreError>,
}

impl RefreshReport {
    /// Whether the refresh stopped on an authentication-shaped failure.
    pub fn auth_expired(&self) -> bool {
        self.errors.iter().any(CoreError::is_auth_expired)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct StateProjector<'a, S> {
    identity: &'a IdentityMap,
    store: &'a mut S,
}

impl<'a, S: DeviceStore> StateProjector<'a, S> {
    pub fn new(identity: &'a IdentityMap, store: &'a mut S) -> Self {
        Self { identity, store }
    }

    /// Project every statistic from one summary.
    pub fn project_stats(&mut self, summary: &StatsSummary) -> Result<usize, StoreError> {
        let mut writes = 0;
        for metric in StatMetric::iter() {
            if write_value(&mut *self.store, metric.slot(), metric.value(summary))? {
                writes += 1;
            }
        }
        Ok(writes)
    }

    /// Project the enabled state of every bound entity in `remote`.
    pub fn project_collection(
        &mut self,
        kind: CollectionKind,
        remote: &[RemoteEntity],
    ) -> Result<usize, StoreError> {
        let mut writes = 0;
        for entity in remote.iter().filter(|e| e.kind() == kind) {
            let Some(slot) = self.identity.lookup_slot(kind, entity.id) else {
                continue;
            };
            if write_value(&mut *self.store, slot, SwitchState::from(entity.enabled).into())? {
                writes += 1;
            }
        }
        Ok(writes)
    }

    /// Fetch statistics, lists, and groups independently and project each.
    ///
    /// A failed fetch is logged and the next one still runs, except after an
    /// authentication failure: nothing more is attempted until the session
    /// is renewed.
    pub async fn refresh_all(&mut self, client: &PiholeClient) -> RefreshReport {
        let mut report = RefreshReport::default();

        let stats = match client.stats_summary().await {
            Ok(summary) => self.project_stats(&summary).map_err(CoreError::from),
            Err(e) => Err(e.into()),
        };
        if !record(&mut report, "statistics", stats) {
            return report;
        }

        for kind in CollectionKind::iter() {
            let projected = match fetch_collection(client, kind).await {
                Ok(remote) => self.project_collection(kind, &remote).map_err(CoreError::from),
                Err(e) => Err(e),
            };
            if !record(&mut report, &kind.to_string(), projected) {
                break;
            }
        }

        debug!(writes = report.writes, errors = report.errors.len(), "state refresh complete");
        report
    }
}

/// Fold one refresh step into the report. Returns `false` when the refresh
/// should stop.
fn record(report: &mut RefreshReport, what: &str, result: Result<usize, CoreError>) -> bool {
    match result {
        Ok(writes) => {
            report.writes += writes;
            true
        }
        Err(e) => {
            warn!(error = %e, "{what} refresh failed");
            let stop = e.is_auth_expired();
            report.errors.push(e);
            !stop
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceType, IdentityTag};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn bound_store() -> (IdentityMap, MemoryStore) {
        let mut store = MemoryStore::new();
        store
            .create(Device::tagged_switch(
                Slot::new(100),
                "List: Ads",
                IdentityTag::new(CollectionKind::List, 3),
                SwitchState::Off,
            ))
            .unwrap();
        let identity = IdentityMap::rebuild(&store);
        (identity, store)
    }

    fn ads(enabled: bool) -> RemoteEntity {
        let record = serde_json::from_value(json!({ "id": 3, "comment": "Ads", "enabled": enabled }));
        RemoteEntity::from_list(record.unwrap()).unwrap()
    }

    #[test]
    fn ensure_statistics_creates_once() {
        let mut store = MemoryStore::new();
        assert_eq!(ensure_statistics(&mut store).unwrap(), 10);
        assert_eq!(ensure_statistics(&mut store).unwrap(), 0);

        let status = store.get(Slot::new(10)).unwrap();
        assert_eq!(status.device_type, DeviceType::Switch);
        assert_eq!(status.value, DeviceValue::new(0, "Off"));
        assert_eq!(store.get(Slot::new(3)).unwrap().device_type, DeviceType::Percentage);
    }

    #[test]
    fn repeated_state_writes_once() {
        let (identity, mut store) = bound_store();
        let mut projector = StateProjector::new(&identity, &mut store);
        assert_eq!(projector.project_collection(CollectionKind::List, &[ads(true)]).unwrap(), 1);
        assert_eq!(projector.project_collection(CollectionKind::List, &[ads(true)]).unwrap(), 0);
        assert_eq!(store.get(Slot::new(100)).unwrap().value, DeviceValue::new(1, "On"));
    }

    #[test]
    fn unbound_entities_are_ignored() {
        let (identity, mut store) = bound_store();
        let other = RemoteEntity::from_list(
            serde_json::from_value(json!({ "id": 8, "enabled": true })).unwrap(),
        )
        .unwrap();
        let mut projector = StateProjector::new(&identity, &mut store);
        assert_eq!(projector.project_collection(CollectionKind::List, &[other]).unwrap(), 0);
    }

    #[test]
    fn stats_project_only_changes() {
        let identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        ensure_statistics(&mut store).unwrap();

        let mut summary = StatsSummary::default();
        summary.queries.total = 1500;
        let mut projector = StateProjector::new(&identity, &mut store);
        // total, the percentage gauge ("0" -> "0.00") and the status switch
        assert_eq!(projector.project_stats(&summary).unwrap(), 3);
        assert_eq!(projector.project_stats(&summary).unwrap(), 0);
        assert_eq!(store.get(Slot::new(1)).unwrap().value.s_value, "1500");
        assert_eq!(store.get(Slot::new(10)).unwrap().value, DeviceValue::new(1, "On"));
    }

    #[test]
    fn write_value_needs_a_device() {
        let mut store = MemoryStore::new();
        let err = write_value(&mut store, Slot::new(4), DeviceValue::text("1")).unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }
}
