// ── Reconciler ──
//
// Diffs one remote collection against the identity map and drives device
// creation, removal, and renaming. Enabled/disabled state is left to the
// state projector.

use std::collections::{BTreeMap, BTreeSet};

use holesync_api::PiholeClient;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::identity::IdentityMap;
use crate::model::{
    CollectionKind, Device, DeviceUpdate, IdentityTag, RemoteEntity, RemoteId, Slot, SwitchState,
};
use crate::store::DeviceStore;

/// Fetch and validate the full remote collection for `kind`.
pub async fn fetch_collection(
    client: &PiholeClient,
    kind: CollectionKind,
) -> Result<Vec<RemoteEntity>, CoreError> {
    let entities: Vec<RemoteEntity> = match kind {
        CollectionKind::List => client
            .lists()
            .await?
            .into_iter()
            .filter_map(RemoteEntity::from_list)
            .collect(),
        CollectionKind::Group => client
            .groups()
            .await?
            .into_iter()
            .filter_map(RemoteEntity::from_group)
            .collect(),
    };
    debug!(%kind, count = entities.len(), "fetched remote collection");
    Ok(entities)
}

/// Outcome of one reconciliation pass over a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: CollectionKind,
    pub created: Vec<Slot>,
    pub renamed: Vec<Slot>,
    pub removed: Vec<Slot>,
    /// Remote ids left unmirrored because the slot range was full.
    pub failed_allocations: Vec<RemoteId>,
    /// Device store writes that failed.
    pub store_errors: usize,
}

impl SyncReport {
    fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            created: Vec::new(),
            renamed: Vec::new(),
            removed: Vec::new(),
            failed_allocations: Vec::new(),
            store_errors: 0,
        }
    }

    /// Number of device mutations performed.
    pub fn mutations(&self) -> usize {
        self.created.len() + self.renamed.len() + self.removed.len()
    }
}

pub struct Reconciler<'a, S> {
    identity: &'a mut IdentityMap,
    store: &'a mut S,
}

impl<'a, S: DeviceStore> Reconciler<'a, S> {
    pub fn new(identity: &'a mut IdentityMap, store: &'a mut S) -> Self {
        Self { identity, store }
    }

    /// Fetch `kind` and apply it. A failed fetch mutates nothing.
    pub async fn sync(
        &mut self,
        client: &PiholeClient,
        kind: CollectionKind,
    ) -> Result<SyncReport, CoreError> {
        let remote = fetch_collection(client, kind).await?;
        Ok(self.apply(kind, &remote))
    }

    /// Bring the devices for `kind` in line with `remote`.
    ///
    /// Removals run before creations, so a slot freed in this pass is
    /// available to entities created in the same pass.
    pub fn apply(&mut self, kind: CollectionKind, remote: &[RemoteEntity]) -> SyncReport {
        let mut report = SyncReport::new(kind);

        let mut current: BTreeMap<RemoteId, &RemoteEntity> = BTreeMap::new();
        for entity in remote.iter().filter(|e| e.kind() == kind) {
            if current.insert(entity.id, entity).is_some() {
                warn!(%kind, remote_id = entity.id, "duplicate remote id, keeping the last entry");
            }
        }

        self.drop_orphaned_bindings(kind);
        let existing = self.identity.remote_ids(kind);

        for remote_id in existing.iter().filter(|id| !current.contains_key(id)) {
            self.remove(kind, *remote_id, &mut report);
        }

        for entity in current.values().filter(|e| !existing.contains(&e.id)) {
            self.create(entity, &mut report);
        }

        for entity in current.values().filter(|e| existing.contains(&e.id)) {
            self.rename_if_changed(entity, &mut report);
        }

        if report.mutations() == 0 {
            debug!(%kind, "collection unchanged");
        }
        report
    }

    /// Bindings whose device vanished from the store are released so the
    /// entity is recreated.
    fn drop_orphaned_bindings(&mut self, kind: CollectionKind) {
        let orphans: BTreeSet<RemoteId> = self
            .identity
            .bindings(kind)
            .filter(|(_, slot)| !self.store.contains(*slot))
            .map(|(id, _)| id)
            .collect();
        for remote_id in orphans {
            if let Some(slot) = self.identity.unbind(kind, remote_id) {
                warn!(%kind, remote_id, %slot, "bound device missing from store, releasing slot");
            }
        }
    }

    fn remove(&mut self, kind: CollectionKind, remote_id: RemoteId, report: &mut SyncReport) {
        let Some(slot) = self.identity.unbind(kind, remote_id) else {
            return;
        };
        match self.store.delete(slot) {
            Ok(()) => {
                info!(%kind, remote_id, %slot, "removed device for deleted remote entity");
                report.removed.push(slot);
            }
            Err(e) => {
                warn!(%kind, remote_id, %slot, error = %e, "failed to delete device");
                report.store_errors += 1;
            }
        }
    }

    fn create(&mut self, entity: &RemoteEntity, report: &mut SyncReport) {
        let kind = entity.kind();
        let Some(slot) = self.free_slot(kind) else {
            let err = CoreError::SlotsExhausted {
                kind,
                remote_id: entity.id,
            };
            warn!(error = %err, "skipping remote entity");
            report.failed_allocations.push(entity.id);
            return;
        };

        let name = entity.display_name();
        let device = Device::tagged_switch(
            slot,
            name.clone(),
            IdentityTag::new(kind, entity.id),
            SwitchState::from(entity.enabled),
        );
        match self.store.create(device) {
            Ok(()) => {
                self.identity.bind(kind, entity.id, slot);
                info!(%kind, remote_id = entity.id, %slot, %name, "created device");
                report.created.push(slot);
            }
            Err(e) => {
                warn!(%kind, remote_id = entity.id, %slot, error = %e, "failed to create device");
                report.store_errors += 1;
            }
        }
    }

    fn rename_if_changed(&mut self, entity: &RemoteEntity, report: &mut SyncReport) {
        let kind = entity.kind();
        let Some(slot) = self.identity.lookup_slot(kind, entity.id) else {
            return;
        };
        let name = entity.display_name();
        let Some(device) = self.store.get(slot) else {
            return;
        };
        if device.name == name {
            return;
        }
        let old = device.name.clone();
        match self.store.update(slot, DeviceUpdate::rename(name.clone())) {
            Ok(()) => {
                info!(%kind, remote_id = entity.id, %slot, from = %old, to = %name, "renamed device");
                report.renamed.push(slot);
            }
            Err(e) => {
                warn!(%kind, remote_id = entity.id, %slot, error = %e, "failed to rename device");
                report.store_errors += 1;
            }
        }
    }

    /// Lowest slot in the kind's range with no device and no binding.
    fn free_slot(&self, kind: CollectionKind) -> Option<Slot> {
        kind.slot_range()
            .iter()
            .find(|slot| !self.store.contains(*slot) && self.identity.lookup_remote(kind, *slot).is_none())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceType, DeviceValue, LIST_SLOTS};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn list(value: serde_json::Value) -> RemoteEntity {
        RemoteEntity::from_list(serde_json::from_value(value).unwrap()).unwrap()
    }

    fn group(value: serde_json::Value) -> RemoteEntity {
        RemoteEntity::from_group(serde_json::from_value(value).unwrap()).unwrap()
    }

    fn ads() -> RemoteEntity {
        list(json!({ "id": 3, "comment": "Ads", "enabled": true, "groups": [0] }))
    }

    #[test]
    fn new_list_gets_first_slot() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);

        assert_eq!(report.created, vec![Slot::new(100)]);
        let device = store.get(Slot::new(100)).unwrap();
        assert_eq!(device.name, "List: Ads (Default)");
        assert_eq!(device.value, DeviceValue::new(1, "On"));
        assert_eq!(device.description, "ListID:3");
        assert_eq!(identity.lookup_slot(CollectionKind::List, 3), Some(Slot::new(100)));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        let remote = vec![ads(), list(json!({ "id": 9, "comment": "Malware", "groups": [] }))];
        Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &remote);
        let before = store.clone();

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &remote);
        assert_eq!(report.mutations(), 0);
        assert_eq!(store.slots(), before.slots());
        for slot in store.slots() {
            assert_eq!(store.get(slot), before.get(slot));
        }
    }

    #[test]
    fn many_new_entities_get_distinct_slots() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        let remote: Vec<_> = (1..=5)
            .map(|id| group(json!({ "id": id, "name": format!("g{id}") })))
            .collect();
        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::Group, &remote);

        let expected: Vec<Slot> = (200..205).map(Slot::new).collect();
        assert_eq!(report.created, expected);
    }

    #[test]
    fn removed_entity_deletes_and_unbinds() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[]);
        assert_eq!(report.removed, vec![Slot::new(100)]);
        assert!(store.is_empty());
        assert_eq!(identity.lookup_slot(CollectionKind::List, 3), None);
    }

    #[test]
    fn live_bindings_keep_their_slots() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        let a = list(json!({ "id": 1, "comment": "a" }));
        let b = list(json!({ "id": 2, "comment": "b" }));
        let c = list(json!({ "id": 3, "comment": "c" }));
        Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[a.clone(), b]);

        let report =
            Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[a, c]);
        assert_eq!(identity.lookup_slot(CollectionKind::List, 1), Some(Slot::new(100)));
        assert_eq!(report.removed, vec![Slot::new(101)]);
        assert_eq!(report.created, vec![Slot::new(101)]);
        assert_eq!(store.get(Slot::new(101)).unwrap().description, "ListID:3");
    }

    #[test]
    fn allocation_skips_occupied_slots() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        let squatter = Device::new(Slot::new(100), "manual", DeviceType::Switch, SwitchState::Off.into());
        store.create(squatter).unwrap();

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);
        assert_eq!(report.created, vec![Slot::new(101)]);
        assert_eq!(store.get(Slot::new(100)).unwrap().name, "manual");
    }

    #[test]
    fn exhausted_range_skips_entity() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        for slot in LIST_SLOTS.iter() {
            store
                .create(Device::new(slot, "full", DeviceType::Switch, SwitchState::Off.into()))
                .unwrap();
        }

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);
        assert_eq!(report.failed_allocations, vec![3]);
        assert!(report.created.is_empty());
        assert_eq!(identity.lookup_slot(CollectionKind::List, 3), None);
    }

    #[test]
    fn rename_only_when_name_changes() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);

        let renamed = list(json!({ "id": 3, "comment": "Ads", "enabled": true, "groups": [0, 1] }));
        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[renamed]);
        assert_eq!(report.renamed, vec![Slot::new(100)]);
        assert_eq!(store.get(Slot::new(100)).unwrap().name, "List: Ads (Default, Kids)");
    }

    #[test]
    fn sync_leaves_state_alone() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);

        let disabled = list(json!({ "id": 3, "comment": "Ads", "enabled": false, "groups": [0] }));
        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[disabled]);
        assert_eq!(report.mutations(), 0);
        assert_eq!(store.get(Slot::new(100)).unwrap().value, DeviceValue::new(1, "On"));
    }

    #[test]
    fn orphaned_binding_is_recreated() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        identity.bind(CollectionKind::List, 3, Slot::new(150));

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);
        assert_eq!(report.created, vec![Slot::new(100)]);
        assert_eq!(identity.lookup_slot(CollectionKind::List, 3), Some(Slot::new(100)));
    }

    #[test]
    fn other_kind_is_untouched() {
        let mut identity = IdentityMap::new();
        let mut store = MemoryStore::new();
        Reconciler::new(&mut identity, &mut store)
            .apply(CollectionKind::Group, &[group(json!({ "id": 0, "name": "Default" }))]);

        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[]);
        assert_eq!(report.mutations(), 0);
        assert!(store.contains(Slot::new(200)));
    }

    #[test]
    fn unpersisted_create_is_retried_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/devices.json");
        let mut identity = IdentityMap::new();
        let mut store = crate::store::FileStore::open(&path).unwrap();
        std::fs::write(dir.path().join("state"), "not a directory").unwrap();

        for _ in 0..3 {
            let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);
            assert_eq!(report.created, Vec::<Slot>::new());
            assert_eq!(report.store_errors, 1);
        }
        assert!(store.slots().is_empty());
        assert_eq!(identity.lookup_slot(CollectionKind::List, 3), None);

        std::fs::remove_file(dir.path().join("state")).unwrap();
        let report = Reconciler::new(&mut identity, &mut store).apply(CollectionKind::List, &[ads()]);
        assert_eq!(report.created, vec![Slot::new(100)]);
        assert_eq!(store.slots(), vec![Slot::new(100)]);
    }
}
