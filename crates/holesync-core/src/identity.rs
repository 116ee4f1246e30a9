// ── Identity map ──
//
// Bidirectional remote id <-> slot bookkeeping, one table per collection.
// Rebuilt from persisted identity tags at startup, then mutated only by
// the reconciler. No I/O.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CollectionKind, IdentityTag, RemoteId, Slot, TagError};
use crate::store::DeviceStore;

#[derive(Debug, Default, Clone)]
struct Table {
    by_remote: BTreeMap<RemoteId, Slot>,
    by_slot: HashMap<Slot, RemoteId>,
}

#[derive(Debug, Default, Clone)]
pub struct IdentityMap {
    lists: Table,
    groups: Table,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from every persisted slot's identity tag.
    ///
    /// Unparsable tags, tags whose kind does not own the slot's range, and
    /// second claims on an already bound remote id are skipped and logged.
    pub fn rebuild(store: &impl DeviceStore) -> Self {
        let mut map = Self::new();
        for slot in store.slots() {
            let Some(kind) = CollectionKind::for_slot(slot) else {
                continue;
            };
            let Some(device) = store.get(slot) else {
                continue;
            };
            match map.claim(kind, slot, &device.description) {
                Ok(remote_id) => debug!(%slot, %kind, remote_id, "recovered binding"),
                Err(e) => warn!(error = %e, "skipping device during identity rebuild"),
            }
        }
        map
    }

    fn claim(
        &mut self,
        kind: CollectionKind,
        slot: Slot,
        description: &str,
    ) -> Result<RemoteId, CoreError> {
        let mapping = |reason: String| CoreError::Mapping { slot, reason };
        let tag: IdentityTag = description.parse().map_err(|e: TagError| mapping(e.to_string()))?;
        if tag.kind != kind {
            return Err(mapping(format!("{} tag in {kind} slot range", tag.kind)));
        }
        if let Some(existing) = self.lookup_slot(kind, tag.remote_id) {
            return Err(mapping(format!(
                "{kind} {} already bound to slot {existing}",
                tag.remote_id
            )));
        }
        self.bind(kind, tag.remote_id, slot);
        Ok(tag.remote_id)
    }

    fn table(&self, kind: CollectionKind) -> &Table {
        match kind {
            CollectionKind::List => &self.lists,
            CollectionKind::Group => &self.groups,
        }
    }

    fn table_mut(&mut self, kind: CollectionKind) -> &mut Table {
        match kind {
            CollectionKind::List => &mut self.lists,
            CollectionKind::Group => &mut self.groups,
        }
    }

    pub fn lookup_slot(&self, kind: CollectionKind, remote_id: RemoteId) -> Option<Slot> {
        self.table(kind).by_remote.get(&remote_id).copied()
    }

    pub fn lookup_remote(&self, kind: CollectionKind, slot: Slot) -> Option<RemoteId> {
        self.table(kind).by_slot.get(&slot).copied()
    }

    /// Bind `remote_id` to `slot`, replacing any previous binding of either.
    pub fn bind(&mut self, kind: CollectionKind, remote_id: RemoteId, slot: Slot) {
        let table = self.table_mut(kind);
        if let Some(old_slot) = table.by_remote.insert(remote_id, slot) {
            table.by_slot.remove(&old_slot);
        }
        if let Some(old_remote) = table
            .by_slot
            .insert(slot, remote_id)
            .filter(|old| *old != remote_id)
        {
            table.by_remote.remove(&old_remote);
        }
    }

    /// Drop the binding for `remote_id`, returning the slot it held.
    pub fn unbind(&mut self, kind: CollectionKind, remote_id: RemoteId) -> Option<Slot> {
        let table = self.table_mut(kind);
        let slot = table.by_remote.remove(&remote_id)?;
        table.by_slot.remove(&slot);
        Some(slot)
    }

    /// Bound remote ids for `kind`, ascending.
    pub fn remote_ids(&self, kind: CollectionKind) -> BTreeSet<RemoteId> {
        self.table(kind).by_remote.keys().copied().collect()
    }

    /// `(remote_id, slot)` pairs for `kind`, by remote id.
    pub fn bindings(&self, kind: CollectionKind) -> impl Iterator<Item = (RemoteId, Slot)> + '_ {
        self.table(kind).by_remote.iter().map(|(id, slot)| (*id, *slot))
    }

    /// Bound slots for `kind`, ascending.
    pub fn bound_slots(&self, kind: CollectionKind) -> BTreeSet<Slot> {
        self.table(kind).by_slot.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lists.by_remote.len() + self.groups.by_remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
