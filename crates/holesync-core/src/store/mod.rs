// ── Host device store ──
//
// The host controller's device model, reduced to the primitives the sync
// engine needs. Slots are the keys; the description field carries the
// identity tag for list and group devices.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

use crate::model::{Device, DeviceUpdate, Slot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slot {0} is already occupied")]
    Occupied(Slot),

    #[error("slot {0} does not exist")]
    Missing(Slot),

    #[error("device store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Create/update/delete primitives over slot-addressed devices.
///
/// Every successful mutation is a user-visible event on the host, so
/// callers are expected to suppress no-op writes themselves.
pub trait DeviceStore {
    fn get(&self, slot: Slot) -> Option<&Device>;

    /// All occupied slots, ascending.
    fn slots(&self) -> Vec<Slot>;

    fn contains(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    fn create(&mut self, device: Device) -> Result<(), StoreError>;

    fn update(&mut self, slot: Slot, update: DeviceUpdate) -> Result<(), StoreError>;

    fn delete(&mut self, slot: Slot) -> Result<(), StoreError>;
}
