use std::collections::BTreeMap;

use chrono::Utc;

use super::{DeviceStore, StoreError};
use crate::model::{Device, DeviceUpdate, Slot};

/// In-memory device store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    devices: BTreeMap<Slot, Device>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.slot, d)).collect(),
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceStore for MemoryStore {
    fn get(&self, slot: Slot) -> Option<&Device> {
        self.devices.get(&slot)
    }

    fn slots(&self) -> Vec<Slot> {
        self.devices.keys().copied().collect()
    }

    fn create(&mut self, device: Device) -> Result<(), StoreError> {
        if self.devices.contains_key(&device.slot) {
            return Err(StoreError::Occupied(device.slot));
        }
        self.devices.insert(device.slot, device);
        Ok(())
    }

    fn update(&mut self, slot: Slot, update: DeviceUpdate) -> Result<(), StoreError> {
        let device = self.devices.get_mut(&slot).ok_or(StoreError::Missing(slot))?;
        if let Some(name) = update.name {
            device.name = name;
        }
        if let Some(value) = update.value {
            device.value = value;
        }
        device.updated_at = Utc::now();
        Ok(())
    }

    fn delete(&mut self, slot: Slot) -> Result<(), StoreError> {
        self.devices
            .remove(&slot)
            .map(|_| ())
            .ok_or(StoreError::Missing(slot))
    }
}
