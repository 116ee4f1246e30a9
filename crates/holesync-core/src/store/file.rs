// JSON-file backed store. Every mutation is flushed before returning so a
// process restart sees exactly what the host saw. A mutation whose flush
// fails leaves the in-memory view untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DeviceStore, MemoryStore, StoreError};
use crate::model::{Device, DeviceUpdate, Slot};

#[derive(Serialize, Deserialize, Default)]
struct StoreFile {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => MemoryStore::new(),
            Ok(raw) => {
                let file: StoreFile = serde_json::from_str(&raw)?;
                MemoryStore::from_devices(file.devices)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), devices = inner.len(), "opened device store");
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.inner.devices()
    }

    /// Apply `mutate` to a staged copy, persist it, then commit.
    fn transact(
        &mut self,
        mutate: impl FnOnce(&mut MemoryStore) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut staged = self.inner.clone();
        mutate(&mut staged)?;
        self.flush(&staged)?;
        self.inner = staged;
        Ok(())
    }

    fn flush(&self, devices: &MemoryStore) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            devices: devices.devices().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DeviceStore for FileStore {
    fn get(&self, slot: Slot) -> Option<&Device> {
        self.inner.get(slot)
    }

    fn slots(&self) -> Vec<Slot> {
        self.inner.slots()
    }

    fn create(&mut self, device: Device) -> Result<(), StoreError> {
        self.transact(|staged| staged.create(device))
    }

    fn update(&mut self, slot: Slot, update: DeviceUpdate) -> Result<(), StoreError> {
        self.transact(|staged| staged.update(slot, update))
    }

    fn delete(&mut self, slot: Slot) -> Result<(), StoreError> {
        self.transact(|staged| staged.delete(slot))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CollectionKind, DeviceValue, IdentityTag, SwitchState};

    fn ads(slot: u32) -> Device {
        Device::tagged_switch(
            Slot::new(slot),
            "List: Ads",
            IdentityTag::new(CollectionKind::List, 3),
            SwitchState::On,
        )
    }

    /// Replace the store's directory with a regular file so flushes fail.
    fn break_parent(path: &Path) {
        let parent = path.parent().unwrap();
        if parent.exists() {
            fs::remove_dir_all(parent).unwrap();
        }
        fs::write(parent, "in the way").unwrap();
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("devices.json")).unwrap();
        assert!(store.slots().is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/devices.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            store
                .create(Device::tagged_switch(
                    Slot::new(100),
                    "List: Ads",
                    IdentityTag::new(CollectionKind::List, 3),
                    SwitchState::On,
                ))
                .unwrap();
            store
                .create(Device::tagged_switch(
                    Slot::new(101),
                    "List: Old",
                    IdentityTag::new(CollectionKind::List, 4),
                    SwitchState::Off,
                ))
                .unwrap();
            store.delete(Slot::new(101)).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.slots(), vec![Slot::new(100)]);
        let device = store.get(Slot::new(100)).unwrap();
        assert_eq!(device.description, "ListID:3");
        assert_eq!(device.name, "List: Ads");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn failed_create_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/devices.json");
        let mut store = FileStore::open(&path).unwrap();
        break_parent(&path);

        assert!(matches!(store.create(ads(100)), Err(StoreError::Io(_))));
        assert!(store.slots().is_empty());
        assert!(store.get(Slot::new(100)).is_none());
    }

    #[test]
    fn failed_update_and_delete_keep_previous_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/devices.json");
        let mut store = FileStore::open(&path).unwrap();
        store.create(ads(100)).unwrap();
        break_parent(&path);

        let off = DeviceUpdate::value(DeviceValue::new(0, "Off"));
        assert!(store.update(Slot::new(100), off).is_err());
        assert_eq!(store.get(Slot::new(100)).unwrap().value, DeviceValue::new(1, "On"));

        assert!(store.delete(Slot::new(100)).is_err());
        assert_eq!(store.slots(), vec![Slot::new(100)]);
    }
}
