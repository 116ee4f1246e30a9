// ── Domain model ──

pub mod device;
pub mod identity_tag;
pub mod remote;
pub mod slot;
pub mod stats;

pub use device::{Device, DeviceType, DeviceUpdate, DeviceValue, SwitchState};
pub use identity_tag::{IdentityTag, TagError};
pub use remote::{RemoteEntity, RemoteRecord, group_label};
pub use slot::{
    CollectionKind, GROUP_SLOTS, LIST_SLOTS, RemoteId, STATISTICS_SLOTS, Slot, SlotRange,
};
pub use stats::StatMetric;
