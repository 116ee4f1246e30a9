//! Sync engine between Pi-hole lists/groups and slot-addressed host devices.
//!
//! - **[`Controller`]**: owns one appliance's client, identity map, and
//!   device store. [`start()`](Controller::start) prepares local state and
//!   runs the first pass; [`run()`](Controller::run) serves the heartbeat
//!   and inbound commands on a single task.
//!
//! - **[`Reconciler`]**: diffs a remote collection against the
//!   [`IdentityMap`] and creates, removes, or renames devices.
//!
//! - **[`StateProjector`]**: writes statistics and enabled state into
//!   devices, skipping writes that would not change anything.
//!
//! - **[`CommandRouter`]**: turns an on/off command on a slot into a
//!   full-replace update of the remote entity behind it.
//!
//! - **[`DeviceStore`]**: the host's device model. [`MemoryStore`] and the
//!   JSON-backed [`FileStore`] are provided.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod model;
pub mod projector;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandOutcome, CommandParseError, CommandRouter, DeviceCommand};
pub use config::{SyncConfig, TlsVerification};
pub use controller::{CommandEnvelope, Controller, ControllerHandle, CycleReport};
pub use error::CoreError;
pub use identity::IdentityMap;
pub use projector::{RefreshReport, StateProjector, ensure_statistics};
pub use reconcile::{Reconciler, SyncReport, fetch_collection};
pub use store::{DeviceStore, FileStore, MemoryStore, StoreError};

pub use model::{
    CollectionKind, Device, DeviceType, DeviceUpdate, DeviceValue, IdentityTag, RemoteEntity,
    RemoteId, Slot, StatMetric, SwitchState,
};
