// ── Command routing ──
//
// Host-originated on/off commands, addressed to a slot, forwarded to the
// appliance as full-replace updates.

use std::str::FromStr;

use holesync_api::PiholeClient;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::identity::IdentityMap;
use crate::model::{CollectionKind, RemoteId, RemoteRecord, Slot, SwitchState};
use crate::projector::write_value;
use crate::reconcile::fetch_collection;
use crate::store::DeviceStore;

/// A command event as the host delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    pub slot: Slot,
    pub command: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("invalid slot '{0}'")]
    InvalidSlot(String),

    #[error("missing command after slot {0}")]
    MissingCommand(u32),
}

impl DeviceCommand {
    pub fn new(slot: Slot, command: impl Into<String>) -> Self {
        Self {
            slot,
            command: command.into(),
            level: 0,
        }
    }

    /// The on/off intent, if the command string names one.
    pub fn switch_state(&self) -> Option<SwitchState> {
        self.command.trim().parse().ok()
    }
}

/// Parses `<slot> <command...> [level]`.
///
/// The command may span several words; a trailing integer is the level.
impl FromStr for DeviceCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let slot_raw = parts.remove(0);
        let slot: u32 = slot_raw
            .parse()
            .map_err(|_| CommandParseError::InvalidSlot(slot_raw.to_owned()))?;

        let level = match parts.split_last() {
            Some((last, rest)) if !rest.is_empty() => last.parse::<i32>().ok(),
            _ => None,
        };
        if level.is_some() {
            parts.pop();
        }
        if parts.is_empty() {
            return Err(CommandParseError::MissingCommand(slot));
        }
        Ok(Self {
            slot: Slot::new(slot),
            command: parts.join(" "),
            level: level.unwrap_or(0),
        })
    }
}

/// What happened to a routed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The appliance accepted the change and the slot now shows it.
    Applied {
        kind: CollectionKind,
        remote_id: RemoteId,
        state: SwitchState,
    },
    /// The slot is not bound to any remote entity.
    Stale,
    /// The command string was not an on/off command.
    Ignored,
}

pub struct CommandRouter<'a, S> {
    client: &'a PiholeClient,
    identity: &'a IdentityMap,
    store: &'a mut S,
}

impl<'a, S: DeviceStore> CommandRouter<'a, S> {
    pub fn new(client: &'a PiholeClient, identity: &'a IdentityMap, store: &'a mut S) -> Self {
        Self {
            client,
            identity,
            store,
        }
    }

    /// Route a raw host command. Unknown command strings are dropped.
    pub async fn dispatch(&mut self, command: &DeviceCommand) -> Result<CommandOutcome, CoreError> {
        let Some(state) = command.switch_state() else {
            warn!(slot = %command.slot, command = %command.command, "ignoring unsupported command");
            return Ok(CommandOutcome::Ignored);
        };
        self.handle(command.slot, state).await
    }

    /// Apply `state` to whatever remote entity `slot` mirrors.
    ///
    /// The local value changes only after the appliance accepts the update.
    pub async fn handle(&mut self, slot: Slot, state: SwitchState) -> Result<CommandOutcome, CoreError> {
        let Some(kind) = CollectionKind::for_slot(slot) else {
            debug!(%slot, "command for a slot outside list and group ranges");
            return Ok(CommandOutcome::Stale);
        };
        let Some(remote_id) = self.identity.lookup_remote(kind, slot) else {
            info!(%slot, %kind, "discarding command for unbound slot");
            return Ok(CommandOutcome::Stale);
        };

        let entity = fetch_collection(self.client, kind)
            .await?
            .into_iter()
            .find(|e| e.id == remote_id)
            .ok_or(CoreError::NotFound { kind, remote_id })?;

        match &entity.record {
            RemoteRecord::List(list) => self.client.update_list(list, state.is_on()).await?,
            RemoteRecord::Group(group) => self.client.update_group(group, state.is_on()).await?,
        }
        info!(%slot, %kind, remote_id, %state, "applied command");

        write_value(&mut *self.store, slot, state.into())?;
        Ok(CommandOutcome::Applied {
            kind,
            remote_id,
            state,
        })
    }
}
