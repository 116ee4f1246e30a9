// ── Local device types ──
//
// The host's view of a device: a slot, a name, a numeric/text value pair,
// and a free-form description that carries the identity tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::identity_tag::{IdentityTag, TagError};
use super::slot::Slot;

/// How the host renders a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceType {
    /// Two-state on/off switch.
    Switch,
    /// Free-form counter with a unit label.
    Counter { unit: String },
    /// Percentage gauge.
    Percentage,
}

/// The numeric + text value pair a device displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceValue {
    pub n_value: i64,
    pub s_value: String,
}

impl DeviceValue {
    pub fn new(n_value: i64, s_value: impl Into<String>) -> Self {
        Self {
            n_value,
            s_value: s_value.into(),
        }
    }

    /// A text-only reading (counters and gauges keep `n_value` at 0).
    pub fn text(s_value: impl Into<String>) -> Self {
        Self::new(0, s_value)
    }
}

impl From<SwitchState> for DeviceValue {
    fn from(state: SwitchState) -> Self {
        Self::new(state.n_value(), state.to_string())
    }
}

/// Binary on/off state. `1 <=> "On"`, `0 <=> "Off"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub const fn n_value(self) -> i64 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for SwitchState {
    fn from(enabled: bool) -> Self {
        if enabled { Self::On } else { Self::Off }
    }
}

/// A device as held by the host store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub slot: Slot,
    pub name: String,
    pub device_type: DeviceType,
    #[serde(flatten)]
    pub value: DeviceValue,
    /// Free-form text; carries the identity tag for list/group devices.
    #[serde(default)]
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn new(slot: Slot, name: impl Into<String>, device_type: DeviceType, value: DeviceValue) -> Self {
        Self {
            slot,
            name: name.into(),
            device_type,
            value,
            description: String::new(),
            updated_at: Utc::now(),
        }
    }

    /// A switch device tagged with the remote entity it mirrors.
    pub fn tagged_switch(slot: Slot, name: impl Into<String>, tag: IdentityTag, state: SwitchState) -> Self {
        let mut device = Self::new(slot, name, DeviceType::Switch, state.into());
        device.description = tag.to_string();
        device
    }

    /// Parse the identity tag out of the description.
    pub fn identity_tag(&self) -> Result<IdentityTag, TagError> {
        self.description.parse()
    }
}

/// A partial device mutation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub value: Option<DeviceValue>,
}

impl DeviceUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
        }
    }

    pub fn value(value: DeviceValue) -> Self {
        Self {
            name: None,
            value: Some(value),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CollectionKind;

    #[test]
    fn switch_state_values_stay_consistent() {
        let on = DeviceValue::from(SwitchState::On);
        let off = DeviceValue::from(SwitchState::Off);
        assert_eq!(on, DeviceValue::new(1, "On"));
        assert_eq!(off, DeviceValue::new(0, "Off"));
    }

    #[test]
    fn switch_state_parses_case_insensitively() {
        assert_eq!("on".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("OFF".parse::<SwitchState>().unwrap(), SwitchState::Off);
        assert!("Toggle".parse::<SwitchState>().is_err());
    }

    #[test]
    fn tagged_switch_carries_tag_in_description() {
        let device = Device::tagged_switch(
            Slot::new(100),
            "List: Ads",
            IdentityTag::new(CollectionKind::List, 3),
            SwitchState::On,
        );
        assert_eq!(device.description, "ListID:3");
        assert_eq!(
            device.identity_tag().unwrap(),
            IdentityTag::new(CollectionKind::List, 3)
        );
        assert_eq!(device.value, DeviceValue::new(1, "On"));
    }
}
