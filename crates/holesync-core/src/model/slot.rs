// ── Slot layout ──
//
// Slots are the host's numeric device addresses. Each collection kind owns
// a disjoint range; statistics sit below both.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A local device address as understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(u32);

impl Slot {
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Slot {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// Remote-assigned entity id, unique within its collection.
pub type RemoteId = i64;

/// Half-open slot range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    start: u32,
    end: u32,
}

impl SlotRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn start(self) -> Slot {
        Slot(self.start)
    }

    pub const fn contains(self, slot: Slot) -> bool {
        slot.0 >= self.start && slot.0 < self.end
    }

    /// Every slot in the range, lowest first.
    pub fn iter(self) -> impl Iterator<Item = Slot> {
        (self.start..self.end).map(Slot)
    }
}

/// Statistics devices occupy the low slots `1..=10`.
pub const STATISTICS_SLOTS: SlotRange = SlotRange::new(1, 11);
/// List devices: `100..200`.
pub const LIST_SLOTS: SlotRange = SlotRange::new(100, 200);
/// Group devices: `200..`, no fixed upper bound.
pub const GROUP_SLOTS: SlotRange = SlotRange::new(200, u32::MAX);

/// The two appliance-managed collections mirrored as devices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
    List,
    Group,
}

impl CollectionKind {
    /// The reserved slot range for this kind.
    pub const fn slot_range(self) -> SlotRange {
        match self {
            Self::List => LIST_SLOTS,
            Self::Group => GROUP_SLOTS,
        }
    }

    /// Which collection owns `slot`, if any.
    pub fn for_slot(slot: Slot) -> Option<Self> {
        if LIST_SLOTS.contains(slot) {
            Some(Self::List)
        } else if GROUP_SLOTS.contains(slot) {
            Some(Self::Group)
        } else {
            None
        }
    }
}
