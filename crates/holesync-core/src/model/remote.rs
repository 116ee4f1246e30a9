// ── Remote entities ──
//
// One poll's worth of a remote collection entry. Never cached past a
// single reconciliation cycle.

use holesync_api::{GroupRecord, ListRecord};

use super::slot::{CollectionKind, RemoteId};

const UNNAMED_LIST: &str = "Unnamed List";
const UNNAMED_GROUP: &str = "Unnamed Group";

/// The raw record an entity was built from, kept for full-replace updates.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRecord {
    List(ListRecord),
    Group(GroupRecord),
}

/// A list or group as reported by the appliance.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntity {
    pub id: RemoteId,
    pub enabled: bool,
    pub record: RemoteRecord,
}

impl RemoteEntity {
    /// Wrap a list record. Records without an id cannot be mirrored.
    pub fn from_list(record: ListRecord) -> Option<Self> {
        Some(Self {
            id: record.id?,
            enabled: record.enabled,
            record: RemoteRecord::List(record),
        })
    }

    /// Wrap a group record. Records without an id cannot be mirrored.
    pub fn from_group(record: GroupRecord) -> Option<Self> {
        Some(Self {
            id: record.id?,
            enabled: record.enabled,
            record: RemoteRecord::Group(record),
        })
    }

    pub fn kind(&self) -> CollectionKind {
        match self.record {
            RemoteRecord::List(_) => CollectionKind::List,
            RemoteRecord::Group(_) => CollectionKind::Group,
        }
    }

    /// Device name for this entity.
    ///
    /// Lists: `List: <comment> (<groups>)`, or `List: <comment>` with no groups.
    /// Groups: `Group: <name>`.
    pub fn display_name(&self) -> String {
        match &self.record {
            RemoteRecord::List(list) => {
                let comment = list.comment.as_deref().unwrap_or(UNNAMED_LIST);
                if list.groups.is_empty() {
                    format!("List: {comment}")
                } else {
                    let groups: Vec<String> = list.groups.iter().copied().map(group_label).collect();
                    format!("List: {comment} ({})", groups.join(", "))
                }
            }
            RemoteRecord::Group(group) => {
                format!("Group: {}", group.name.as_deref().unwrap_or(UNNAMED_GROUP))
            }
        }
    }
}

/// Label for a group membership inside a list name.
pub fn group_label(id: RemoteId) -> String {
    match id {
        0 => "Default".into(),
        1 => "Kids".into(),
        other => format!("Group {other}"),
    }
}
