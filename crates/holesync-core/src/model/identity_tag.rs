// ── Identity tags ──
//
// The only durable link between a device and the remote entity it mirrors.
// Persisted in the device description as `ListID:<id>` / `GroupID:<id>`.
// Formatting and parsing live here and nowhere else.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::slot::{CollectionKind, RemoteId};

const LIST_PREFIX: &str = "ListID";
const GROUP_PREFIX: &str = "GroupID";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("no identity tag")]
    Empty,

    #[error("unknown tag prefix '{0}'")]
    UnknownPrefix(String),

    #[error("missing ':' separator")]
    MissingSeparator,

    #[error("invalid remote id '{0}'")]
    InvalidId(String),
}

/// `{kind, remote_id}` as persisted on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityTag {
    pub kind: CollectionKind,
    pub remote_id: RemoteId,
}

impl IdentityTag {
    pub const fn new(kind: CollectionKind, remote_id: RemoteId) -> Self {
        Self { kind, remote_id }
    }
}

impl fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            CollectionKind::List => LIST_PREFIX,
            CollectionKind::Group => GROUP_PREFIX,
        };
        write!(f, "{prefix}:{}", self.remote_id)
    }
}

impl FromStr for IdentityTag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TagError::Empty);
        }
        let (prefix, id) = s.split_once(':').ok_or(TagError::MissingSeparator)?;
        let kind = match prefix {
            LIST_PREFIX => CollectionKind::List,
            GROUP_PREFIX => CollectionKind::Group,
            other => return Err(TagError::UnknownPrefix(other.to_owned())),
        };
        let remote_id = id
            .trim()
            .parse()
            .map_err(|_| TagError::InvalidId(id.to_owned()))?;
        Ok(Self { kind, remote_id })
    }
}
