//! Driver Identity
//!
//! Drivers are identified by (group, name). The group enumeration is declared
//! in bring-up order: sorting resources by group yields the sequence in which
//! an object's resources are started.

pub mod manifest;
pub mod registry;

pub use manifest::*;
pub use registry::*;

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Driver Group
// =============================================================================

/// Resource driver groups, in bring-up order
///
/// The declaration order is meaningful: an ip must be up before the volume
/// it serves, the volume before the disk consumers, and so on. Stop actions
/// walk the same order in reverse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DriverGroup {
    Ip,
    Volume,
    Disk,
    Fs,
    Share,
    Container,
    App,
    Sync,
    Task,
}

impl DriverGroup {
    /// All groups, in bring-up order
    pub const ALL: [DriverGroup; 9] = [
        DriverGroup::Ip,
        DriverGroup::Volume,
        DriverGroup::Disk,
        DriverGroup::Fs,
        DriverGroup::Share,
        DriverGroup::Container,
        DriverGroup::App,
        DriverGroup::Sync,
        DriverGroup::Task,
    ];

    /// Position in the bring-up sequence
    #[inline]
    pub fn order(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverGroup::Ip => "ip",
            DriverGroup::Volume => "volume",
            DriverGroup::Disk => "disk",
            DriverGroup::Fs => "fs",
            DriverGroup::Share => "share",
            DriverGroup::Container => "container",
            DriverGroup::App => "app",
            DriverGroup::Sync => "sync",
            DriverGroup::Task => "task",
        }
    }
}

impl std::fmt::Display for DriverGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriverGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(DriverGroup::Ip),
            "volume" => Ok(DriverGroup::Volume),
            "disk" => Ok(DriverGroup::Disk),
            "fs" => Ok(DriverGroup::Fs),
            "share" => Ok(DriverGroup::Share),
            "container" => Ok(DriverGroup::Container),
            "app" => Ok(DriverGroup::App),
            "sync" => Ok(DriverGroup::Sync),
            "task" => Ok(DriverGroup::Task),
            _ => Err(Error::UnknownDriverGroup {
                group: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Driver ID
// =============================================================================

/// Identity of one registered driver implementation
///
/// An empty name is the group-default entry: it answers lookups for any
/// name in the group that was never individually registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId {
    pub group: DriverGroup,
    pub name: String,
}

impl DriverId {
    pub fn new(group: DriverGroup, name: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
        }
    }

    /// The group-default entry for a group
    pub fn generic(group: DriverGroup) -> Self {
        Self {
            group,
            name: String::new(),
        }
    }

    pub fn is_generic(&self) -> bool {
        self.name.is_empty()
    }

    /// The group-default entry this id falls back to on lookup miss
    pub fn generic_id(&self) -> DriverId {
        DriverId::generic(self.group)
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.group)
        } else {
            write!(f, "{}.{}", self.group, self.name)
        }
    }
}

impl FromStr for DriverId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((group, name)) => Ok(Self::new(group.parse::<DriverGroup>()?, name)),
            None => Ok(Self::generic(s.parse::<DriverGroup>()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_group_order() {
        assert!(DriverGroup::Ip.order() < DriverGroup::Volume.order());
        assert!(DriverGroup::Fs.order() < DriverGroup::App.order());
        assert!(DriverGroup::Sync.order() < DriverGroup::Task.order());
    }

    #[test]
    fn test_group_parse_roundtrip() {
        for group in DriverGroup::ALL {
            assert_eq!(group.as_str().parse::<DriverGroup>().unwrap(), group);
        }
    }

    #[test]
    fn test_group_parse_unknown() {
        let err = "bogus".parse::<DriverGroup>().unwrap_err();
        assert_matches!(err, Error::UnknownDriverGroup { group } if group == "bogus");
    }

    #[test]
    fn test_driver_id_display_parse() {
        let id = DriverId::new(DriverGroup::Fs, "flag");
        assert_eq!(id.to_string(), "fs.flag");
        assert_eq!("fs.flag".parse::<DriverId>().unwrap(), id);

        let generic = DriverId::generic(DriverGroup::Volume);
        assert!(generic.is_generic());
        assert_eq!(generic.to_string(), "volume");
        assert_eq!("volume".parse::<DriverId>().unwrap(), generic);
    }

    #[test]
    fn test_generic_fallback_id() {
        let id = DriverId::new(DriverGroup::Volume, "anything");
        assert_eq!(id.generic_id(), DriverId::generic(DriverGroup::Volume));
    }
}
