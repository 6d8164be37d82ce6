//! Permission levels granted by access rules.

use failure::Fail;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};

/// Level of access granted by an [access rule][crate::models::AccessRule].
///
/// Levels are totally ordered, and a rule granting a level also grants every
/// lower level: a group which can remove nodes can also create and read them.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// No access at all.
    None,
    /// Permission holder can view a node and its released content.
    Read,
    /// Permission holder can create new nodes and versions.
    Create,
    /// Permission holder can remove nodes.
    Remove,
    /// Permission holder can manage access rules and workflows.
    Admin,
}

impl Permission {
    /// All levels, in ascending order.
    pub const ALL: [Permission; 5] = [
        Permission::None,
        Permission::Read,
        Permission::Create,
        Permission::Remove,
        Permission::Admin,
    ];

    /// Integer under which this level is stored.
    pub fn value(self) -> i32 {
        match self {
            Permission::None => 0,
            Permission::Read => 1,
            Permission::Create => 2,
            Permission::Remove => 3,
            Permission::Admin => 4,
        }
    }

    /// Does this level include `required`?
    #[inline]
    pub fn satisfies(self, required: Permission) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::None => "none",
            Permission::Read => "read",
            Permission::Create => "create",
            Permission::Remove => "remove",
            Permission::Admin => "admin",
        }
    }
}

impl TryFrom<i32> for Permission {
    type Error = InvalidPermissionValue;

    /// Stored values outside the canonical five are a data-integrity error and
    /// are never rounded to a nearby level.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Permission::None),
            1 => Ok(Permission::Read),
            2 => Ok(Permission::Create),
            3 => Ok(Permission::Remove),
            4 => Ok(Permission::Admin),
            _ => Err(InvalidPermissionValue(value)),
        }
    }
}

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL.iter()
            .cloned()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

#[derive(Debug, Eq, Fail, PartialEq)]
#[fail(display = "Invalid stored permission level: {}", _0)]
pub struct InvalidPermissionValue(pub i32);

#[derive(Debug, Fail)]
#[fail(display = "Unknown permission level: {:?}", _0)]
pub struct ParsePermissionError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(Permission::Admin.satisfies(Permission::Remove));
        assert!(Permission::Create.satisfies(Permission::Read));
        assert!(Permission::Read.satisfies(Permission::Read));
        assert!(!Permission::Read.satisfies(Permission::Create));
        assert!(Permission::None.satisfies(Permission::None));
    }

    #[test]
    fn stored_values() {
        for &level in Permission::ALL.iter() {
            assert_eq!(Permission::try_from(level.value()), Ok(level));
        }

        assert_eq!(Permission::try_from(5), Err(InvalidPermissionValue(5)));
        assert_eq!(Permission::try_from(-1), Err(InvalidPermissionValue(-1)));
    }

    #[test]
    fn parse() {
        assert_eq!("remove".parse::<Permission>().unwrap(), Permission::Remove);
        assert!("write".parse::<Permission>().is_err());
    }
}
