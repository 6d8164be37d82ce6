use failure::Fail;
use serde::Serialize;

use crate::{
    ApiError,
    store::{Admin, Store, StoreError},
};
use super::UserId;

/// Identifier of a group.
///
/// ID `0` is reserved: it names the [`Group::Everyone`] group, and when used
/// as a version's workflow group it means the version was released.
pub type GroupId = i32;

/// ID of the [`Group::Everyone`] group.
pub const EVERYONE: GroupId = 0;

/// Group of users.
///
/// Besides groups kept in the store there are two virtual groups, which are
/// never stored and never have members added or removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Group {
    /// All users, including anonymous ones.
    Everyone,
    /// Terminal pseudo-group of every workflow. A version held by it has
    /// completed its workflow and is readable by everyone. No user is
    /// a member.
    ReadOnly,
    /// A group kept in the store.
    Stored(StoredGroup),
}

/// A group kept in the store.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StoredGroup {
    pub id: GroupId,
    pub name: String,
}

/// A subset of group's data that can safely be publicly exposed.
#[derive(Clone, Debug, Serialize)]
pub struct PublicData {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    /// Resolve a group ID found in stored data.
    ///
    /// ID `0` resolves to [`Group::Everyone`]; the read-only group is never
    /// referenced by ID and can't be produced here.
    pub fn resolve<S>(store: &S, id: GroupId) -> Result<Group, StoreError>
    where
        S: Store + ?Sized,
    {
        if id == EVERYONE {
            Ok(Group::Everyone)
        } else {
            store.group(id).map(Group::Stored)
        }
    }

    pub fn id(&self) -> GroupId {
        match *self {
            Group::Everyone | Group::ReadOnly => EVERYONE,
            Group::Stored(ref group) => group.id,
        }
    }

    pub fn name(&self) -> &str {
        match *self {
            Group::Everyone => "Everyone",
            Group::ReadOnly => "Read-only",
            Group::Stored(ref group) => &group.name,
        }
    }

    pub fn is_everyone(&self) -> bool {
        matches!(*self, Group::Everyone)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(*self, Group::ReadOnly)
    }

    /// Check whether a user belongs to this group.
    ///
    /// Anonymous users are members only of [`Group::Everyone`].
    pub fn has_member<S>(&self, store: &S, user: Option<UserId>)
    -> Result<bool, StoreError>
    where
        S: Store + ?Sized,
    {
        match (self, user) {
            (Group::Everyone, _) => Ok(true),
            (Group::ReadOnly, _) => Ok(false),
            (Group::Stored(_), None) => Ok(false),
            (Group::Stored(group), Some(user)) => store.is_member(group.id, user),
        }
    }

    /// Get list of all members of this group.
    ///
    /// Membership of [`Group::Everyone`] is open-ended and can't be listed.
    pub fn members<S>(&self, store: &S) -> Result<Vec<UserId>, GroupError>
    where
        S: Store + ?Sized,
    {
        match *self {
            Group::Everyone => Err(GroupError::NotEnumerable),
            Group::ReadOnly => Ok(Vec::new()),
            Group::Stored(ref group) => Ok(store.members(group.id)?),
        }
    }

    /// Add a user to this group.
    pub fn join<S>(&self, store: &S, user: UserId) -> Result<(), GroupError>
    where
        S: Admin + ?Sized,
    {
        match *self {
            Group::Stored(ref group) => Ok(store.add_member(group.id, user)?),
            _ => Err(GroupError::Virtual("join")),
        }
    }

    /// Remove a user from this group.
    pub fn leave<S>(&self, store: &S, user: UserId) -> Result<(), GroupError>
    where
        S: Admin + ?Sized,
    {
        match *self {
            Group::Stored(ref group) => Ok(store.remove_member(group.id, user)?),
            _ => Err(GroupError::Virtual("leave")),
        }
    }

    /// Change this group's name.
    pub fn set_name<S>(&mut self, store: &S, name: &str) -> Result<(), GroupError>
    where
        S: Admin + ?Sized,
    {
        match *self {
            Group::Stored(ref mut group) => {
                store.rename_group(group.id, name)?;
                group.name = name.to_string();
                Ok(())
            }
            _ => Err(GroupError::Virtual("rename")),
        }
    }

    /// Delete this group.
    ///
    /// Access rules naming this group and its positions in workflows are
    /// deleted with it.
    pub fn delete<S>(self, store: &S) -> Result<(), GroupError>
    where
        S: Admin + ?Sized,
    {
        match self {
            Group::Stored(group) => Ok(store.delete_group(group.id)?),
            _ => Err(GroupError::Virtual("delete")),
        }
    }

    /// Get public portion of this group's data.
    pub fn get_public(&self) -> PublicData {
        PublicData {
            id: self.id(),
            name: self.name().to_string(),
        }
    }
}

#[derive(ApiError, Debug, Fail)]
pub enum GroupError {
    /// Virtual groups have no stored membership.
    #[fail(display = "Cannot {} a virtual group", _0)]
    #[api(code = "group:virtual", status = "BAD_REQUEST")]
    Virtual(&'static str),
    /// Members of everyone can't be listed.
    #[fail(display = "Members of this group cannot be enumerated")]
    #[api(code = "group:not-enumerable", status = "BAD_REQUEST")]
    NotEnumerable,
    #[fail(display = "{}", _0)]
    Store(#[cause] StoreError),
}

impl_from! { for GroupError ;
    StoreError => |e| GroupError::Store(e),
}
