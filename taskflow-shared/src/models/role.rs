/// Named roles and role sets
///
/// Roles are stored as text in the `user_roles` table and checked with plain
/// set membership. No role implies another: an `admin` is not automatically a
/// `manager`, and rules that accept both list both.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_roles (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role VARCHAR(32) NOT NULL,
///     granted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, role)
/// );
/// ```
///
/// # Example
///
/// ```
/// use taskflow_shared::models::role::{Role, RoleSet};
///
/// let roles: RoleSet = [Role::Manager].into_iter().collect();
/// assert!(roles.has_any(&[Role::Admin, Role::Manager]));
/// assert!(!roles.has(Role::Admin));
/// ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named role held by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Full control over teams and role assignment
    Admin,
    /// May create teams
    Manager,
    /// May manage team membership
    TeamAdmin,
    /// Ordinary user
    Regular,
}

impl Role {
    /// Every role, in storage order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::TeamAdmin, Role::Regular];

    /// Returns the storage name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::TeamAdmin => "team-admin",
            Role::Regular => "regular",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "team-admin" => Ok(Role::TeamAdmin),
            "regular" => Ok(Role::Regular),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The set of roles a user holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True if at least one of `roles` is held
    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.0.contains(role))
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Builds a set from stored role names, skipping names that are not roles
    ///
    /// Unknown names are logged rather than rejected so a stale row in
    /// `user_roles` cannot lock a user out.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = RoleSet::new();
        for name in names {
            match name.as_ref().parse::<Role>() {
                Ok(role) => {
                    set.insert(role);
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring stored role"),
            }
        }
        set
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        RoleSet(iter.into_iter().collect())
    }
}
