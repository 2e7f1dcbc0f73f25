//! RBAC type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::AuthzError;

/// Opaque actor identity issued by the identity provider
pub type UserId = Uuid;
/// Role primary key
pub type RoleId = i32;
/// Permission primary key
pub type PermissionId = i32;
/// Primary key of a row in one of the protected resource tables
pub type ResourceId = i64;

/// Name of the bypass role
pub const ADMIN_ROLE: &str = "admin";
/// Name of the role that, together with `admin`, makes an actor a manager
pub const MANAGER_ROLE: &str = "manager";

/// Protected resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tournaments,
    Players,
    Sessions,
    Scorecards,
    RatingClasses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Tournaments,
        ResourceKind::Players,
        ResourceKind::Sessions,
        ResourceKind::Scorecards,
        ResourceKind::RatingClasses,
    ];

    /// Table holding instances of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            ResourceKind::Tournaments => "tournaments",
            ResourceKind::Players => "players",
            ResourceKind::Sessions => "sessions",
            ResourceKind::Scorecards => "scorecards",
            ResourceKind::RatingClasses => "rating_classes",
        }
    }

    /// Column referencing the creating user, for kinds that have an owner
    pub fn owner_column(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Tournaments | ResourceKind::Sessions | ResourceKind::Scorecards => {
                Some("created_by")
            }
            ResourceKind::Players | ResourceKind::RatingClasses => None,
        }
    }

    pub fn has_owner(&self) -> bool {
        self.owner_column().is_some()
    }

    pub(crate) fn ordinal(&self) -> i32 {
        match self {
            ResourceKind::Tournaments => 0,
            ResourceKind::Players => 1,
            ResourceKind::Sessions => 2,
            ResourceKind::Scorecards => 3,
            ResourceKind::RatingClasses => 4,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for ResourceKind {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.table_name() == s)
            .ok_or_else(|| AuthzError::unknown_permission(s, "*"))
    }
}

/// Operations that can be attempted on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Read,
    Update,
    Delete,
    Submit,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Create,
        ActionKind::Read,
        ActionKind::Update,
        ActionKind::Delete,
        ActionKind::Submit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Read => "read",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::Submit => "submit",
        }
    }

    pub(crate) fn ordinal(&self) -> i32 {
        match self {
            ActionKind::Create => 0,
            ActionKind::Read => 1,
            ActionKind::Update => 2,
            ActionKind::Delete => 3,
            ActionKind::Submit => 4,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AuthzError::unknown_permission("*", s))
    }
}

/// Permission definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission id
    pub id: PermissionId,
    /// Permission name, `<resource>.<action>`
    pub name: String,
    /// Permission description
    pub description: Option<String>,
    /// Resource this permission applies to
    pub resource: ResourceKind,
    /// Action this permission allows
    pub action: ActionKind,
}

/// Role definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id
    pub id: RoleId,
    /// Role name, unique and case-sensitive
    pub name: String,
    /// Role description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A role together with the permissions it grants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// A role held by an actor and the permission ids it contributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: Role,
    pub permission_ids: Vec<PermissionId>,
}

/// Known principal, registered by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            display_name: None,
            registered_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Principal listing row for administrative UIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithRoles {
    pub user_id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Role names, sorted
    pub roles: Vec<String>,
}

/// Owner of a resource instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    User(UserId),
    NoOwner,
}

/// Why a decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    AdminBypass,
    RoleGrant,
    Ownership,
    MissingPermission,
    NotOwner,
    StoreUnavailable,
}

/// Permission check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCheck {
    /// Whether permission is granted
    pub granted: bool,
    /// What decided it
    pub reason: DecisionReason,
    /// Roles that granted the permission
    pub granted_by_roles: Vec<String>,
}

impl PermissionCheck {
    pub(crate) fn allow(reason: DecisionReason, roles: Vec<String>) -> Self {
        Self {
            granted: true,
            reason,
            granted_by_roles: roles,
        }
    }

    pub(crate) fn deny(reason: DecisionReason) -> Self {
        Self {
            granted: false,
            reason,
            granted_by_roles: Vec::new(),
        }
    }
}
