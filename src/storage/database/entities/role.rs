use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    /// Role ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Role name (unique, case-sensitive)
    #[sea_orm(unique)]
    pub name: String,

    /// Role description
    pub description: Option<String>,

    /// Role creation timestamp
    pub created_at: DateTimeWithTimeZone,
}

/// Role entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Permissions granted by this role
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermission,
    /// Principals holding this role
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermission.def()
    }
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain role
    pub fn to_domain_role(&self) -> crate::auth::rbac::Role {
        crate::auth::rbac::Role {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at.with_timezone(&chrono::Utc),
        }
    }
}
