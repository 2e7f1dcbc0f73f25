use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    /// Permission ID, fixed by the catalog
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// Permission name, `<resource>.<action>`
    pub name: String,

    /// Permission description
    pub description: Option<String>,

    /// Resource kind, as its table name
    pub resource: String,

    /// Action kind
    pub action: String,
}

/// Permission entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Roles granting this permission
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermission,
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert a catalog permission to an active model
    pub fn from_domain_permission(permission: &crate::auth::rbac::Permission) -> ActiveModel {
        ActiveModel {
            id: Set(permission.id),
            name: Set(permission.name.clone()),
            description: Set(permission.description.clone()),
            resource: Set(permission.resource.to_string()),
            action: Set(permission.action.to_string()),
        }
    }
}
