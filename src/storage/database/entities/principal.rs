use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Known principal database model
///
/// Principals are issued by the identity provider; this table only mirrors
/// what the role administration UI needs to show.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "principals")]
pub struct Model {
    /// Identity provider user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Email address (optional)
    pub email: Option<String>,

    /// Display name (optional)
    pub display_name: Option<String>,

    /// First registration timestamp
    pub registered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert a domain principal to an active model
    pub fn from_domain_principal(principal: &crate::auth::rbac::Principal) -> ActiveModel {
        ActiveModel {
            user_id: Set(principal.user_id),
            email: Set(principal.email.clone()),
            display_name: Set(principal.display_name.clone()),
            registered_at: Set(principal.registered_at.into()),
        }
    }
}
