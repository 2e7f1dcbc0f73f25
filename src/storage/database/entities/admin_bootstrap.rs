use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-row record of the latest bootstrap admin grant
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_bootstrap")]
pub struct Model {
    /// Always [`MARKER_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// Principal that received `admin`
    pub user_id: Uuid,

    /// Bootstrap timestamp
    pub created_at: DateTimeWithTimeZone,
}

/// The only valid record row id
pub const MARKER_ID: i32 = 1;

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
