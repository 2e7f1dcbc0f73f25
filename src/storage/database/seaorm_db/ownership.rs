use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::debug;
use uuid::Uuid;

use crate::auth::rbac::{Owner, OwnershipResolver, ResourceId, ResourceKind};
use crate::utils::error::{AuthzError, Result};

/// Owner lookup against the application's resource tables
///
/// Reads the creator column of the instance row; the tables themselves
/// belong to the application and are not migrated here.
#[derive(Debug, Clone)]
pub struct SeaOrmOwnershipResolver {
    db: DatabaseConnection,
}

impl SeaOrmOwnershipResolver {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OwnershipResolver for SeaOrmOwnershipResolver {
    async fn owner_of(&self, kind: ResourceKind, id: ResourceId) -> Result<Owner> {
        let Some(column) = kind.owner_column() else {
            return Ok(Owner::NoOwner);
        };

        let query = Query::select()
            .column(Alias::new(column))
            .from(Alias::new(kind.table_name()))
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .to_owned();
        let statement = self.db.get_database_backend().build(&query);

        let Some(row) = self
            .db
            .query_one(statement)
            .await
            .map_err(AuthzError::Database)?
        else {
            debug!("{} {} does not exist", kind, id);
            return Ok(Owner::NoOwner);
        };

        let owner: Option<Uuid> = row.try_get("", column).map_err(AuthzError::Database)?;
        Ok(owner.map_or(Owner::NoOwner, Owner::User))
    }
}
