//! Test database utilities
//!
//! Provides in-memory SQLite database for testing without external dependencies.
//! Each test gets an isolated database instance using SeaORM; concurrency
//! tests share a temporary database file between several pools.

use scorecard_authz::config::{DatabaseConfig, RbacConfig};
use scorecard_authz::storage::StorageLayer;
use scorecard_authz::storage::database::{Database, SeaOrmOwnershipResolver};
use scorecard_authz::{RbacSystem, ResourceId, ResourceKind, UserId};
use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Alias, ColumnDef, Query, Table};
use std::path::Path;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<Database>,
}

impl TestDatabase {
    /// Create a new migrated in-memory test database
    ///
    /// Each call creates a completely isolated database instance.
    pub async fn new() -> Self {
        let db = Self::connect(&test_db_config()).await;
        db.inner
            .migrate()
            .await
            .expect("Failed to run database migrations");
        db
    }

    /// Open a connection pool without migrating, e.g. a second process on
    /// a shared database file
    pub async fn connect(config: &DatabaseConfig) -> Self {
        let db = Database::new(config)
            .await
            .expect("Failed to connect to test database");

        Self {
            inner: Arc::new(db),
        }
    }

    /// Create and migrate a database file in `dir`, returning its config
    pub async fn create_file(dir: &Path) -> DatabaseConfig {
        let config = file_db_config(&dir.join("authz.db"));
        Self::connect(&config)
            .await
            .db()
            .migrate()
            .await
            .expect("Failed to run database migrations");
        config
    }

    /// Get reference to the underlying database
    pub fn db(&self) -> &Database {
        &self.inner
    }

    /// Storage layer over this database
    pub fn storage(&self) -> StorageLayer {
        StorageLayer {
            policy: self.inner.clone(),
            owners: Arc::new(SeaOrmOwnershipResolver::new(
                self.inner.connection().clone(),
            )),
        }
    }

    /// RBAC system over this database
    pub async fn rbac(&self, config: &RbacConfig) -> RbacSystem {
        RbacSystem::with_storage(config, &self.storage())
            .await
            .expect("Failed to initialize RBAC system")
    }

    /// Create the application table of a resource kind, the way the
    /// scorecard service lays it out
    pub async fn create_resource_table(&self, kind: ResourceKind) {
        let mut table = Table::create();
        table
            .table(Alias::new(kind.table_name()))
            .if_not_exists()
            .col(
                ColumnDef::new(Alias::new("id"))
                    .big_integer()
                    .not_null()
                    .primary_key(),
            );
        if let Some(column) = kind.owner_column() {
            table.col(ColumnDef::new(Alias::new(column)).uuid().null());
        }

        let conn = self.inner.connection();
        conn.execute(conn.get_database_backend().build(&table))
            .await
            .expect("Failed to create resource table");
    }

    /// Insert a resource row with an optional creator
    pub async fn insert_resource(&self, kind: ResourceKind, id: ResourceId, owner: Option<UserId>) {
        let mut insert = Query::insert();
        insert.into_table(Alias::new(kind.table_name()));
        match kind.owner_column() {
            Some(column) => {
                insert
                    .columns([Alias::new("id"), Alias::new(column)])
                    .values_panic([id.into(), owner.into()]);
            }
            None => {
                insert.columns([Alias::new("id")]).values_panic([id.into()]);
            }
        }

        let conn = self.inner.connection();
        conn.execute(conn.get_database_backend().build(&insert))
            .await
            .expect("Failed to insert resource row");
    }
}

/// Config for a file-backed SQLite database shared by several pools
pub fn file_db_config(path: &Path) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 2,
        connection_timeout: 5,
        enabled: true,
    }
}

/// Helper to create a simple test database config
pub fn test_db_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1, // In-memory DB only supports 1 connection
        connection_timeout: 5,
        enabled: true,
    }
}
