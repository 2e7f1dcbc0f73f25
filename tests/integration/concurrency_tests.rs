//! Several processes sharing one database file
//!
//! Each task opens its own connection pool, the way separate service
//! instances would.

use crate::common::{PrincipalFactory, TestDatabase};
use futures::future::join_all;
use scorecard_authz::config::{DatabaseConfig, RbacConfig};
use scorecard_authz::{
    ADMIN_ROLE, ActionKind, MANAGER_ROLE, PolicyStore, RbacSystem, ResourceKind,
};
use tempfile::TempDir;
use uuid::Uuid;

const INSTANCES: usize = 4;

async fn start_instances(config: &DatabaseConfig) -> Vec<RbacSystem> {
    let tasks = (0..INSTANCES).map(|_| {
        let config = config.clone();
        tokio::spawn(async move {
            let db = TestDatabase::connect(&config).await;
            RbacSystem::with_storage(&RbacConfig::default(), &db.storage()).await
        })
    });

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_startups_grant_one_admin() {
    for _ in 0..5 {
        let dir = TempDir::new().unwrap();
        let config = TestDatabase::create_file(dir.path()).await;

        let setup = TestDatabase::connect(&config).await;
        let setup = setup.rbac(&RbacConfig::default()).await;
        let principals = PrincipalFactory::registered_in_order(3);
        for principal in principals.iter().rev() {
            setup.register_principal(principal.clone()).await.unwrap();
        }

        let instances = start_instances(&config).await;
        let granted: Vec<_> = instances
            .iter()
            .filter_map(RbacSystem::startup_admin)
            .collect();
        assert_eq!(granted, vec![principals[0].user_id]);

        let admins: Vec<_> = instances[0]
            .list_users_with_roles()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.roles.iter().any(|r| r == ADMIN_ROLE))
            .map(|u| u.user_id)
            .collect();
        assert_eq!(admins, vec![principals[0].user_id]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admin_writes_all_land() {
    let dir = TempDir::new().unwrap();
    let config = TestDatabase::create_file(dir.path()).await;
    let instances = start_instances(&config).await;

    let manager = instances[0]
        .get_role_by_name(MANAGER_ROLE)
        .await
        .unwrap()
        .unwrap()
        .id;
    let users: Vec<Uuid> = (0..INSTANCES).map(|_| Uuid::new_v4()).collect();

    let writes = instances.iter().zip(&users).enumerate().map(|(i, (rbac, user))| {
        let rbac = rbac.clone();
        let user = *user;
        let resource = ResourceKind::ALL[i % ResourceKind::ALL.len()];
        tokio::spawn(async move {
            let permission = rbac.catalog().resolve(resource, ActionKind::Update)?.id;
            rbac.assign_permission(manager, permission).await?;
            rbac.assign_role_to_user(user, MANAGER_ROLE).await?;
            rbac.remove_permission(manager, permission).await?;
            rbac.assign_permission(manager, permission).await
        })
    });
    for joined in join_all(writes).await {
        joined.unwrap().unwrap();
    }

    for (i, user) in users.iter().enumerate() {
        let resource = ResourceKind::ALL[i % ResourceKind::ALL.len()];
        assert!(
            instances[0]
                .has_permission(*user, resource, ActionKind::Update)
                .await
        );
    }

    // Removals from several instances at once leave nobody behind
    let removals = instances.iter().zip(&users).map(|(rbac, user)| {
        let rbac = rbac.clone();
        let user = *user;
        tokio::spawn(async move { rbac.remove_role_from_user(user, MANAGER_ROLE).await })
    });
    for joined in join_all(removals).await {
        joined.unwrap().unwrap();
    }
    for user in &users {
        assert!(instances[0].user_roles(*user).await.unwrap().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bootstrap_calls_share_one_file() {
    let dir = TempDir::new().unwrap();
    let config = TestDatabase::create_file(dir.path()).await;
    let setup = TestDatabase::connect(&config).await;
    let admin = setup.db().insert_role(ADMIN_ROLE, None).await.unwrap().id;
    let principals = PrincipalFactory::registered_in_order(3);
    for principal in &principals {
        setup.db().upsert_principal(principal.clone()).await.unwrap();
    }

    let tasks = (0..INSTANCES).map(|_| {
        let config = config.clone();
        tokio::spawn(async move {
            let db = TestDatabase::connect(&config).await;
            db.db().bootstrap_admin(admin, None).await
        })
    });
    let granted: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .filter_map(|joined| joined.unwrap().unwrap())
        .collect();
    assert_eq!(granted, vec![principals[0].user_id]);
}
