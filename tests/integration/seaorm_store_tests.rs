//! SeaORM policy store tests
//!
//! Exercise the durable tables directly through the `PolicyStore` trait.

use crate::common::{PrincipalFactory, TestDatabase};
use scorecard_authz::auth::rbac::PermissionCatalog;
use scorecard_authz::{AuthzError, PolicyStore};
use uuid::Uuid;

async fn seeded() -> TestDatabase {
    let db = TestDatabase::new().await;
    db.db()
        .seed_permissions(PermissionCatalog::new().list())
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let db = TestDatabase::new().await;
    db.db().migrate().await.unwrap();
    db.db().health_check().await.unwrap();
}

#[tokio::test]
async fn test_seed_permissions_twice() {
    let db = seeded().await;
    let store = db.db();
    store
        .seed_permissions(PermissionCatalog::new().list())
        .await
        .unwrap();

    let role = store.insert_role("scorer", None).await.unwrap();
    for permission in PermissionCatalog::new().list() {
        store.grant_permission(role.id, permission.id).await.unwrap();
    }
    let grants = store.list_role_grants().await.unwrap();
    assert_eq!(grants[0].permission_ids.len(), 25);
}

#[tokio::test]
async fn test_role_crud() {
    let db = seeded().await;
    let store = db.db();

    let created = store
        .insert_role("scorer", Some("Keeps score".to_string()))
        .await
        .unwrap();
    assert_eq!(
        store.find_role(created.id).await.unwrap(),
        Some(created.clone())
    );
    assert_eq!(
        store.find_role_by_name("scorer").await.unwrap().map(|r| r.id),
        Some(created.id)
    );

    let updated = store
        .update_role(created.id, "head-scorer", None)
        .await
        .unwrap();
    assert_eq!(updated.name, "head-scorer");
    assert_eq!(updated.description, None);
    assert!(store.find_role_by_name("scorer").await.unwrap().is_none());

    let deleted = store.delete_role(created.id, true).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(store.list_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_role_name() {
    let db = seeded().await;
    let store = db.db();
    store.insert_role("scorer", None).await.unwrap();

    let err = store.insert_role("scorer", None).await.unwrap_err();
    assert!(matches!(err, AuthzError::DuplicateName(name) if name == "scorer"));

    let judge = store.insert_role("judge", None).await.unwrap();
    let err = store.update_role(judge.id, "scorer", None).await.unwrap_err();
    assert!(matches!(err, AuthzError::DuplicateName(_)));
}

#[tokio::test]
async fn test_missing_role() {
    let db = seeded().await;
    let store = db.db();

    let err = store.update_role(99, "ghost", None).await.unwrap_err();
    assert!(matches!(err, AuthzError::RoleNotFound(_)));

    let err = store.delete_role(99, true).await.unwrap_err();
    assert!(matches!(err, AuthzError::RoleNotFound(_)));

    let err = store.assign_role(Uuid::new_v4(), 99).await.unwrap_err();
    assert!(matches!(err, AuthzError::RoleNotFound(_)));

    // Removing from a role that does not exist is a no-op
    store.remove_role(Uuid::new_v4(), 99, true).await.unwrap();
}

#[tokio::test]
async fn test_grant_and_revoke_are_idempotent() {
    let db = seeded().await;
    let store = db.db();
    let role = store.insert_role("scorer", None).await.unwrap();

    store.grant_permission(role.id, 3).await.unwrap();
    store.grant_permission(role.id, 3).await.unwrap();
    store.grant_permission(role.id, 1).await.unwrap();
    let grants = store.list_role_grants().await.unwrap();
    assert_eq!(grants[0].permission_ids, vec![1, 3]);

    store.revoke_permission(role.id, 3).await.unwrap();
    store.revoke_permission(role.id, 3).await.unwrap();
    let grants = store.list_role_grants().await.unwrap();
    assert_eq!(grants[0].permission_ids, vec![1]);

    let err = store.grant_permission(role.id, 0).await.unwrap_err();
    assert!(matches!(err, AuthzError::UnknownPermission { .. }));
}

#[tokio::test]
async fn test_grants_for_user() {
    let db = seeded().await;
    let store = db.db();
    let scorer = store.insert_role("scorer", None).await.unwrap();
    let judge = store.insert_role("judge", None).await.unwrap();
    store.grant_permission(scorer.id, 20).await.unwrap();
    store.grant_permission(judge.id, 5).await.unwrap();

    let user = Uuid::new_v4();
    store.assign_role(user, scorer.id).await.unwrap();
    store.assign_role(user, judge.id).await.unwrap();
    store.assign_role(user, judge.id).await.unwrap();

    let grants = store.grants_for_user(user).await.unwrap();
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0].role.name, "scorer");
    assert_eq!(grants[0].permission_ids, vec![20]);
    assert_eq!(grants[1].role.name, "judge");
    assert_eq!(grants[1].permission_ids, vec![5]);

    assert!(store.grants_for_user(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_role_cascade() {
    let db = seeded().await;
    let store = db.db();
    let role = store.insert_role("scorer", None).await.unwrap();
    store.grant_permission(role.id, 2).await.unwrap();
    let user = Uuid::new_v4();
    store.assign_role(user, role.id).await.unwrap();

    let err = store.delete_role(role.id, false).await.unwrap_err();
    assert!(matches!(err, AuthzError::RoleInUse(_)));
    assert_eq!(store.grants_for_user(user).await.unwrap().len(), 1);

    store.delete_role(role.id, true).await.unwrap();
    assert!(store.grants_for_user(user).await.unwrap().is_empty());

    // The name is free again and starts without grants
    let again = store.insert_role("scorer", None).await.unwrap();
    let grants = store.list_role_grants().await.unwrap();
    let again = grants.iter().find(|g| g.role.id == again.id).unwrap();
    assert!(again.permission_ids.is_empty());
}

#[tokio::test]
async fn test_remove_last_holder() {
    let db = seeded().await;
    let store = db.db();
    let admin = store.insert_role("admin", None).await.unwrap();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    store.assign_role(alice, admin.id).await.unwrap();

    let err = store.remove_role(alice, admin.id, true).await.unwrap_err();
    assert!(matches!(err, AuthzError::ProtectedRole(_)));

    // Not holding it is not an error, even when guarded
    store.remove_role(bob, admin.id, true).await.unwrap();

    store.assign_role(bob, admin.id).await.unwrap();
    store.remove_role(alice, admin.id, true).await.unwrap();
    store.remove_role(bob, admin.id, false).await.unwrap();
    assert!(store.list_users_with_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_principal_directory() {
    let db = seeded().await;
    let store = db.db();
    let role = store.insert_role("scorer", None).await.unwrap();

    let principal = PrincipalFactory::create();
    store.upsert_principal(principal.clone()).await.unwrap();
    let refreshed = principal.clone().with_display_name("Renamed");
    store.upsert_principal(refreshed).await.unwrap();

    let stranger = Uuid::new_v4();
    store.assign_role(stranger, role.id).await.unwrap();

    let users = store.list_users_with_roles().await.unwrap();
    assert_eq!(users.len(), 2);

    let listed = users
        .iter()
        .find(|u| u.user_id == principal.user_id)
        .unwrap();
    assert_eq!(listed.display_name.as_deref(), Some("Renamed"));
    assert_eq!(listed.email, principal.email);
    assert!(listed.roles.is_empty());

    let listed = users.iter().find(|u| u.user_id == stranger).unwrap();
    assert_eq!(listed.email, None);
    assert_eq!(listed.roles, vec!["scorer"]);
}

#[tokio::test]
async fn test_bootstrap_admin_once() {
    let db = seeded().await;
    let store = db.db();
    let admin = store.insert_role("admin", None).await.unwrap();

    // Nobody registered yet
    assert_eq!(store.bootstrap_admin(admin.id, None).await.unwrap(), None);

    let principals = PrincipalFactory::registered_in_order(3);
    for principal in principals.iter().rev() {
        store.upsert_principal(principal.clone()).await.unwrap();
    }

    let granted = store.bootstrap_admin(admin.id, None).await.unwrap();
    assert_eq!(granted, Some(principals[0].user_id));
    assert_eq!(store.bootstrap_admin(admin.id, None).await.unwrap(), None);
    assert_eq!(
        store
            .bootstrap_admin(admin.id, Some(principals[1].user_id))
            .await
            .unwrap(),
        None
    );

    let admins: Vec<_> = store
        .list_users_with_roles()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.roles.iter().any(|r| r == "admin"))
        .map(|u| u.user_id)
        .collect();
    assert_eq!(admins, vec![principals[0].user_id]);
}

#[tokio::test]
async fn test_bootstrap_prefers_configured_candidate() {
    let db = seeded().await;
    let store = db.db();
    let admin = store.insert_role("admin", None).await.unwrap();
    store
        .upsert_principal(PrincipalFactory::create())
        .await
        .unwrap();

    let configured = Uuid::new_v4();
    let granted = store
        .bootstrap_admin(admin.id, Some(configured))
        .await
        .unwrap();
    assert_eq!(granted, Some(configured));
}

#[tokio::test]
async fn test_bootstrap_skipped_when_admin_exists() {
    let db = seeded().await;
    let store = db.db();
    let admin = store.insert_role("admin", None).await.unwrap();
    store.assign_role(Uuid::new_v4(), admin.id).await.unwrap();

    let granted = store
        .bootstrap_admin(admin.id, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(granted, None);
}

#[tokio::test]
async fn test_bootstrap_again_once_admin_role_is_empty() {
    let db = seeded().await;
    let store = db.db();
    let admin = store.insert_role("admin", None).await.unwrap();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(
        store.bootstrap_admin(admin.id, Some(first)).await.unwrap(),
        Some(first)
    );
    assert_eq!(store.last_bootstrap().await.unwrap().unwrap().user_id, first);

    store.remove_role(first, admin.id, false).await.unwrap();
    assert_eq!(
        store.bootstrap_admin(admin.id, Some(second)).await.unwrap(),
        Some(second)
    );
    assert_eq!(store.last_bootstrap().await.unwrap().unwrap().user_id, second);
}
