//! Authorization decisions over a real database

use crate::common::{PrincipalFactory, TestDatabase};
use scorecard_authz::config::{PermissionCacheConfig, RbacConfig};
use scorecard_authz::{
    ADMIN_ROLE, ActionKind, AuthzError, DecisionReason, MANAGER_ROLE, RbacSystem, ResourceKind,
};
use uuid::Uuid;

async fn grant(rbac: &RbacSystem, role: &str, resource: ResourceKind, action: ActionKind) {
    let role = rbac.get_role_by_name(role).await.unwrap().unwrap();
    let permission = rbac.catalog().resolve(resource, action).unwrap().id;
    rbac.assign_permission(role.id, permission).await.unwrap();
}

#[tokio::test]
async fn test_startup_seeds_built_in_roles_once() {
    let db = TestDatabase::new().await;
    db.rbac(&RbacConfig::default()).await;
    let rbac = db.rbac(&RbacConfig::default()).await;

    let names: Vec<String> = rbac
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec![ADMIN_ROLE, MANAGER_ROLE]);
}

#[tokio::test]
async fn test_manager_scenario() {
    let db = TestDatabase::new().await;
    let rbac = db.rbac(&RbacConfig::default()).await;
    grant(&rbac, MANAGER_ROLE, ResourceKind::Players, ActionKind::Update).await;

    let u1 = Uuid::new_v4();
    rbac.assign_role_to_user(u1, MANAGER_ROLE).await.unwrap();

    assert!(
        rbac.has_permission(u1, ResourceKind::Players, ActionKind::Update)
            .await
    );
    assert!(
        !rbac
            .has_permission(u1, ResourceKind::Tournaments, ActionKind::Delete)
            .await
    );
    assert!(rbac.is_manager(u1).await);
    assert!(!rbac.is_admin(u1).await);
}

#[tokio::test]
async fn test_session_owner_without_roles() {
    let db = TestDatabase::new().await;
    db.create_resource_table(ResourceKind::Sessions).await;
    let owner = Uuid::new_v4();
    db.insert_resource(ResourceKind::Sessions, 7, Some(owner))
        .await;
    db.insert_resource(ResourceKind::Sessions, 8, None).await;
    let rbac = db.rbac(&RbacConfig::default()).await;

    assert!(rbac.is_owner(owner, ResourceKind::Sessions, 7).await);
    assert!(
        rbac.can_access_resource(owner, ResourceKind::Sessions, 7, ActionKind::Read)
            .await
    );
    assert!(
        rbac.can_access_resource(owner, ResourceKind::Sessions, 7, ActionKind::Submit)
            .await
    );
    assert!(
        !rbac
            .can_access_resource(owner, ResourceKind::Sessions, 7, ActionKind::Delete)
            .await
    );

    // Creator unknown, or no such row
    assert!(!rbac.is_owner(owner, ResourceKind::Sessions, 8).await);
    assert!(!rbac.is_owner(owner, ResourceKind::Sessions, 9).await);
    let check = rbac
        .check_resource_access_detailed(owner, ResourceKind::Sessions, 9, ActionKind::Read)
        .await;
    assert_eq!(check.reason, DecisionReason::NotOwner);
}

#[tokio::test]
async fn test_missing_resource_table_fails_closed() {
    let db = TestDatabase::new().await;
    let rbac = db.rbac(&RbacConfig::default()).await;
    let actor = Uuid::new_v4();

    // The application never created its scorecards table
    let check = rbac
        .check_resource_access_detailed(actor, ResourceKind::Scorecards, 1, ActionKind::Read)
        .await;
    assert!(!check.granted);
    assert_eq!(check.reason, DecisionReason::StoreUnavailable);
    assert!(!rbac.is_owner(actor, ResourceKind::Scorecards, 1).await);
}

#[tokio::test]
async fn test_unowned_kinds_never_grant_by_ownership() {
    let db = TestDatabase::new().await;
    db.create_resource_table(ResourceKind::RatingClasses).await;
    db.insert_resource(ResourceKind::RatingClasses, 1, None)
        .await;
    let rbac = db.rbac(&RbacConfig::default()).await;

    let actor = Uuid::new_v4();
    assert!(!rbac.is_owner(actor, ResourceKind::RatingClasses, 1).await);
    assert!(
        !rbac
            .can_access_resource(actor, ResourceKind::RatingClasses, 1, ActionKind::Read)
            .await
    );
}

#[tokio::test]
async fn test_first_registered_principal_becomes_admin() {
    let db = TestDatabase::new().await;
    let rbac = db.rbac(&RbacConfig::default()).await;

    let principals = PrincipalFactory::registered_in_order(2);
    for principal in principals.iter().rev() {
        rbac.register_principal(principal.clone()).await.unwrap();
    }

    let (a, b) = tokio::join!(rbac.ensure_admin_exists(), rbac.ensure_admin_exists());
    let granted: Vec<_> = [a.unwrap(), b.unwrap()].into_iter().flatten().collect();
    assert_eq!(granted, vec![principals[0].user_id]);

    let first = principals[0].user_id;
    assert!(rbac.is_admin(first).await);
    for resource in ResourceKind::ALL {
        for action in ActionKind::ALL {
            assert!(rbac.has_permission(first, resource, action).await);
        }
    }
    assert!(!rbac.is_admin(principals[1].user_id).await);
}

#[tokio::test]
async fn test_second_process_does_not_bootstrap_again() {
    let db = TestDatabase::new().await;
    let first = Uuid::new_v4();
    let config = RbacConfig {
        bootstrap_admin: Some(first),
        ..Default::default()
    };
    let rbac = db.rbac(&config).await;
    assert!(rbac.is_admin(first).await);

    // Another instance starting later with a different bootstrap actor
    let second = Uuid::new_v4();
    let other = db
        .rbac(&RbacConfig {
            bootstrap_admin: Some(second),
            ..Default::default()
        })
        .await;
    assert!(!other.is_admin(second).await);
    assert!(other.is_admin(first).await);
}

#[tokio::test]
async fn test_last_admin_is_protected() {
    let db = TestDatabase::new().await;
    let admin = Uuid::new_v4();
    let rbac = db
        .rbac(&RbacConfig {
            bootstrap_admin: Some(admin),
            ..Default::default()
        })
        .await;

    let err = rbac
        .remove_role_from_user(admin, ADMIN_ROLE)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::ProtectedRole(_)));

    let admin_role = rbac.get_role_by_name(ADMIN_ROLE).await.unwrap().unwrap();
    let err = rbac.delete_role(admin_role.id).await.unwrap_err();
    assert!(matches!(err, AuthzError::ProtectedRole(_)));
}

#[tokio::test]
async fn test_role_lifecycle_with_cache() {
    let db = TestDatabase::new().await;
    let rbac = db
        .rbac(&RbacConfig {
            cache: PermissionCacheConfig {
                enabled: true,
                ttl_seconds: 60,
                max_entries: 100,
            },
            ..Default::default()
        })
        .await;

    let scorer = rbac
        .create_role("scorer", Some("Keeps score".to_string()))
        .await
        .unwrap();
    grant(&rbac, "scorer", ResourceKind::Scorecards, ActionKind::Submit).await;

    let actor = Uuid::new_v4();
    assert!(
        !rbac
            .has_permission(actor, ResourceKind::Scorecards, ActionKind::Submit)
            .await
    );

    rbac.assign_role_to_user(actor, "scorer").await.unwrap();
    let check = rbac
        .check_permission_detailed(actor, ResourceKind::Scorecards, ActionKind::Submit)
        .await;
    assert!(check.granted);
    assert_eq!(check.granted_by_roles, vec!["scorer"]);

    rbac.update_role(scorer, "scorekeeper", None).await.unwrap();
    let check = rbac
        .check_permission_detailed(actor, ResourceKind::Scorecards, ActionKind::Submit)
        .await;
    assert_eq!(check.granted_by_roles, vec!["scorekeeper"]);

    rbac.delete_role(scorer).await.unwrap();
    assert!(
        !rbac
            .has_permission(actor, ResourceKind::Scorecards, ActionKind::Submit)
            .await
    );
    assert!(rbac.user_roles(actor).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_roles_with_permissions() {
    let db = TestDatabase::new().await;
    let rbac = db.rbac(&RbacConfig::default()).await;
    grant(&rbac, MANAGER_ROLE, ResourceKind::Tournaments, ActionKind::Update).await;
    grant(&rbac, MANAGER_ROLE, ResourceKind::Players, ActionKind::Create).await;

    let listed = rbac.list_roles_with_permissions().await.unwrap();
    let manager = listed
        .iter()
        .find(|g| g.role.name == MANAGER_ROLE)
        .unwrap();
    let names: Vec<&str> = manager
        .permissions
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["players.create", "tournaments.update"]);
}
