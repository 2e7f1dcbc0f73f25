//! Configuration loading tests

use scorecard_authz::{ActionKind, Config, RbacSystem};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_rbac_from_config_file() {
    let file = write_config(
        r#"
rbac:
  bootstrap_admin: "0b6c2d8e-1f3a-4b5c-9d7e-2a4c6e8f0a1b"
  ownership_actions: [read]
storage:
  database:
    url: "sqlite::memory:"
    max_connections: 1
    enabled: true
"#,
    );

    let config = Config::from_file(file.path()).await.unwrap();
    let rbac = RbacSystem::from_config(&config).await.unwrap();

    let admin = config.rbac().bootstrap_admin.unwrap();
    assert!(rbac.is_admin(admin).await);
    assert_eq!(rbac.config().ownership_actions, vec![ActionKind::Read]);
}

#[tokio::test]
async fn test_ownership_cannot_grant_delete() {
    let file = write_config(
        r#"
rbac:
  ownership_actions: [read, delete]
"#,
    );

    assert!(Config::from_file(file.path()).await.is_err());
}

#[tokio::test]
async fn test_rejects_bad_database_url() {
    let file = write_config(
        r#"
storage:
  database:
    url: "mysql://localhost/authz"
    enabled: true
"#,
    );

    assert!(Config::from_file(file.path()).await.is_err());
}

#[tokio::test]
async fn test_defaults_use_memory_storage() {
    let file = write_config("{}\n");
    let config = Config::from_file(file.path()).await.unwrap();
    assert!(!config.storage().database.enabled);

    let rbac = RbacSystem::from_config(&config).await.unwrap();
    assert_eq!(rbac.list_roles().await.unwrap().len(), 2);
}
