//! Folder find-or-create against an in-memory drive store.

mod common;

use common::{Calls, FakeGateway};
use share_table::error::DriveError;
use share_table::models::MIME_TYPE_FOLDER;
use share_table::Resolver;

fn resolver() -> Resolver<FakeGateway> {
    Resolver::new(FakeGateway::new().with_drive("TeamDrive", "drive-1"))
}

#[tokio::test]
async fn existing_folder_is_reused() {
    let resolver = resolver();
    let existing = resolver.gateway().add_folder("Reports", None, "drive-1");

    let id = resolver
        .ensure_folder("Reports", None, "drive-1", true)
        .await
        .unwrap();

    assert_eq!(id, existing);
    assert_eq!(resolver.gateway().calls().create, 0);
}

#[tokio::test]
async fn missing_folder_is_created_once() {
    let resolver = resolver();

    let id = resolver
        .ensure_folder("Reports", None, "drive-1", true)
        .await
        .unwrap();

    assert_eq!(resolver.gateway().calls().create, 1);
    let created = resolver.gateway().file(&id).unwrap();
    assert_eq!(created.name, "Reports");
    assert_eq!(created.parent, "drive-1");
    assert_eq!(created.mime_type.as_deref(), Some(MIME_TYPE_FOLDER));
}

#[tokio::test]
async fn no_reuse_creates_sibling() {
    let resolver = resolver();
    let existing = resolver.gateway().add_folder("Reports", None, "drive-1");

    let id = resolver
        .ensure_folder("Reports", None, "drive-1", false)
        .await
        .unwrap();

    assert_ne!(id, existing);
    assert_eq!(resolver.gateway().calls().create, 1);
    assert_eq!(resolver.gateway().children("drive-1", "Reports").len(), 2);

    // With two same-named siblings, reuse refuses to guess.
    let err = resolver
        .ensure_folder("Reports", None, "drive-1", true)
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::Ambiguous { count: 2, .. }));
}

#[tokio::test]
async fn missing_id_in_response_is_creation_error() {
    let resolver = Resolver::new(
        FakeGateway::new()
            .with_drive("TeamDrive", "drive-1")
            .with_empty_create_response(),
    );

    let err = resolver
        .ensure_folder("Reports", None, "drive-1", true)
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::CreationFailed(_)));
    assert!(err.to_string().contains("Reports"));
}

#[tokio::test]
async fn empty_chain_returns_initial_parent() {
    let resolver = resolver();
    let names: [&str; 0] = [];

    let root = resolver
        .ensure_folder_path(&names, "drive-1", None, true)
        .await
        .unwrap();
    assert_eq!(root, None);

    let parent = resolver
        .ensure_folder_path(&names, "drive-1", Some("folder-x".to_string()), true)
        .await
        .unwrap();
    assert_eq!(parent.as_deref(), Some("folder-x"));
    assert_eq!(resolver.gateway().calls(), Calls::default());
}

#[tokio::test]
async fn chain_threads_parents() {
    let resolver = resolver();
    let a = resolver.gateway().add_folder("a", None, "drive-1");

    let deepest = resolver
        .ensure_folder_path(&["a", "b", "c"], "drive-1", None, true)
        .await
        .unwrap()
        .unwrap();

    // "a" existed; "b" and "c" were created below it.
    assert_eq!(resolver.gateway().calls().create, 2);
    let c = resolver.gateway().file(&deepest).unwrap();
    assert_eq!(c.name, "c");
    let b = resolver.gateway().file(&c.parent).unwrap();
    assert_eq!(b.name, "b");
    assert_eq!(b.parent, a);
}

#[tokio::test]
async fn chain_is_idempotent_with_reuse() {
    let resolver = resolver();
    let first = resolver
        .ensure_folder_path(&["x", "y"], "drive-1", None, true)
        .await
        .unwrap();
    let second = resolver
        .ensure_folder_path(&["x", "y"], "drive-1", None, true)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.gateway().calls().create, 2);
}
