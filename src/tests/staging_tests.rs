use super::common::{create_test_client, user};
use crate::{
    GecosError, NodePath, Resource, ResourceId, ResourceType, SaveOptions, StageKey,
    StagedOutcome,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

#[tokio::test]
async fn test_save_all_updates_and_resolves_waiter() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("PUT"))
        .and(path("/api/users/u1/"))
        .and(body_partial_json(json!({"name": "jdoe", "email": "jdoe@example.org"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "u1", "name": "jdoe"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let handle = console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::default())
        .unwrap();
    assert_eq!(handle.key(), &StageKey::Remote(ResourceId::from("u1")));
    assert!(console.staging.contains(&ResourceId::from("u1")));

    let report = console.staging.save_all().await;
    assert!(report.is_success());
    assert_eq!(report.saved, vec![StageKey::Remote(ResourceId::from("u1"))]);
    assert!(console.staging.is_empty());

    match handle.outcome().await {
        StagedOutcome::Saved(body) => assert_eq!(body["name"], "jdoe"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_save_all_empties_buffer_on_partial_failure() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("PUT"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "u1"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u2/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Duplicated name"))
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let first = console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::default())
        .unwrap();
    let second = console
        .staging
        .add(user("u2", "asmith"), SaveOptions::default())
        .unwrap();

    let report = console.staging.save_all().await;
    assert!(!report.is_success());
    assert_eq!(report.saved.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, StageKey::Remote(ResourceId::from("u2")));
    assert_eq!(report.failed[0].status, Some(500));
    assert!(report.failed[0].message.contains("Duplicated name"));
    assert!(console.staging.is_empty());

    assert!(matches!(first.outcome().await, StagedOutcome::Saved(_)));
    assert!(matches!(second.outcome().await, StagedOutcome::Failed(f) if f.status == Some(500)));
}

#[tokio::test]
async fn test_staging_deleted_resource_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);
    let mut console = client.console();

    let deletion = console
        .staging
        .add(user("X", "jdoe"), SaveOptions::destroy())
        .unwrap();
    assert!(console.staging.is_marked_for_deletion(&ResourceId::from("X")));

    let err = console
        .staging
        .add(user("X", "jdoe"), SaveOptions::default())
        .unwrap_err();
    assert!(matches!(err, GecosError::StagedForDeletion { ref id } if id == "X"));
    assert!(err.is_suppressed());
    assert!(
        console
            .staging
            .add(user("X", "jdoe"), SaveOptions::destroy())
            .is_err()
    );

    assert_eq!(console.staging.len(), 1);
    let entry = console
        .staging
        .entry(&StageKey::Remote(ResourceId::from("X")))
        .unwrap();
    assert!(entry.marked_for_deletion);
    drop(deletion);
}

#[tokio::test]
async fn test_restaging_replaces_entry_in_place() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("PUT"))
        .and(path("/api/users/u1/"))
        .and(query_param("apply", "1"))
        .and(body_partial_json(json!({"name": "john.doe"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "u1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let first = console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::default())
        .unwrap();
    let second = console
        .staging
        .add(
            user("u1", "john.doe"),
            SaveOptions::default().with_argument("apply", "1"),
        )
        .unwrap();

    assert_eq!(console.staging.len(), 1);
    let entry = console
        .staging
        .entry(&StageKey::Remote(ResourceId::from("u1")))
        .unwrap();
    assert_eq!(entry.model.name, "john.doe");
    assert_eq!(entry.pending_arguments, vec![("apply".to_string(), "1".to_string())]);

    let report = console.staging.save_all().await;
    assert_eq!(report.saved.len(), 1);
    assert!(matches!(first.outcome().await, StagedOutcome::Saved(_)));
    assert!(matches!(second.outcome().await, StagedOutcome::Saved(_)));
}

#[tokio::test]
async fn test_new_resources_are_posted_in_order() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("POST"))
        .and(path("/api/ous/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "new-ou"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let models = vec![
        Resource::new(ResourceType::Ou, "Sales", NodePath::root()),
        Resource::new(ResourceType::Ou, "IT", NodePath::root()),
    ];
    let handles: Vec<_> = console
        .staging
        .add_many(models, SaveOptions::default())
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        console.staging.staged_keys(),
        vec![StageKey::Local(1), StageKey::Local(2)]
    );
    // Unsaved resources are never matched by id.
    assert!(!console.staging.contains(&ResourceId::from("new-ou")));

    let report = console.staging.save_all().await;
    assert_eq!(report.saved, vec![StageKey::Local(1), StageKey::Local(2)]);
    for handle in handles {
        match handle.outcome().await {
            StagedOutcome::Saved(body) => assert_eq!(body["_id"], "new-ou"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_deleting_unsaved_resource_fails() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);
    let mut console = client.console();

    let result = console.staging.add(
        Resource::new(ResourceType::Group, "Admins", NodePath::root()),
        SaveOptions::destroy(),
    );
    assert!(matches!(result, Err(GecosError::Validation { .. })));
    assert!(console.staging.is_empty());
}

#[tokio::test]
async fn test_staged_deletion_is_sent_as_delete() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("DELETE"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let handle = console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::destroy())
        .unwrap();
    let report = console.staging.save_all().await;

    assert_eq!(report.deleted, vec![StageKey::Remote(ResourceId::from("u1"))]);
    assert_eq!(handle.outcome().await, StagedOutcome::Deleted(serde_json::Value::Null));
}

#[tokio::test]
async fn test_drop_model_without_restore_makes_no_request() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("GET"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let handle = console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::default())
        .unwrap();

    let fresh = console
        .staging
        .drop_model(&ResourceId::from("u1"), false)
        .await
        .unwrap();
    assert!(fresh.is_none());
    assert!(console.staging.is_empty());
    assert_eq!(handle.outcome().await, StagedOutcome::Dropped);

    let missing = console
        .staging
        .drop_model(&ResourceId::from("u1"), true)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_drop_staged_with_restore_refreshes_cache() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("GET"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "name": "jdoe", "type": "user", "path": "root,A"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let mut edited = user("u1", "jdoe");
    edited.set_field("name", json!("edited"));
    console
        .cache
        .set(ResourceId::from("u1"), edited.clone());
    console
        .staging
        .add(edited, SaveOptions::default())
        .unwrap();

    let fresh = console
        .drop_staged(&ResourceId::from("u1"), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.name, "jdoe");
    assert_eq!(
        console.cache.get(&ResourceId::from("u1")).map(|r| r.name.as_str()),
        Some("jdoe")
    );
    assert!(!console.staging.contains(&ResourceId::from("u1")));
}

#[tokio::test]
async fn test_commit_invalidates_cached_copies() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("GET"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "u1", "name": "jdoe", "type": "user", "path": "root,A"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "u1"})))
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let model = console
        .resource(ResourceType::User, &ResourceId::from("u1"))
        .await
        .unwrap();
    assert!(console.cache.has(&ResourceId::from("u1")));

    console.staging.add(model, SaveOptions::default()).unwrap();
    let report = console.commit().await;

    assert!(report.is_success());
    assert!(!console.cache.has(&ResourceId::from("u1")));
}
