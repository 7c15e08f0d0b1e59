use super::common::{create_test_client, user};
use crate::{
    AlertLevel, GecosError, NodePath, Policy, Resource, ResourceEditor, ResourceId,
    ResourceType, SaveOptions, ValidationError, ViewNotice,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn policy(targets: Vec<ResourceType>) -> Policy {
    serde_json::from_value(json!({
        "_id": "p1",
        "name": "Desktop background",
        "slug": "desktop_background_res",
        "targets": targets,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_invalid_fields_block_staging() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);
    let mut console = client.console();

    let mut editor = ResourceEditor::new(user("u1", "jdoe"));
    editor.set_field("email", "not-an-email");
    editor.set_field("phone", "call me");

    let err = editor.stage(&mut console.staging).unwrap_err();
    assert!(matches!(
        err,
        GecosError::Validation {
            source: ValidationError::Field { ref field, .. }
        } if field == "email"
    ));
    assert_eq!(editor.errors().len(), 2);
    assert!(console.staging.is_empty());

    editor.set_field("email", "jdoe@example.org");
    editor.set_field("phone", "+34 600 000 000");
    editor.stage(&mut console.staging).unwrap();
    assert!(editor.errors().is_empty());
    assert!(console.staging.contains(&ResourceId::from("u1")));
}

#[test]
fn test_required_fields_per_type() {
    let mut editor = ResourceEditor::new(Resource::new(
        ResourceType::Repository,
        "",
        NodePath::root(),
    ));
    let errors = editor.validate().unwrap_err();
    let fields: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            ValidationError::Field { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fields, vec!["name", "uri"]);

    editor.set_field("name", "ubuntu");
    editor.set_field("uri", "http://archive.ubuntu.com/ubuntu");
    assert!(editor.validate().is_ok());

    let mut computer = ResourceEditor::new(Resource::new(
        ResourceType::Computer,
        "pc-01",
        NodePath::root(),
    ));
    computer.set_field("ip", "10.0.0.300");
    assert!(computer.validate().is_err());
    computer.set_field("ip", "10.0.0.30");
    assert!(computer.validate().is_ok());
}

#[tokio::test]
async fn test_staging_after_deletion_sets_single_alert() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);
    let mut console = client.console();

    let mut deleting = ResourceEditor::new(user("X", "jdoe"));
    deleting.stage_delete(&mut console.staging).unwrap();
    assert!(deleting.alert().is_none());

    let mut editor = ResourceEditor::new(user("X", "jdoe"));
    let err = editor.stage(&mut console.staging).unwrap_err();
    assert!(err.is_suppressed());

    let alert = editor.alert().unwrap();
    assert_eq!(alert.level, AlertLevel::Warning);
    assert!(alert.message.contains("X"));
    assert_eq!(console.staging.len(), 1);
    assert!(
        console
            .staging
            .is_marked_for_deletion(&ResourceId::from("X"))
    );
}

#[test]
fn test_notices_disable_saving_until_reload() {
    let mut editor = ResourceEditor::new(user("u1", "jdoe"));

    editor.apply_notice(&ViewNotice::ResourceChanged {
        id: ResourceId::from("other"),
    });
    assert!(!editor.is_save_disabled());

    editor.apply_notice(&ViewNotice::ResourceChanged {
        id: ResourceId::from("u1"),
    });
    assert!(editor.is_save_disabled());
    assert_eq!(editor.alert().unwrap().title, "Object modified");

    editor.reload(user("u1", "john.doe"));
    assert!(!editor.is_save_disabled());
    assert!(editor.alert().is_none());

    editor.apply_notice(&ViewNotice::ResourceDeleted {
        id: ResourceId::from("u1"),
    });
    assert_eq!(editor.alert().unwrap().title, "Object deleted");
}

#[tokio::test]
async fn test_disabled_editor_cannot_stage() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);
    let mut console = client.console();

    let mut editor = ResourceEditor::new(user("u1", "jdoe"));
    editor.apply_notice(&ViewNotice::ResourceDeleted {
        id: ResourceId::from("u1"),
    });
    assert!(editor.stage(&mut console.staging).is_err());
    assert!(editor.stage_delete(&mut console.staging).is_err());
    assert!(console.staging.is_empty());
}

#[test]
fn test_policy_targets_are_checked() {
    let mut editor = ResourceEditor::new(user("u1", "jdoe"));

    let computer_only = policy(vec![ResourceType::Computer]);
    assert!(editor.attach_policy(&computer_only, json!({})).is_err());
    assert!(editor.model().policies.is_empty());

    let for_users = policy(vec![ResourceType::User, ResourceType::Ou]);
    editor
        .attach_policy(&for_users, json!({"desktop_file": "/usr/share/bg.png"}))
        .unwrap();
    assert_eq!(
        editor.model().policies["p1"]["desktop_file"],
        "/usr/share/bg.png"
    );

    let previous = editor.detach_policy(&ResourceId::from("p1"));
    assert!(previous.is_some());
    assert!(editor.model().policies.is_empty());
}

#[tokio::test]
async fn test_load_uses_object_cache() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("GET"))
        .and(path("/api/printers/p1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p1",
            "name": "hp-01",
            "type": "printer",
            "path": "root,A",
            "uri": "ipp://10.0.0.5/ipp"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    let first = ResourceEditor::load(&mut console, ResourceType::Printer, &ResourceId::from("p1"))
        .await
        .unwrap();
    let second = ResourceEditor::load(&mut console, ResourceType::Printer, &ResourceId::from("p1"))
        .await
        .unwrap();

    assert_eq!(first.model(), second.model());
    assert_eq!(second.model().field("uri").as_deref(), Some("ipp://10.0.0.5/ipp"));
    assert_eq!(console.cache.size(), 1);
}

#[tokio::test]
async fn test_failed_commit_alert_names_resource() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, 30);

    Mock::given(method("PUT"))
        .and(path("/api/users/u1/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let mut console = client.console();
    console
        .staging
        .add(user("u1", "jdoe"), SaveOptions::default())
        .unwrap();
    let report = console.commit().await;

    let alert = crate::Alert::save_failed(&report.failed[0]);
    assert_eq!(alert.level, AlertLevel::Error);
    assert!(alert.message.starts_with("u1 (500): "));
    assert!(alert.message.contains("Internal Server Error"));
}
