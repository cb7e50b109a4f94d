use super::*;
use crate::errors::*;
use crate::testutils::FakeResourceClient;

#[rstest]
#[case::not_found(TransportError::status(&ApiStatus::not_found("svc1")), Some(404), true)]
#[case::conflict(TransportError::status(&ApiStatus::conflict("svc1")), Some(409), false)]
#[case::other(anyhow!("connection refused"), None, false)]
fn test_status_code(#[case] err: anyhow::Error, #[case] code: Option<u16>, #[case] not_found: bool) {
    assert_eq!(status_code(&err), code);
    assert_eq!(is_not_found(&err), not_found);
}

#[rstest]
fn test_status_code_through_context() {
    let err = TransportError::status(&ApiStatus::not_found("svc1")).context("deleting svc1");
    assert!(is_not_found(&err));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn test_delete_idempotent(registry: SchemaRegistry) {
    let kind = registry.kind(SERVICE_KIND).unwrap().clone();
    let client = FakeResourceClient::new(Arc::new(registry));

    let err = client.delete(&kind, "svc1", Some("ns")).await.unwrap_err();
    assert!(is_not_found(&err));

    assert_ok!(client.delete_idempotent(&kind, "svc1", Some("ns")).await);
    assert!(logs_contain("Service svc1 was already deleted"));
}

#[rstest]
#[tokio::test]
async fn test_create_conflict(registry: SchemaRegistry) {
    let kind = registry.kind(SERVICE_KIND).unwrap().clone();
    let client = FakeResourceClient::new(Arc::new(registry));
    let body = json!({"apiVersion": "v1", "kind": SERVICE_KIND, "metadata": {"name": "svc1"}});

    client.create(&kind, Some("ns"), &body).await.unwrap();
    let err = client.create(&kind, Some("ns"), &body).await.unwrap_err();
    assert_some_eq_x!(status_code(&err), 409);

    assert_ok!(client.delete_idempotent(&kind, "svc1", Some("ns")).await);
    assert!(client.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_fake_patch_merges(registry: SchemaRegistry) {
    let kind = registry.kind(SERVICE_KIND).unwrap().clone();
    let client = FakeResourceClient::new(Arc::new(registry));
    let body = json!({
        "apiVersion": "v1",
        "kind": SERVICE_KIND,
        "metadata": {"name": "svc1", "labels": {"a": "b", "c": "d"}},
    });

    client.create(&kind, Some("ns"), &body).await.unwrap();
    let patch = json!({"metadata": {"labels": {"a": null, "e": "f"}}});
    client.patch(&kind, "svc1", Some("ns"), &patch).await.unwrap();

    let stored = client.stored(&kind, "svc1", Some("ns")).unwrap();
    assert_eq!(stored["metadata"]["labels"], json!({"c": "d", "e": "f"}));
    assert_eq!(stored["metadata"]["resourceVersion"], json!("2"));
}

#[rstest]
#[tokio::test]
async fn test_fake_replace_immutable_field(registry: SchemaRegistry) {
    let kind = registry.kind(SERVICE_KIND).unwrap().clone();
    let client = FakeResourceClient::new(Arc::new(registry));
    let body = json!({"apiVersion": "v1", "kind": SERVICE_KIND, "metadata": {"name": "svc1"}});

    let created = client.create(&kind, Some("ns"), &body).await.unwrap();
    assert_some_eq_x!(created.scalar("spec.cluster_ip"), &json!("10.0.0.1"));

    let mut changed = body.clone();
    changed["spec"] = json!({"clusterIP": "10.0.0.9"});
    let err = client.replace(&kind, "svc1", Some("ns"), &changed).await.unwrap_err();
    assert_some_eq_x!(status_code(&err), 422);

    let mut same = body.clone();
    same["spec"] = json!({"clusterIP": "10.0.0.1", "type": "NodePort"});
    client.replace(&kind, "svc1", Some("ns"), &same).await.unwrap();

    let stored = client.stored(&kind, "svc1", Some("ns")).unwrap();
    assert_eq!(stored["metadata"]["uid"], json!("uid-1"));
    assert_eq!(stored["metadata"]["resourceVersion"], json!("2"));
    assert_eq!(stored["spec"]["type"], json!("NodePort"));
}
