use super::apply::*;
use super::*;

#[rstest]
fn test_apply_to_empty_object(tmpdir: TempDir, registry: SchemaRegistry) {
    let args = Args {
        kind: "Pod".into(),
        params: write_file(&tmpdir, "params.yml", "name: foo\nnamespace: bar\n"),
        target: None,
    };

    let obj = apply(&args, &registry).unwrap();
    assert_eq!(obj, json!({"metadata": {"name": "foo", "namespace": "bar"}}));
}

#[rstest]
fn test_apply_to_server_object(tmpdir: TempDir, registry: SchemaRegistry) {
    let args = Args {
        kind: SERVICE_KIND.into(),
        params: write_file(&tmpdir, "params.yml", "selector:\n  app: web\nports:\n  - port: 9090\n"),
        target: Some(write_file(&tmpdir, "svc.yml", SERVICE_FROM_SERVER_YAML)),
    };

    let obj = apply(&args, &registry).unwrap();
    assert_eq!(obj["spec"]["selector"], json!({"app": "web"}));
    assert_eq!(obj["spec"]["ports"], json!([{"port": 9090}]));

    // everything the parameters didn't touch is still there
    assert_eq!(obj["spec"]["clusterIP"], json!("10.0.0.5"));
    assert_eq!(obj["metadata"]["uid"], json!("1234-asdf"));
}

#[rstest]
fn test_apply_unknown_param(tmpdir: TempDir, registry: SchemaRegistry) {
    let args = Args {
        kind: SERVICE_KIND.into(),
        params: write_file(&tmpdir, "params.yml", "replicas: 3\n"),
        target: Some(write_file(&tmpdir, "svc.yml", SERVICE_YAML)),
    };

    let err = apply(&args, &registry).unwrap_err();
    assert_matches!(err.downcast_ref::<ReconcileError>(), Some(ReconcileError::UnknownField(_)));
}

#[rstest]
fn test_apply_params_not_a_map(tmpdir: TempDir, registry: SchemaRegistry) {
    let args = Args {
        kind: SERVICE_KIND.into(),
        params: write_file(&tmpdir, "params.yml", "- name\n- namespace\n"),
        target: None,
    };
    assert_err!(apply(&args, &registry));
}
