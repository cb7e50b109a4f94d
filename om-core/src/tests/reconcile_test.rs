use super::*;
use crate::params;

#[rstest]
fn test_new_object(registry: SchemaRegistry) {
    let rec = Reconciler::new(&registry);
    let pdb = rec.new_object("pod_disruption_budget").unwrap();
    assert_eq!(pdb.type_name(), POD_DISRUPTION_BUDGET_KIND);
    assert!(pdb.is_empty());

    assert_err!(rec.new_object("Widget"));
}

#[rstest]
#[traced_test]
fn test_verify_params_match(registry: SchemaRegistry, test_service_from_server: TypedObject) {
    let rec = Reconciler::new(&registry);
    let res = rec
        .verify_params(&test_service_from_server, &params!("name" => TEST_SERVICE, "selector" => {"app": "x"}))
        .unwrap();

    assert!(res.is_match());
    assert!(!logs_contain("does not match"));
}

#[rstest]
#[traced_test]
fn test_verify_params_mismatch(registry: SchemaRegistry, test_service_from_server: TypedObject) {
    let rec = Reconciler::new(&registry);
    let res = rec
        .verify_params(&test_service_from_server, &params!("selector" => {"app": "y"}, "type" => "NodePort"))
        .unwrap();

    // the server object is the expected side, the parameters are the actual side
    assert_eq!(res.paths(), vec!["spec.selector", "spec.type"]);
    assert_eq!(res.get("spec.selector").unwrap().expected, Some(json!({"app": "x"})));
    assert_eq!(res.get("spec.type").unwrap().expected, None);
    assert!(logs_contain("Service does not match its parameters"));
}

#[rstest]
fn test_verify_params_server_field(registry: SchemaRegistry, test_service_from_server: TypedObject) {
    let rec = Reconciler::new(&registry);

    assert!(rec.verify_params(&test_service_from_server, &params!("cluster_ip" => TEST_CLUSTER_IP)).unwrap().is_match());
    assert!(!rec.verify_params(&test_service_from_server, &params!("cluster_ip" => "10.0.0.9")).unwrap().is_match());
}

#[rstest]
fn test_verify_params_does_not_mutate(registry: SchemaRegistry, test_pod: TypedObject) {
    let before = test_pod.clone();
    let rec = Reconciler::new(&registry);

    rec.verify_params(&test_pod, &params!("restart_policy" => "Never")).unwrap();
    assert_eq!(test_pod, before);
}

#[rstest]
fn test_verify_params_bad_params(registry: SchemaRegistry, test_pod: TypedObject) {
    let rec = Reconciler::new(&registry);
    let err = rec.verify_params(&test_pod, &params!("replicas" => 3)).unwrap_err();
    assert_matches!(err.downcast_ref::<ReconcileError>(), Some(ReconcileError::UnknownField(_)));
}

#[rstest]
fn test_decode_encode(registry: SchemaRegistry) {
    let rec = Reconciler::new(&registry);
    let wire = json!({
        "metadata": {"name": "the-pdb"},
        "spec": {
            "maxUnavailable": "10%",
            "selector": {"matchLabels": {"app": "x"}},
        },
    });

    let pdb = rec.decode("poddisruptionbudget", &wire).unwrap();
    assert_some_eq_x!(pdb.scalar("spec.max_unavailable"), &json!("10%"));
    assert_eq!(rec.encode(&pdb).unwrap(), wire);
}

#[rstest]
fn test_objects_match_after_apply(registry: SchemaRegistry, test_pod: TypedObject) {
    let rec = Reconciler::new(&registry);
    let mut from_params = rec.new_object(POD_KIND).unwrap();
    rec.object_from_params(
        &params!(
            "name" => TEST_POD,
            "namespace" => TEST_NAMESPACE,
            "labels" => {"app": "x"},
            "containers" => [
                {"name": "c1", "image": "nginx:1.25", "ports": [{"container_port": 80}]},
                {"name": "c2", "image": "busybox", "command": ["sleep", "3600"]},
            ],
            "restart_policy" => "Always",
        ),
        &mut from_params,
    )
    .unwrap();

    assert!(rec.objects_match(&test_pod, &from_params).unwrap().is_match());
}
