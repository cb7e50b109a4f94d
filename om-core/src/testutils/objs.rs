use rstest::*;
use serde_json::json;

use super::*;
use crate::prelude::*;
use crate::schema::BUILTIN_REGISTRY;

#[fixture]
pub fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin()
}

pub fn decode(kind: &str, wire: Value) -> TypedObject {
    Reconciler::new(&BUILTIN_REGISTRY).decode(kind, &wire).unwrap()
}

#[fixture]
pub fn test_service() -> TypedObject {
    decode(
        SERVICE_KIND,
        json!({
            "metadata": {"name": TEST_SERVICE, "namespace": TEST_NAMESPACE},
            "spec": {"selector": {"app": "x"}},
        }),
    )
}

// What the server hands back for test_service: same user fields, plus everything it fills in
#[fixture]
pub fn test_service_from_server() -> TypedObject {
    decode(
        SERVICE_KIND,
        json!({
            "apiVersion": "v1",
            "kind": SERVICE_KIND,
            "metadata": {
                "name": TEST_SERVICE,
                "namespace": TEST_NAMESPACE,
                "uid": "1234-asdf",
                "resourceVersion": "42",
                "creationTimestamp": "2024-01-01T00:00:00Z",
            },
            "spec": {
                "selector": {"app": "x"},
                "clusterIP": TEST_CLUSTER_IP,
            },
            "status": {"loadBalancer": {}},
        }),
    )
}

#[fixture]
pub fn test_pod() -> TypedObject {
    decode(
        POD_KIND,
        json!({
            "metadata": {"name": TEST_POD, "namespace": TEST_NAMESPACE, "labels": {"app": "x"}},
            "spec": {
                "containers": [
                    {"name": "c1", "image": "nginx:1.25", "ports": [{"containerPort": 80}]},
                    {"name": "c2", "image": "busybox", "command": ["sleep", "3600"]},
                ],
                "restartPolicy": "Always",
            },
        }),
    )
}

#[fixture]
pub fn test_pdb() -> TypedObject {
    decode(
        POD_DISRUPTION_BUDGET_KIND,
        json!({
            "metadata": {"name": "the-pdb", "namespace": TEST_NAMESPACE},
            "spec": {
                "minAvailable": 1,
                "selector": {
                    "matchExpressions": [
                        {"key": "app", "operator": "In", "values": ["x", "y"]},
                        {"key": "tier", "operator": "Exists"},
                    ],
                },
            },
        }),
    )
}
