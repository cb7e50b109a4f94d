use rstest::fixture;
use serde_json::json;

use crate::constants::*;

// A Service the way an apiserver returns it, with everything the server fills in
#[fixture]
pub fn service_wire(#[default(TEST_API_SERVICE)] name: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": TEST_API_NAMESPACE,
            "uid": TEST_API_UID,
            "resourceVersion": "1017",
            "creationTimestamp": "2024-01-01T00:00:00Z",
            "managedFields": [{"manager": "kubectl", "operation": "Update"}],
        },
        "spec": {
            "selector": {"app": "django"},
            "ports": [{"port": 8080, "targetPort": 8080, "protocol": "TCP"}],
            "clusterIP": TEST_API_CLUSTER_IP,
            "clusterIPs": [TEST_API_CLUSTER_IP],
            "type": "ClusterIP",
            "sessionAffinity": "None",
            "ipFamilies": ["IPv4"],
        },
        "status": {"loadBalancer": {}},
    })
}

#[fixture]
pub fn project_wire(#[default(TEST_API_PROJECT)] name: &str) -> serde_json::Value {
    json!({
        "apiVersion": "project.openshift.io/v1",
        "kind": "Project",
        "metadata": {
            "name": name,
            "uid": TEST_API_UID,
            "resourceVersion": "2001",
            "annotations": {"openshift.io/requester": "developer"},
        },
        "spec": {"finalizers": ["kubernetes"]},
        "status": {"phase": "Active"},
    })
}
