use lazy_static::lazy_static;

use super::*;
use crate::constants::*;

use super::ScalarType::*;

fn envelope_fields() -> Vec<FieldSchema> {
    // apiVersion and kind are filled in from the resource kind, not from parameters, so we only
    // compare them if the expected object spells them out
    vec![
        FieldSchema::scalar("api_version", String).managed_by_server(),
        FieldSchema::scalar("kind", String).managed_by_server(),
        FieldSchema::object("metadata", "ObjectMeta"),
    ]
}

fn root_type(name: &str, spec_type: &str, status: FieldSchema) -> TypeSchema {
    let mut fields = envelope_fields();
    fields.push(FieldSchema::object("spec", spec_type));
    fields.push(status.managed_by_server());
    TypeSchema::new(name, fields)
}

fn object_meta() -> TypeSchema {
    TypeSchema::new(
        "ObjectMeta",
        vec![
            FieldSchema::scalar("name", String),
            FieldSchema::scalar("generate_name", String),
            FieldSchema::scalar("namespace", String),
            FieldSchema::scalar("labels", StringMap),
            FieldSchema::scalar("annotations", StringMap),
            FieldSchema::scalar("finalizers", StringList),
            FieldSchema::scalar("uid", String).managed_by_server(),
            FieldSchema::scalar("resource_version", String).managed_by_server(),
            FieldSchema::scalar("generation", Integer).managed_by_server(),
            FieldSchema::scalar("creation_timestamp", String).managed_by_server(),
            FieldSchema::scalar("deletion_timestamp", String).managed_by_server(),
            FieldSchema::scalar("self_link", String).managed_by_server(),
            FieldSchema::scalar("managed_fields", Any).managed_by_server(),
        ],
    )
}

fn pod_types() -> Vec<TypeSchema> {
    vec![
        root_type(POD_KIND, "PodSpec", FieldSchema::object("status", "PodStatus")),
        TypeSchema::new(
            "PodSpec",
            vec![
                FieldSchema::list("containers", "Container"),
                FieldSchema::list("init_containers", "Container"),
                FieldSchema::scalar("restart_policy", String),
                FieldSchema::scalar("termination_grace_period_seconds", Integer),
                FieldSchema::scalar("dns_policy", String),
                FieldSchema::scalar("service_account_name", String),
                FieldSchema::scalar("node_selector", StringMap),
                FieldSchema::scalar("node_name", String).managed_by_server(),
                FieldSchema::scalar("host_network", Boolean),
                FieldSchema::scalar("scheduler_name", String),
            ],
        ),
        TypeSchema::new(
            "Container",
            vec![
                FieldSchema::scalar("name", String),
                FieldSchema::scalar("image", String),
                FieldSchema::scalar("command", StringList),
                FieldSchema::scalar("args", StringList),
                FieldSchema::scalar("working_dir", String),
                FieldSchema::list("ports", "ContainerPort"),
                FieldSchema::list("env", "EnvVar"),
                FieldSchema::scalar("image_pull_policy", String),
                FieldSchema::scalar("resources", Any),
            ],
        ),
        TypeSchema::new(
            "ContainerPort",
            vec![
                FieldSchema::scalar("name", String),
                FieldSchema::scalar("container_port", Integer),
                FieldSchema::scalar("host_port", Integer),
                FieldSchema::scalar("protocol", String),
            ],
        ),
        TypeSchema::new("EnvVar", vec![FieldSchema::scalar("name", String), FieldSchema::scalar("value", String)]),
        TypeSchema::new(
            "PodStatus",
            vec![
                FieldSchema::scalar("phase", String),
                FieldSchema::scalar("conditions", Any),
                FieldSchema::scalar("host_ip", String).with_wire_name("hostIP"),
                FieldSchema::scalar("pod_ip", String).with_wire_name("podIP"),
                FieldSchema::scalar("start_time", String),
                FieldSchema::scalar("container_statuses", Any),
            ],
        ),
    ]
}

fn service_types() -> Vec<TypeSchema> {
    vec![
        root_type(SERVICE_KIND, "ServiceSpec", FieldSchema::scalar("status", Any)),
        TypeSchema::new(
            "ServiceSpec",
            vec![
                FieldSchema::scalar("selector", StringMap),
                FieldSchema::list("ports", "ServicePort"),
                FieldSchema::scalar("cluster_ip", String)
                    .with_wire_name("clusterIP")
                    .managed_by_server(),
                FieldSchema::scalar("type", String),
                FieldSchema::scalar("external_ips", StringList).with_wire_name("externalIPs"),
                FieldSchema::scalar("session_affinity", String),
                FieldSchema::scalar("load_balancer_ip", String).with_wire_name("loadBalancerIP"),
            ],
        ),
        TypeSchema::new(
            "ServicePort",
            vec![
                FieldSchema::scalar("name", String),
                FieldSchema::scalar("protocol", String),
                FieldSchema::scalar("port", Integer),
                FieldSchema::scalar("target_port", IntOrString),
                FieldSchema::scalar("node_port", Integer).managed_by_server(),
            ],
        ),
    ]
}

fn namespace_types() -> Vec<TypeSchema> {
    vec![
        root_type(NAMESPACE_KIND, "NamespaceSpec", FieldSchema::scalar("status", Any)),
        root_type(PROJECT_KIND, "NamespaceSpec", FieldSchema::scalar("status", Any)),
        TypeSchema::new("NamespaceSpec", vec![FieldSchema::scalar("finalizers", StringList)]),
    ]
}

fn pod_disruption_budget_types() -> Vec<TypeSchema> {
    vec![
        root_type(POD_DISRUPTION_BUDGET_KIND, "PodDisruptionBudgetSpec", FieldSchema::scalar("status", Any)),
        TypeSchema::new(
            "PodDisruptionBudgetSpec",
            vec![
                FieldSchema::scalar("min_available", IntOrString),
                FieldSchema::scalar("max_unavailable", IntOrString),
                FieldSchema::object("selector", "LabelSelector"),
            ],
        ),
        TypeSchema::new(
            "LabelSelector",
            vec![
                FieldSchema::scalar("match_labels", StringMap),
                FieldSchema::list("match_expressions", "LabelSelectorRequirement").unordered(),
            ],
        ),
        TypeSchema::new(
            "LabelSelectorRequirement",
            vec![
                FieldSchema::scalar("key", String),
                FieldSchema::scalar("operator", String),
                FieldSchema::scalar("values", StringList).unordered(),
            ],
        ),
    ]
}

fn builtin_registry() -> SchemaRegistry {
    let mut types = vec![object_meta()];
    types.extend(pod_types());
    types.extend(service_types());
    types.extend(namespace_types());
    types.extend(pod_disruption_budget_types());

    let kinds = vec![
        ResourceKind::new(&POD_GVK, "pods"),
        ResourceKind::new(&SERVICE_GVK, "services").with_immutable_fields(&["spec.cluster_ip"]),
        ResourceKind::new(&NAMESPACE_GVK, "namespaces").cluster_scoped(),
        ResourceKind::new(&PROJECT_GVK, "projects").cluster_scoped(),
        ResourceKind::new(&POD_DISRUPTION_BUDGET_GVK, "poddisruptionbudgets"),
    ];

    SchemaRegistry::from_parts(types, kinds)
}

lazy_static! {
    pub static ref BUILTIN_REGISTRY: SchemaRegistry = builtin_registry();
}
