use lazy_static::lazy_static;

use crate::k8s::GVK;

// Wire envelope keys
pub const API_VERSION_KEY: &str = "apiVersion";
pub const KIND_KEY: &str = "kind";

// Well-known fields on resource root types
pub const METADATA_FIELD: &str = "metadata";
pub const SPEC_FIELD: &str = "spec";
pub const STATUS_FIELD: &str = "status";

// Parameters that are shorthand for the corresponding `metadata` fields
pub const NAME_PARAM: &str = "name";
pub const NAMESPACE_PARAM: &str = "namespace";
pub const LABELS_PARAM: &str = "labels";
pub const ANNOTATIONS_PARAM: &str = "annotations";
pub const METADATA_PARAMS: &[&str] = &[NAME_PARAM, NAMESPACE_PARAM, LABELS_PARAM, ANNOTATIONS_PARAM];

// Connection and control parameters that share a parameter set with the resource fields but
// don't describe the resource; these are accepted and skipped by the mapper
pub const IGNORED_PARAMS: &[&str] = &[
    "api_key",
    "cert_file",
    "context",
    "debug",
    "force",
    "host",
    "key_file",
    "kubeconfig",
    "password",
    "resource_definition",
    "src",
    "ssl_ca_cert",
    "state",
    "username",
    "verify_ssl",
];

// Kinds
pub const POD_KIND: &str = "Pod";
pub const SERVICE_KIND: &str = "Service";
pub const NAMESPACE_KIND: &str = "Namespace";
pub const PROJECT_KIND: &str = "Project";
pub const POD_DISRUPTION_BUDGET_KIND: &str = "PodDisruptionBudget";

// Defaults
pub const DEFAULT_LOG_FILE: &str = "objmatch.log";
pub const DEFAULT_SCENARIO_NAMESPACE_PREFIX: &str = "test";
pub const MAX_GENERATED_NAME_LEN: usize = 22;

// Built-in GVKs
lazy_static! {
    pub static ref POD_GVK: GVK = GVK::new("", "v1", POD_KIND);
    pub static ref SERVICE_GVK: GVK = GVK::new("", "v1", SERVICE_KIND);
    pub static ref NAMESPACE_GVK: GVK = GVK::new("", "v1", NAMESPACE_KIND);
    pub static ref PROJECT_GVK: GVK = GVK::new("project.openshift.io", "v1", PROJECT_KIND);
    pub static ref POD_DISRUPTION_BUDGET_GVK: GVK = GVK::new("policy", "v1beta1", POD_DISRUPTION_BUDGET_KIND);
}
