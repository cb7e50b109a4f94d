pub const TEST_API_NAMESPACE: &str = "api-test";
pub const TEST_API_SERVICE: &str = "the-service";
pub const TEST_API_PROJECT: &str = "the-project";
pub const TEST_API_CLUSTER_IP: &str = "172.30.0.17";
pub const TEST_API_UID: &str = "6b1c3a4e-0000-4000-8000-000000000001";

pub const SERVICES_PATH: &str = "/api/v1/namespaces/api-test/services";
pub const PROJECTS_PATH: &str = "/apis/project.openshift.io/v1/projects";
