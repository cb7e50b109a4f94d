mod fake;
mod objs;

pub use fake::*;
pub use objs::*;

pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_SERVICE: &str = "svc1";
pub const TEST_POD: &str = "the-pod";
pub const TEST_CLUSTER_IP: &str = "10.0.0.5";
