mod apply_test;
mod scenarios_test;
mod schema_test;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use assertables::*;
use om_core::prelude::*;
use om_core::testutils::*;
use rstest::*;
use serde_json::json;

use super::*;

const SERVICE_YAML: &str = "
apiVersion: v1
kind: Service
metadata:
  name: svc1
  namespace: test-namespace
spec:
  selector:
    app: x
  ports:
    - port: 80
      targetPort: 8080
";

const SERVICE_FROM_SERVER_YAML: &str = "
apiVersion: v1
kind: Service
metadata:
  name: svc1
  namespace: test-namespace
  uid: 1234-asdf
  resourceVersion: \"42\"
spec:
  selector:
    app: x
  ports:
    - port: 80
      targetPort: 8080
  clusterIP: 10.0.0.5
status:
  loadBalancer: {}
";

#[fixture]
fn tmpdir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let file = dir.child(name);
    file.write_str(contents).unwrap();
    file.path().to_string_lossy().into()
}
