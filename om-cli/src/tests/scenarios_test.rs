use std::path::PathBuf;
use std::sync::Arc;

use super::scenarios::*;
use super::*;

const SERVICE_SCENARIO: &str = "
- create:
    name: myservice
    selector:
      app: django
    ports:
      - port: 8080
  seq: 1
- patch:
    selector:
      app: web
  seq: 2
";

const LIMITED_SCENARIO: &str = "
versionLimits:
  max: \"3.6\"
tasks:
  - create:
      name: myproject
    seq: 1
";

#[fixture]
fn client(registry: SchemaRegistry) -> FakeResourceClient {
    FakeResourceClient::new(Arc::new(registry))
}

fn args(dir: PathBuf, namespace: Option<&str>) -> Args {
    Args {
        dir,
        namespace: namespace.map(Into::into),
        server_version: None,
        log_file: DEFAULT_LOG_FILE.into(),
        log_level: "debug".into(),
        append_log: false,
    }
}

#[rstest]
#[tokio::test]
async fn test_run_scenarios_throwaway_namespace(tmpdir: TempDir, registry: SchemaRegistry, client: FakeResourceClient) {
    write_file(&tmpdir, "example_v1_service.yml", SERVICE_SCENARIO);
    let args = args(tmpdir.path().into(), None);

    let reports = run_scenarios(&args, &client, &registry, None).await.unwrap();
    assert_len_eq_x!(&reports, 1);
    assert!(reports[0].passed());

    let calls = client.calls();
    let first = calls.first().unwrap();
    assert_starts_with!(first, "create namespaces//test-");
    let namespace = first.trim_start_matches("create namespaces//");
    assert_eq!(calls.last().unwrap(), &format!("delete namespaces//{namespace}"));
    assert!(calls.iter().any(|c| c.starts_with(&format!("create services/{namespace}/"))));

    // the namespace is gone too
    assert!(client.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_run_scenarios_existing_namespace(tmpdir: TempDir, registry: SchemaRegistry, client: FakeResourceClient) {
    write_file(&tmpdir, "example_v1_service.yml", SERVICE_SCENARIO);
    let args = args(tmpdir.path().into(), Some("existing"));

    let reports = run_scenarios(&args, &client, &registry, None).await.unwrap();
    assert!(reports[0].passed());
    assert!(client.calls().iter().all(|c| !c.contains("namespaces/")));
    assert!(client.calls().iter().all(|c| c.contains("services/existing/")));
}

#[rstest]
#[tokio::test]
async fn test_run_scenarios_version_limits(tmpdir: TempDir, registry: SchemaRegistry, client: FakeResourceClient) {
    write_file(&tmpdir, "example_v1_service.yml", SERVICE_SCENARIO);
    write_file(&tmpdir, "limited_v1_project.yml", LIMITED_SCENARIO);
    let args = args(tmpdir.path().into(), Some("existing"));

    let reports = run_scenarios(&args, &client, &registry, Some("3.11")).await.unwrap();
    let names: Vec<_> = reports.iter().map(|r| (r.scenario.as_str(), r.skipped.is_some())).collect();
    assert_eq!(names, vec![("example_v1_service.yml", false), ("limited_v1_project.yml", true)]);
}

#[rstest]
#[tokio::test]
async fn test_run_scenarios_bad_dir(tmpdir: TempDir, registry: SchemaRegistry, client: FakeResourceClient) {
    let args = args(tmpdir.path().join("nope"), None);
    assert_err!(run_scenarios(&args, &client, &registry, None).await);

    // nothing gets set up if the scenarios can't be loaded
    assert_is_empty!(client.calls());
}
