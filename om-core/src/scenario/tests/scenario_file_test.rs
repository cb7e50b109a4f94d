use assert_fs::prelude::*;
use serde_json::json;

use super::*;

const SERVICE_SCENARIO: &str = r#"
- replace:
    name: myservice
    selector:
      app: other
  seq: 3
- create:
    name: myservice
    namespace: k8s-project
    selector:
      app: django
    ports:
      - port: 8080
        target_port: 8080
  seq: 1
- patch:
    selector:
      app: web
  seq: 2
"#;

const PROJECT_SCENARIO: &str = r#"
versionLimits:
  min: "3.7"
  latest: true
tasks:
  - create:
      name: myproject
    seq: 1
"#;

#[rstest]
fn test_from_yaml_task_list() {
    let scenario = Scenario::from_yaml("example_v1_service.yml", SERVICE_SCENARIO).unwrap();

    assert_eq!(scenario.name, "example_v1_service.yml");
    assert_eq!(scenario.api_version, "v1");
    assert_eq!(scenario.resource, "service");
    assert_none!(&scenario.version_limits);
    assert_eq!(scenario.tasks.iter().map(|t| t.seq).collect::<Vec<_>>(), vec![1, 2, 3]);

    let create = scenario.tasks[0].create.as_ref().unwrap();
    assert_eq!(create["selector"], json!({"app": "django"}));
    assert_eq!(create["ports"], json!([{"port": 8080, "target_port": 8080}]));
}

#[rstest]
fn test_from_yaml_with_version_limits() {
    let scenario = Scenario::from_yaml("example_v1_project.yaml", PROJECT_SCENARIO).unwrap();

    assert_eq!(
        scenario.version_limits,
        Some(VersionLimits { min: Some("3.7".into()), max: None, latest: true })
    );
    assert_len_eq_x!(&scenario.tasks, 1);
}

#[rstest]
fn test_params_for() {
    let scenario = Scenario::from_yaml("example_v1_service.yml", SERVICE_SCENARIO).unwrap();

    let patches: Vec<_> = scenario.params_for(Phase::Patch).collect();
    assert_len_eq_x!(&patches, 1);
    assert_eq!(patches[0].0, 2);
    assert_eq!(patches[0].1["selector"], json!({"app": "web"}));

    assert_eq!(scenario.params_for(Phase::Get).count(), 0);
    assert_eq!(scenario.params_for(Phase::Remove).count(), 0);
}

#[rstest]
fn test_from_yaml_missing_action() {
    let err = Scenario::from_yaml("example_v1_service.yml", "- seq: 4\n  state: absent\n").unwrap_err();
    assert_matches!(err.downcast_ref::<ScenarioError>(), Some(ScenarioError::MissingAction(_)));
}

#[rstest]
#[case::simple("example_v1_namespace.yml", "v1", "namespace")]
#[case::underscored_resource("example_v1beta1_pod_disruption_budget.yaml", "v1beta1", "pod_disruption_budget")]
fn test_file_name_parts(#[case] file_name: &str, #[case] api_version: &str, #[case] resource: &str) {
    let scenario = Scenario::from_yaml(file_name, "[{create: {name: x}}]").unwrap();
    assert_eq!(scenario.api_version, api_version);
    assert_eq!(scenario.resource, resource);
}

#[rstest]
#[case::no_prefix("v1_service.yml")]
#[case::no_parts("service.yml")]
#[case::wrong_extension("example_v1_service.json")]
#[case::empty_part("example__service.yml")]
fn test_invalid_file_name(#[case] file_name: &str) {
    let err = Scenario::from_yaml(file_name, "[]").unwrap_err();
    assert_matches!(err.downcast_ref::<ScenarioError>(), Some(ScenarioError::InvalidFileName(_)));
}

#[rstest]
fn test_load_dir() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("example_v1_service.yml").write_str(SERVICE_SCENARIO).unwrap();
    dir.child("example_v1_project.yaml").write_str(PROJECT_SCENARIO).unwrap();
    dir.child("README.md").write_str("not a scenario").unwrap();

    let scenarios = Scenario::load_dir(dir.path()).unwrap();
    assert_eq!(
        scenarios.iter().map(|s| s.resource.as_str()).collect::<Vec<_>>(),
        vec!["project", "service"]
    );
}

#[rstest]
fn test_load_dir_bad_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("broken.yml").write_str(SERVICE_SCENARIO).unwrap();

    assert_err!(Scenario::load_dir(dir.path()));
}

#[rstest]
#[case::equal("3.6", "3.6", Ordering::Equal)]
#[case::numeric("3.10", "3.9", Ordering::Greater)]
#[case::missing_component("3", "3.0.0", Ordering::Equal)]
#[case::leading_v("v1.30.2", "1.30.10", Ordering::Less)]
#[case::suffix("4.14.0-rc1", "4.14", Ordering::Equal)]
fn test_compare_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
    assert_eq!(compare_versions(a, b), expected);
}

#[rstest]
#[case::in_range("3.7", true)]
#[case::below_min("3.5", false)]
#[case::above_max("3.11", false)]
#[case::latest_excluded("latest", false)]
fn test_version_limits(#[case] version: &str, #[case] allowed: bool) {
    let limits = VersionLimits { min: Some("3.6".into()), max: Some("3.10".into()), latest: true };
    assert_eq!(limits.allows(version), allowed);
}

#[rstest]
fn test_version_limits_unbounded() {
    let limits = VersionLimits::default();
    assert!(limits.allows("1.0"));
    assert!(limits.allows("latest"));
}
