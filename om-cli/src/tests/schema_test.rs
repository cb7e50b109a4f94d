use om_core::config::SchemaConfig;

use super::output::render;
use super::schema::*;
use super::*;

fn type_names(config: &SchemaConfig) -> Vec<&str> {
    config.types.iter().map(|t| t.name.as_str()).collect()
}

#[rstest]
fn test_schema_whole_registry(registry: SchemaRegistry) {
    let config = schema(&Args { kind: None }, &registry).unwrap();
    assert_eq!(config.types.len(), registry.types().count());
    assert_eq!(config.kinds.len(), 5);
}

#[rstest]
#[case::pdb(
    "pod_disruption_budget",
    vec!["PodDisruptionBudget", "ObjectMeta", "PodDisruptionBudgetSpec", "LabelSelector", "LabelSelectorRequirement"]
)]
#[case::project("Project", vec!["Project", "ObjectMeta", "NamespaceSpec"])]
#[case::pod("pod", vec!["Pod", "ObjectMeta", "PodSpec", "Container", "ContainerPort", "EnvVar", "PodStatus"])]
fn test_schema_one_kind(registry: SchemaRegistry, #[case] kind: &str, #[case] expected: Vec<&str>) {
    let config = schema(&Args { kind: Some(kind.into()) }, &registry).unwrap();
    assert_eq!(type_names(&config), expected);
    assert_len_eq_x!(&config.kinds, 1);
}

#[rstest]
#[case::yaml(OutputFormat::Yaml)]
#[case::json(OutputFormat::Json)]
fn test_schema_output_is_loadable(registry: SchemaRegistry, #[case] format: OutputFormat) {
    let config = schema(&Args { kind: Some(SERVICE_KIND.into()) }, &registry).unwrap();
    let out = render(&config, format).unwrap();

    let mut loaded = SchemaRegistry::new();
    serde_yaml::from_str::<SchemaConfig>(&out).unwrap().apply_to(&mut loaded).unwrap();
    assert_eq!(loaded.kind(SERVICE_KIND).unwrap(), registry.kind(SERVICE_KIND).unwrap());
    assert_eq!(loaded.types().count(), 4);
}

#[rstest]
fn test_schema_unknown_kind(registry: SchemaRegistry) {
    assert_err!(schema(&Args { kind: Some("Widget".into()) }, &registry));
}
