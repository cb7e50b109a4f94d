use std::fs::File;

use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::errors::*;
use crate::schema::{
    ResourceKind,
    SchemaRegistry,
    TypeSchema,
};

// Extra types and kinds, loaded from YAML and merged on top of the built-in registry:
//
// ---
// types:
//   - name: Route
//     fields:
//       - name: metadata
//         kind: object:ObjectMeta
//       - name: spec
//         kind: object:RouteSpec
//   - name: RouteSpec
//     fields:
//       - name: host
//         kind: string
//         serverManaged: true
// kinds:
//   - gvk: route.openshift.io/v1.Route
//     plural: routes
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    #[serde(default)]
    pub types: Vec<TypeSchema>,

    #[serde(default)]
    pub kinds: Vec<ResourceKind>,
}

impl SchemaConfig {
    pub fn load(filename: &str) -> anyhow::Result<SchemaConfig> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }

    pub fn from_registry(registry: &SchemaRegistry) -> SchemaConfig {
        SchemaConfig {
            types: registry.types().cloned().collect(),
            kinds: registry.kinds().cloned().collect(),
        }
    }

    // Merges this config into `registry`; the result has to be a closed registry, so a config
    // can reference built-in types but not types that don't exist anywhere
    pub fn apply_to(self, registry: &mut SchemaRegistry) -> EmptyResult {
        info!("loading {} types and {} kinds from schema config", self.types.len(), self.kinds.len());
        for schema in self.types {
            registry.add_type(schema)?;
        }
        for kind in self.kinds {
            registry.add_kind(kind);
        }
        registry.validate()
    }
}

// The built-in registry, plus whatever is in the (optional) config file
pub fn load_registry(filename: Option<&str>) -> anyhow::Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::builtin();
    if let Some(f) = filename {
        SchemaConfig::load(f)?.apply_to(&mut registry)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assertables::*;
    use rstest::*;

    use super::*;
    use crate::object::TypedObject;
    use crate::schema::FieldKind;

    const ROUTE_CONFIG: &str = "
---
types:
  - name: Route
    fields:
      - name: api_version
        kind: string
        serverManaged: true
      - name: kind
        kind: string
        serverManaged: true
      - name: metadata
        kind: object:ObjectMeta
      - name: spec
        kind: object:RouteSpec
  - name: RouteSpec
    fields:
      - name: host
        kind: string
        serverManaged: true
      - name: to
        kind: stringMap
      - name: tls_termination
        wireName: tlsTermination
        kind: string
kinds:
  - gvk: route.openshift.io/v1.Route
";

    #[rstest]
    fn test_load_and_apply() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("schema.yml");
        file.write_str(ROUTE_CONFIG).unwrap();

        let registry = load_registry(Some(file.path().to_str().unwrap())).unwrap();
        let kind = registry.kind("route").unwrap();
        assert_eq!(kind.plural, "routes");
        assert_eq!(kind.root_type, "Route");
        assert!(kind.namespaced);

        let spec = registry.type_schema("RouteSpec").unwrap();
        let host = spec.field("host").unwrap();
        assert!(host.server_managed);
        assert_eq!(host.wire_name, "host");
        assert_eq!(spec.field("to").unwrap().kind, FieldKind::Scalar(crate::schema::ScalarType::StringMap));

        // built-ins are still there
        assert_ok!(registry.kind("Service"));
        assert_ok!(TypedObject::from_wire(&registry, "Route", &serde_json::json!({"spec": {"host": "x"}})));
    }

    #[rstest]
    fn test_apply_dangling_type_ref() {
        let config: SchemaConfig = serde_yaml::from_str(
            "
---
types:
  - name: Thing
    fields:
      - name: spec
        kind: object:ThingSpec
",
        )
        .unwrap();
        let mut registry = SchemaRegistry::builtin();
        let err = config.apply_to(&mut registry).unwrap_err();
        assert_matches!(err.downcast_ref::<SchemaError>(), Some(SchemaError::UnknownType(_)));
    }

    #[rstest]
    fn test_apply_duplicate_wire_name() {
        let config: SchemaConfig = serde_yaml::from_str(
            "
---
types:
  - name: Thing
    fields:
      - name: foo
        kind: string
      - name: bar
        wireName: foo
        kind: integer
",
        )
        .unwrap();
        let mut registry = SchemaRegistry::new();
        let err = config.apply_to(&mut registry).unwrap_err();
        assert_matches!(err.downcast_ref::<SchemaError>(), Some(SchemaError::DuplicateField(_)));
    }

    #[rstest]
    fn test_round_trip_builtin() {
        let builtin = SchemaRegistry::builtin();
        let yaml = serde_yaml::to_string(&SchemaConfig::from_registry(&builtin)).unwrap();

        let mut registry = SchemaRegistry::new();
        serde_yaml::from_str::<SchemaConfig>(&yaml).unwrap().apply_to(&mut registry).unwrap();
        assert_eq!(registry.types().collect::<Vec<_>>(), builtin.types().collect::<Vec<_>>());
        assert_eq!(registry.kinds().collect::<Vec<_>>(), builtin.kinds().collect::<Vec<_>>());
    }
}
