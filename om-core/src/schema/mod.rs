mod builtin;
mod kind;
mod naming;
mod scalar;

use std::collections::{
    BTreeMap,
    HashSet,
};
use std::ops::Not;

pub use builtin::BUILTIN_REGISTRY;
pub use kind::FieldKind;
pub use naming::camel_case;
pub use scalar::ScalarType;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::errors::*;
use crate::k8s::GVK;

// Schemas are the explicit stand-in for the generated model classes: one table per type listing
// every field in declared order with its internal (snake_case) name, wire (camelCase) name, kind,
// and provenance.  Everything that reads or writes a TypedObject goes through these tables.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldConfig {
    name: String,
    wire_name: Option<String>,
    kind: FieldKind,

    #[serde(default)]
    server_managed: bool,

    #[serde(default)]
    order_independent: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", from = "FieldConfig")]
pub struct FieldSchema {
    pub name: String,
    pub wire_name: String,
    pub kind: FieldKind,

    // Fields the server populates (status blocks, generated identifiers, ...); these are only
    // compared when the expected object sets them
    #[serde(skip_serializing_if = "<&bool>::not")]
    pub server_managed: bool,

    // Lists (object lists or stringList scalars) whose element order carries no meaning
    #[serde(skip_serializing_if = "<&bool>::not")]
    pub order_independent: bool,
}

impl From<FieldConfig> for FieldSchema {
    fn from(config: FieldConfig) -> Self {
        FieldSchema {
            wire_name: config.wire_name.unwrap_or_else(|| camel_case(&config.name)),
            name: config.name,
            kind: config.kind,
            server_managed: config.server_managed,
            order_independent: config.order_independent,
        }
    }
}

impl FieldSchema {
    pub fn new(name: &str, kind: FieldKind) -> FieldSchema {
        FieldSchema {
            name: name.into(),
            wire_name: camel_case(name),
            kind,
            server_managed: false,
            order_independent: false,
        }
    }

    pub fn scalar(name: &str, scalar_type: ScalarType) -> FieldSchema {
        FieldSchema::new(name, FieldKind::Scalar(scalar_type))
    }

    pub fn object(name: &str, type_ref: &str) -> FieldSchema {
        FieldSchema::new(name, FieldKind::Object(type_ref.into()))
    }

    pub fn list(name: &str, type_ref: &str) -> FieldSchema {
        FieldSchema::new(name, FieldKind::List(type_ref.into()))
    }

    pub fn with_wire_name(mut self, wire_name: &str) -> FieldSchema {
        self.wire_name = wire_name.into();
        self
    }

    pub fn managed_by_server(mut self) -> FieldSchema {
        self.server_managed = true;
        self
    }

    pub fn unordered(mut self) -> FieldSchema {
        self.order_independent = true;
        self
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl TypeSchema {
    pub fn new(name: &str, fields: Vec<FieldSchema>) -> TypeSchema {
        TypeSchema { name: name.into(), fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_wire_name(&self, wire_name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    // Internal names win over wire names; validate() guarantees the two can't disagree
    pub fn resolve(&self, name: &str) -> Option<&FieldSchema> {
        self.field(name).or_else(|| self.field_by_wire_name(name))
    }

    // Every name, internal or wire, has to point at exactly one field
    pub fn validate(&self) -> EmptyResult {
        let mut internal = HashSet::new();
        let mut wire = HashSet::new();
        for f in &self.fields {
            ensure!(internal.insert(f.name.as_str()), SchemaError::duplicate_field(&format!("{}.{}", self.name, f.name)));
            ensure!(
                wire.insert(f.wire_name.as_str()),
                SchemaError::duplicate_field(&format!("{}.{}", self.name, f.wire_name))
            );
        }

        for f in &self.fields {
            if let Some(other) = self.field(&f.wire_name) {
                ensure!(
                    other.name == f.name,
                    SchemaError::duplicate_field(&format!("{}.{} (wire name of {})", self.name, f.wire_name, f.name))
                );
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KindConfig {
    gvk: GVK,
    plural: Option<String>,

    #[serde(default = "default_true")]
    namespaced: bool,

    root_type: Option<String>,

    #[serde(default = "default_true")]
    name_required: bool,

    #[serde(default)]
    immutable_fields: Vec<String>,
}

fn default_true() -> bool {
    true
}

// Envelope information for a top-level resource kind: which type describes its body, how it's
// addressed on the apiserver, and which of its fields can't change after creation
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", from = "KindConfig")]
pub struct ResourceKind {
    pub gvk: GVK,
    pub plural: String,
    pub namespaced: bool,
    pub root_type: String,
    pub name_required: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub immutable_fields: Vec<String>,
}

impl From<KindConfig> for ResourceKind {
    fn from(config: KindConfig) -> Self {
        ResourceKind {
            plural: config.plural.unwrap_or_else(|| format!("{}s", config.gvk.kind.to_lowercase())),
            root_type: config.root_type.unwrap_or_else(|| config.gvk.kind.clone()),
            gvk: config.gvk,
            namespaced: config.namespaced,
            name_required: config.name_required,
            immutable_fields: config.immutable_fields,
        }
    }
}

impl ResourceKind {
    pub fn new(gvk: &GVK, plural: &str) -> ResourceKind {
        ResourceKind {
            gvk: gvk.clone(),
            plural: plural.into(),
            namespaced: true,
            root_type: gvk.kind.clone(),
            name_required: true,
            immutable_fields: vec![],
        }
    }

    pub fn cluster_scoped(mut self) -> ResourceKind {
        self.namespaced = false;
        self
    }

    pub fn with_immutable_fields(mut self, paths: &[&str]) -> ResourceKind {
        self.immutable_fields = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn kind(&self) -> &str {
        &self.gvk.kind
    }

    pub fn api_version(&self) -> String {
        self.gvk.api_version()
    }
}

// Kinds are looked up by their canonical name ("PodDisruptionBudget"), but the same kind is also
// reachable through the resource-style spellings used in scenario file names and parameters
// ("pod_disruption_budget", "poddisruptionbudget")
fn kind_key(name: &str) -> String {
    name.chars().filter(|c| *c != '_' && *c != '-').flat_map(char::to_lowercase).collect()
}

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, TypeSchema>,
    kinds: BTreeMap<String, ResourceKind>,
}

impl SchemaRegistry {
    pub fn new() -> SchemaRegistry {
        SchemaRegistry::default()
    }

    pub fn builtin() -> SchemaRegistry {
        BUILTIN_REGISTRY.clone()
    }

    pub fn add_type(&mut self, schema: TypeSchema) -> EmptyResult {
        schema.validate()?;
        if self.types.contains_key(&schema.name) {
            debug!("replacing schema for type {}", schema.name);
        }
        self.types.insert(schema.name.clone(), schema);
        Ok(())
    }

    pub fn add_kind(&mut self, kind: ResourceKind) {
        let key = kind_key(kind.kind());
        if self.kinds.contains_key(&key) {
            debug!("replacing resource kind {}", kind.gvk);
        }
        self.kinds.insert(key, kind);
    }

    pub fn merge(&mut self, other: SchemaRegistry) -> EmptyResult {
        for schema in other.types.into_values() {
            self.add_type(schema)?;
        }
        for kind in other.kinds.into_values() {
            self.add_kind(kind);
        }
        Ok(())
    }

    // Checks that the registry is closed: every type reference resolves, every kind has a root
    // type, and every immutable field path points at a real field
    pub fn validate(&self) -> EmptyResult {
        for schema in self.types.values() {
            schema.validate()?;
            for f in &schema.fields {
                if let Some(type_ref) = f.kind.type_ref() {
                    ensure!(
                        self.types.contains_key(type_ref),
                        SchemaError::unknown_type(&format!("{type_ref} (referenced by {}.{})", schema.name, f.name))
                    );
                }
            }
        }

        for kind in self.kinds.values() {
            self.type_schema(&kind.root_type)?;
            for path in &kind.immutable_fields {
                self.resolve_path(&kind.root_type, path)?;
            }
        }
        Ok(())
    }

    pub fn type_schema(&self, name: &str) -> anyhow::Result<&TypeSchema> {
        self.types.get(name).ok_or_else(|| SchemaError::unknown_type(name))
    }

    pub fn kind(&self, name: &str) -> anyhow::Result<&ResourceKind> {
        self.kinds.get(&kind_key(name)).ok_or_else(|| SchemaError::unknown_kind(name))
    }

    pub fn kind_for_type(&self, type_name: &str) -> Option<&ResourceKind> {
        self.kinds.values().find(|k| k.root_type == type_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSchema> {
        self.types.values()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.values()
    }

    // Resolves a dotted path ("spec.cluster_ip" or "spec.clusterIP") to the chain of fields it
    // passes through; every segment but the last has to be a nested object field
    pub fn resolve_path(&self, type_name: &str, path: &str) -> anyhow::Result<Vec<&FieldSchema>> {
        self.resolve_dotted(self.type_schema(type_name)?, path)
            .ok_or_else(|| ReconcileError::unknown_field(&format!("{type_name}.{path}")))
    }

    // Resolves a parameter key against a type: dotted keys segment by segment, everything else
    // by the underscore rules in `resolve_underscored`
    pub fn resolve_key<'a>(&'a self, schema: &'a TypeSchema, key: &str) -> Option<Vec<&'a FieldSchema>> {
        if key.contains('.') {
            self.resolve_dotted(schema, key)
        } else {
            self.resolve_underscored(schema, key)
        }
    }

    fn resolve_dotted<'a>(&'a self, schema: &'a TypeSchema, path: &str) -> Option<Vec<&'a FieldSchema>> {
        let mut fields = vec![];
        let mut cur = schema;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let field = cur.resolve(segment)?;
            fields.push(field);
            if segments.peek().is_some() {
                let FieldKind::Object(type_ref) = &field.kind else {
                    return None;
                };
                cur = self.types.get(type_ref)?;
            }
        }
        Some(fields)
    }

    // Underscored keys flatten a path through nested objects ("spec_template_spec_containers").
    // Since field names contain underscores themselves, an exact field match always wins;
    // otherwise we try the nested object fields whose name is a prefix of the key, longest name
    // first, and take the first one where the remainder resolves.
    fn resolve_underscored<'a>(&'a self, schema: &'a TypeSchema, key: &str) -> Option<Vec<&'a FieldSchema>> {
        if let Some(field) = schema.resolve(key) {
            return Some(vec![field]);
        }

        let mut candidates: Vec<(&FieldSchema, &TypeSchema, &str)> = schema
            .fields
            .iter()
            .filter_map(|field| {
                let FieldKind::Object(type_ref) = &field.kind else {
                    return None;
                };
                let rest = key.strip_prefix(field.name.as_str())?.strip_prefix('_')?;
                Some((field, self.types.get(type_ref)?, rest))
            })
            .collect();
        candidates.sort_by_key(|(field, ..)| std::cmp::Reverse(field.name.len()));

        candidates.into_iter().find_map(|(field, nested, rest)| {
            let mut path = self.resolve_underscored(nested, rest)?;
            path.insert(0, field);
            Some(path)
        })
    }

    pub(crate) fn from_parts(types: Vec<TypeSchema>, kinds: Vec<ResourceKind>) -> SchemaRegistry {
        SchemaRegistry {
            types: types.into_iter().map(|t| (t.name.clone(), t)).collect(),
            kinds: kinds.into_iter().map(|k| (kind_key(k.kind()), k)).collect(),
        }
    }
}

#[cfg(test)]
mod tests;
