use std::collections::BTreeMap;

use serde_json::{
    Map,
    Value,
};
use tracing::*;

use crate::constants::*;
use crate::errors::*;
use crate::object::{
    FieldValue,
    TypedObject,
    join_path,
};
use crate::schema::{
    FieldKind,
    FieldSchema,
    SchemaRegistry,
    TypeSchema,
};

// Parameters are kept sorted so that they're always applied in the same order
pub type ParameterSet = BTreeMap<String, Value>;

// The ParameterMapper writes a flat set of user-facing parameters onto a TypedObject.  Keys are
// resolved against the target's schema (see `resolve_root_key` for the rules), values are coerced
// to the declared field types, nested maps are merged into the existing nested objects, and lists
// replace whatever was there before.
//
// Application is NOT atomic: if a parameter fails to resolve or coerce, everything applied before
// it stays applied.  Callers that need all-or-nothing behaviour should apply to a clone.
pub struct ParameterMapper<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> ParameterMapper<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> ParameterMapper<'a> {
        ParameterMapper { registry }
    }

    pub fn apply<'t>(&self, params: &ParameterSet, target: &'t mut TypedObject) -> anyhow::Result<&'t mut TypedObject> {
        let schema = self.registry.type_schema(target.type_name())?;
        for (key, value) in params {
            let Some(path) = self.resolve_root_key(schema, key)? else {
                debug!("skipping control parameter {key}");
                continue;
            };
            self.set_path(target, &path, value, "")?;
        }
        Ok(target)
    }

    // Root-level keys are tried, in order, as:
    //   1. a metadata shorthand (name, namespace, labels, annotations);
    //   2. a connection/control parameter, which is skipped;
    //   3. a dotted or underscored path from the root type;
    //   4. a path from the root type's spec block (so "containers" means "spec.containers").
    fn resolve_root_key(&self, schema: &'a TypeSchema, key: &str) -> anyhow::Result<Option<Vec<&'a FieldSchema>>> {
        if METADATA_PARAMS.contains(&key)
            && let Some(path) = self.registry.resolve_key(schema, &format!("{METADATA_FIELD}.{key}"))
        {
            return Ok(Some(path));
        }

        if IGNORED_PARAMS.contains(&key) {
            return Ok(None);
        }

        if let Some(path) = self.registry.resolve_key(schema, key) {
            return Ok(Some(path));
        }

        if let Some(spec) = schema.field(SPEC_FIELD)
            && let FieldKind::Object(spec_type) = &spec.kind
            && let Some(mut path) = self.registry.resolve_key(self.registry.type_schema(spec_type)?, key)
        {
            path.insert(0, spec);
            return Ok(Some(path));
        }

        bail!(ReconcileError::unknown_field(&format!("{}.{key}", schema.name)));
    }

    // Walks (and creates, where needed) the nested objects along `path` and sets the last field
    fn set_path(&self, target: &mut TypedObject, path: &[&FieldSchema], value: &Value, at: &str) -> EmptyResult {
        let Some((last, parents)) = path.split_last() else {
            bail!(ReconcileError::unknown_field(at));
        };

        let mut cur = target;
        let mut cur_path = at.to_string();
        for field in parents {
            cur_path = join_path(&cur_path, &field.name);
            let FieldKind::Object(type_ref) = &field.kind else {
                bail!(ReconcileError::type_mismatch(&format!("{cur_path}: expected nested object, got {}", field.kind)));
            };
            cur = cur.object_entry(&field.name, type_ref);
        }

        self.set_field(cur, last, value, &join_path(&cur_path, &last.name))
    }

    fn set_field(&self, target: &mut TypedObject, field: &FieldSchema, value: &Value, at: &str) -> EmptyResult {
        if value.is_null() {
            target.unset(&field.name);
            return Ok(());
        }

        match &field.kind {
            FieldKind::Scalar(t) => target.set(&field.name, FieldValue::Scalar(t.coerce(value, at)?)),
            FieldKind::Object(t) => {
                let Value::Object(map) = value else {
                    bail!(ReconcileError::type_mismatch(&format!("{at}: expected {t} object, got {value}")));
                };
                self.apply_map(map, target.object_entry(&field.name, t), at)?;
            },
            FieldKind::List(t) => {
                let Value::Array(items) = value else {
                    bail!(ReconcileError::type_mismatch(&format!("{at}: expected list of {t}, got {value}")));
                };

                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{at}.{i}");
                    let Value::Object(map) = item else {
                        bail!(ReconcileError::type_mismatch(&format!("{item_path}: expected {t} object, got {item}")));
                    };
                    let mut obj = TypedObject::new(t);
                    self.apply_map(map, &mut obj, &item_path)?;
                    list.push(obj);
                }
                target.set(&field.name, FieldValue::List(list));
            },
        }
        Ok(())
    }

    // Nested maps only understand paths relative to their own type; the metadata and spec
    // shorthands are a root-level convenience
    fn apply_map(&self, map: &Map<String, Value>, target: &mut TypedObject, at: &str) -> EmptyResult {
        let schema = self.registry.type_schema(target.type_name())?;
        for (key, value) in map {
            let path = self
                .registry
                .resolve_key(schema, key)
                .ok_or_else(|| ReconcileError::unknown_field(&join_path(at, key)))?;
            self.set_path(target, &path, value, at)?;
        }
        Ok(())
    }
}
