use std::collections::BTreeMap;

use serde_json::{
    Map,
    Value,
};
use tracing::*;

use crate::errors::*;
use crate::schema::{
    FieldKind,
    SchemaRegistry,
};

// A TypedObject is one instance of a schema type: a bag of set fields, keyed by internal field
// name.  Fields that aren't set are simply absent; the schema (not the object) knows which fields
// exist, what kind they are, and in which order they're declared.
//
// TypedObjects own all their data, so cloning one gives a fully independent copy.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedObject {
    type_name: String,
    fields: BTreeMap<String, FieldValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Object(TypedObject),
    List(Vec<TypedObject>),
}

// Anything that can be turned into plain JSON.  `to_wire` uses the schema's wire names and is
// what goes over the network; `to_dict` keeps the internal names and is what we show in diffs
// and logs.
pub trait Serializable {
    fn to_wire(&self, registry: &SchemaRegistry) -> anyhow::Result<Value>;
    fn to_dict(&self) -> Value;
}

impl TypedObject {
    pub fn new(type_name: &str) -> TypedObject {
        TypedObject { type_name: type_name.into(), fields: BTreeMap::new() }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(field)
    }

    // Raw setter; no schema checks happen here.  The mapper and the wire decoder are the
    // schema-aware ways of populating an object.
    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn with(mut self, field: &str, value: FieldValue) -> TypedObject {
        self.set(field, value);
        self
    }

    pub fn unset(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    // Returns the nested object stored at `field`, creating an empty one of type `type_name` if
    // the field is unset (or holds something that isn't an object)
    pub fn object_entry(&mut self, field: &str, type_name: &str) -> &mut TypedObject {
        let entry = self
            .fields
            .entry(field.into())
            .or_insert_with(|| FieldValue::Object(TypedObject::new(type_name)));
        if !matches!(entry, FieldValue::Object(_)) {
            *entry = FieldValue::Object(TypedObject::new(type_name));
        }

        match entry {
            FieldValue::Object(obj) => obj,
            _ => unreachable!("entry was just set to an object"),
        }
    }

    // Looks up a value by dotted internal path; list elements are addressed by index, e.g.
    // "spec.containers.0.image"
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.get(head)?;
        match rest {
            None => Some(value),
            Some(rest) => value.lookup(rest),
        }
    }

    pub fn scalar(&self, path: &str) -> Option<&Value> {
        match self.lookup(path)? {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    // Decode a wire-format JSON object into a TypedObject of the given type.  Wire fields the
    // schema doesn't know about are dropped (servers routinely return more than we describe);
    // nulls are treated as unset.
    pub fn from_wire(registry: &SchemaRegistry, type_name: &str, value: &Value) -> anyhow::Result<TypedObject> {
        from_wire_at(registry, type_name, value, "")
    }
}

fn from_wire_at(registry: &SchemaRegistry, type_name: &str, value: &Value, at: &str) -> anyhow::Result<TypedObject> {
    let schema = registry.type_schema(type_name)?;
    let Value::Object(map) = value else {
        bail!(ReconcileError::type_mismatch(&format!("{}: expected {type_name} object, got {value}", display_path(at))));
    };

    let mut obj = TypedObject::new(type_name);
    for (key, v) in map {
        let Some(field) = schema.resolve(key) else {
            debug!("dropping unknown field {key} from {type_name}");
            continue;
        };
        if v.is_null() {
            continue;
        }

        let path = join_path(at, &field.name);
        let fv = match &field.kind {
            FieldKind::Scalar(t) => FieldValue::Scalar(t.coerce(v, &path)?),
            FieldKind::Object(t) => FieldValue::Object(from_wire_at(registry, t, v, &path)?),
            FieldKind::List(t) => {
                let Value::Array(items) = v else {
                    bail!(ReconcileError::type_mismatch(&format!("{path}: expected list of {t}, got {v}")));
                };
                FieldValue::List(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| from_wire_at(registry, t, item, &format!("{path}.{i}")))
                        .collect::<anyhow::Result<Vec<_>>>()?,
                )
            },
        };
        obj.set(&field.name, fv);
    }
    Ok(obj)
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() { segment.into() } else { format!("{prefix}.{segment}") }
}

fn display_path(at: &str) -> &str {
    if at.is_empty() { "<root>" } else { at }
}

impl FieldValue {
    // "Default" values are the ones a server is free to drop or leave out: null, false, zero,
    // empty strings, and empty maps, lists, or objects
    pub fn is_default(&self) -> bool {
        match self {
            FieldValue::Scalar(v) => match v {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
            },
            FieldValue::Object(obj) => obj.fields.values().all(FieldValue::is_default),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    fn lookup(&self, path: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Object(obj) => obj.lookup(path),
            FieldValue::List(items) => {
                let (idx, rest) = match path.split_once('.') {
                    Some((idx, rest)) => (idx, Some(rest)),
                    None => (path, None),
                };
                let item = items.get(idx.parse::<usize>().ok()?)?;
                match rest {
                    None => None,
                    Some(rest) => item.lookup(rest),
                }
            },
            FieldValue::Scalar(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&TypedObject> {
        match self {
            FieldValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedObject]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Scalar(v)
    }
}

impl Serializable for TypedObject {
    fn to_wire(&self, registry: &SchemaRegistry) -> anyhow::Result<Value> {
        let schema = registry.type_schema(&self.type_name)?;
        let mut map = Map::new();

        // walk in declared order so that the output doesn't depend on how we store fields
        for field in &schema.fields {
            if let Some(v) = self.fields.get(&field.name) {
                map.insert(field.wire_name.clone(), v.to_wire(registry)?);
            }
        }

        if let Some(unknown) = self.fields.keys().find(|k| schema.field(k).is_none()) {
            bail!(ReconcileError::unknown_field(&format!("{}.{unknown}", self.type_name)));
        }
        Ok(Value::Object(map))
    }

    fn to_dict(&self) -> Value {
        Value::Object(self.fields.iter().map(|(k, v)| (k.clone(), v.to_dict())).collect())
    }
}

impl Serializable for FieldValue {
    fn to_wire(&self, registry: &SchemaRegistry) -> anyhow::Result<Value> {
        match self {
            FieldValue::Scalar(v) => Ok(v.clone()),
            FieldValue::Object(obj) => obj.to_wire(registry),
            FieldValue::List(items) => Ok(Value::Array(
                items.iter().map(|i| i.to_wire(registry)).collect::<anyhow::Result<_>>()?,
            )),
        }
    }

    fn to_dict(&self) -> Value {
        match self {
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Object(obj) => obj.to_dict(),
            FieldValue::List(items) => Value::Array(items.iter().map(Serializable::to_dict).collect()),
        }
    }
}
