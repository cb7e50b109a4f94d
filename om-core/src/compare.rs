use serde::Serialize;
use serde_json::Value;

use crate::errors::*;
use crate::jsonutils::{
    canonical_string,
    sort_canonical,
};
use crate::object::{
    FieldValue,
    Serializable,
    TypedObject,
    join_path,
};
use crate::schema::{
    FieldKind,
    FieldSchema,
    ScalarType,
    SchemaRegistry,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl DiffEntry {
    fn new(path: &str, expected: Option<&FieldValue>, actual: Option<&FieldValue>) -> DiffEntry {
        DiffEntry {
            path: path.into(),
            expected: expected.map(Serializable::to_dict),
            actual: actual.map(Serializable::to_dict),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ComparisonResult {
    #[serde(rename = "match")]
    pub matched: bool,
    pub diff: Vec<DiffEntry>,
}

impl ComparisonResult {
    pub fn is_match(&self) -> bool {
        self.matched
    }

    pub fn get(&self, path: &str) -> Option<&DiffEntry> {
        self.diff.iter().find(|d| d.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.diff.iter().map(|d| d.path.as_str()).collect()
    }
}

// The ObjectComparator walks two objects of the same type in the schema's declared field order
// and records one DiffEntry per mismatching leaf.  Unset and default-valued fields are treated as
// equivalent, and server-managed fields are only compared when `expected` sets them.  The first
// argument is always the "expected" side of each entry.
pub struct ObjectComparator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> ObjectComparator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> ObjectComparator<'a> {
        ObjectComparator { registry }
    }

    pub fn compare(&self, expected: &TypedObject, actual: &TypedObject) -> anyhow::Result<ComparisonResult> {
        ensure!(
            expected.type_name() == actual.type_name(),
            ReconcileError::resource_type_mismatch(&format!("{} != {}", expected.type_name(), actual.type_name()))
        );

        let mut diff = vec![];
        self.compare_objects(expected, actual, "", &mut diff)?;
        Ok(ComparisonResult { matched: diff.is_empty(), diff })
    }

    fn compare_objects(
        &self,
        expected: &TypedObject,
        actual: &TypedObject,
        at: &str,
        diff: &mut Vec<DiffEntry>,
    ) -> EmptyResult {
        let schema = self.registry.type_schema(expected.type_name())?;
        for field in &schema.fields {
            let (exp, act) = (expected.get(&field.name), actual.get(&field.name));
            if field.server_managed && exp.is_none_or(FieldValue::is_default) {
                continue;
            }

            let path = join_path(at, &field.name);
            match (exp, act) {
                // Nested objects present on both sides are always walked, even when one is empty,
                // so a mismatch is reported at the leaf and not at the enclosing object
                (Some(e @ FieldValue::Object(_)), Some(a @ FieldValue::Object(_))) => {
                    self.compare_values(field, e, a, &path, diff)?
                },
                _ => match (exp.filter(|v| !v.is_default()), act.filter(|v| !v.is_default())) {
                    (None, None) => (),
                    (Some(e), Some(a)) => self.compare_values(field, e, a, &path, diff)?,
                    (e, a) => diff.push(DiffEntry::new(&path, e, a)),
                },
            }
        }
        Ok(())
    }

    fn compare_values(
        &self,
        field: &FieldSchema,
        expected: &FieldValue,
        actual: &FieldValue,
        path: &str,
        diff: &mut Vec<DiffEntry>,
    ) -> EmptyResult {
        match (expected, actual) {
            (FieldValue::Scalar(e), FieldValue::Scalar(a)) => {
                if !scalars_equal(field, e, a) {
                    diff.push(DiffEntry::new(path, Some(expected), Some(actual)));
                }
            },
            (FieldValue::Object(e), FieldValue::Object(a)) => self.compare_objects(e, a, path, diff)?,
            (FieldValue::List(e), FieldValue::List(a)) => {
                let mut e: Vec<&TypedObject> = e.iter().collect();
                let mut a: Vec<&TypedObject> = a.iter().collect();
                if field.order_independent {
                    sort_canonical(&mut e, |o| o.to_dict());
                    sort_canonical(&mut a, |o| o.to_dict());
                }

                if e.len() != a.len() {
                    diff.push(DiffEntry::new(path, Some(expected), Some(actual)));
                    return Ok(());
                }

                for (i, (e, a)) in e.into_iter().zip(a).enumerate() {
                    self.compare_objects(e, a, &format!("{path}.{i}"), diff)?;
                }
            },

            // Objects built by hand (or decoded against a different schema) can disagree about
            // what kind a field is; that's a mismatch, not an error
            _ => diff.push(DiffEntry::new(path, Some(expected), Some(actual))),
        }
        Ok(())
    }
}

fn scalars_equal(field: &FieldSchema, expected: &Value, actual: &Value) -> bool {
    match (&field.kind, expected, actual) {
        (FieldKind::Scalar(ScalarType::StringList), Value::Array(e), Value::Array(a)) if field.order_independent => {
            let mut e: Vec<String> = e.iter().map(canonical_string).collect();
            let mut a: Vec<String> = a.iter().map(canonical_string).collect();
            e.sort();
            a.sort();
            e == a
        },
        _ => expected == actual,
    }
}
