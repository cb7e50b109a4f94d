use std::fmt;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de,
};

use super::ScalarType;

const OBJECT_PREFIX: &str = "object";
const LIST_PREFIX: &str = "list";

// The declared kind of a field: a scalar leaf, a nested typed object, or an ordered list of typed
// objects.  Type references are type names in the schema registry.
//
// In config files a field kind is written as a single string: the scalar type name ("string",
// "stringMap", ...), or "object:TypeName" / "list:TypeName".
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Object(String),
    List(String),
}

impl FieldKind {
    pub fn type_ref(&self) -> Option<&str> {
        match self {
            FieldKind::Scalar(_) => None,
            FieldKind::Object(t) | FieldKind::List(t) => Some(t),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldKind::Scalar(t) => write!(f, "{t}"),
            FieldKind::Object(t) => write!(f, "{OBJECT_PREFIX}:{t}"),
            FieldKind::List(t) => write!(f, "{LIST_PREFIX}:{t}"),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

struct FieldKindVisitor;

impl<'de> de::Visitor<'de> for FieldKindVisitor {
    type Value = FieldKind;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar type name, object:TypeName, or list:TypeName")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value.split_once(':') {
            Some((OBJECT_PREFIX, t)) if !t.is_empty() => Ok(FieldKind::Object(t.into())),
            Some((LIST_PREFIX, t)) if !t.is_empty() => Ok(FieldKind::List(t.into())),
            Some(_) => Err(E::custom(format!("invalid field kind: {value}"))),
            None => ScalarType::from_name(value)
                .map(FieldKind::Scalar)
                .ok_or_else(|| E::custom(format!("unknown scalar type: {value}"))),
        }
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<FieldKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(FieldKindVisitor)
    }
}
