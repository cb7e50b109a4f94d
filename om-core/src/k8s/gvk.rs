use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use kube::api::{
    ApiResource,
    GroupVersionKind,
    TypeMeta,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de,
};

// GVK is a "newtype" wrapper around kube's GroupVersionKind that gives us a compact string
// serialization for use in schema config files, along with a few conversion helpers.
//
// The string format is "group/version.kind", unless the group is "core", in which case it's
// "version.kind"; we also accept "/version.kind" when deserializing.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct GVK(GroupVersionKind);

impl GVK {
    pub fn new(group: &str, version: &str, kind: &str) -> GVK {
        GVK(GroupVersionKind::gvk(group, version, kind))
    }

    pub fn from_api_version(api_version: &str, kind: &str) -> anyhow::Result<GVK> {
        let parts: Vec<_> = api_version.split('/').collect();

        match parts.len() {
            1 => Ok(GVK::new("", parts[0], kind)),
            2 => Ok(GVK::new(parts[0], parts[1], kind)),
            _ => anyhow::bail!("invalid format for api_version: {api_version}"),
        }
    }

    pub fn into_type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.0.api_version(),
            kind: self.0.kind.clone(),
        }
    }

    // We always know the plural name from the schema, so we don't need to go through discovery
    pub fn api_resource(&self, plural: &str) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.0, plural)
    }
}

// Impl Deref lets a GVK act like a GroupVersionKind anywhere one of those is expected
impl Deref for GVK {
    type Target = GroupVersionKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut group = Cow::from(&self.0.group);
        if !group.is_empty() {
            group.to_mut().push('/');
        }

        write!(f, "{group}{}.{}", self.0.version, self.0.kind)
    }
}

impl Serialize for GVK {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

struct GVKVisitor;

impl<'de> de::Visitor<'de> for GVKVisitor {
    type Value = GVK;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a GroupVersionKind in the format group/version.kind")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let p1: Vec<_> = value.split('/').collect();
        let (group, rest) = match p1.len() {
            2 => (p1[0], p1[1]),
            1 => ("", p1[0]),
            _ => return Err(E::custom(format!("invalid format for gvk: {value}"))),
        };
        let p2: Vec<_> = rest.split('.').collect();
        let (version, kind) = match p2.len() {
            2 => (p2[0], p2[1]),
            _ => return Err(E::custom(format!("invalid format for gvk: {value}"))),
        };

        Ok(GVK::new(group, version, kind))
    }
}

impl<'de> Deserialize<'de> for GVK {
    fn deserialize<D>(deserializer: D) -> Result<GVK, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(GVKVisitor)
    }
}
