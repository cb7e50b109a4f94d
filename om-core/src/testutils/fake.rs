use std::collections::BTreeMap;
use std::sync::{
    Arc,
    Mutex,
};

use async_trait::async_trait;
use json_patch_ext::prelude::*;
use serde_json::{
    Value,
    json,
};

use crate::constants::*;
use crate::errors::*;
use crate::jsonutils::add_at;
use crate::k8s::{
    ApiStatus,
    ResourceClient,
    TransportError,
};
use crate::object::TypedObject;
use crate::schema::{
    ResourceKind,
    SchemaRegistry,
};

const STATUS_INVALID: u16 = 422;
const FAKE_CREATION_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

// Kept across a replace, since the request body doesn't (and can't) set them
const PRESERVED_FIELDS: &[&str] = &["/metadata/uid", "/metadata/creationTimestamp", "/status"];

// An in-memory apiserver: objects are stored as wire JSON, keyed by plural/namespace/name.  It
// does the handful of things a real server does that matter to reconciliation: it fills in
// server-managed fields (uid, resourceVersion, a Service's clusterIP, a Pod's status), applies
// patches as JSON merge patches, and rejects replaces that change an immutable field.
pub struct FakeResourceClient {
    registry: Arc<SchemaRegistry>,
    objects: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl FakeResourceClient {
    pub fn new(registry: Arc<SchemaRegistry>) -> FakeResourceClient {
        FakeResourceClient {
            registry,
            objects: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(vec![]),
        }
    }

    // Every call made so far, as "<verb> <plural>/<namespace>/<name>"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> Option<Value> {
        self.objects.lock().unwrap().get(&key(kind, name, namespace)).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, verb: &str, key: &str) {
        self.calls.lock().unwrap().push(format!("{verb} {key}"));
    }

    fn decode(&self, kind: &ResourceKind, wire: &Value) -> anyhow::Result<TypedObject> {
        TypedObject::from_wire(&self.registry, &kind.root_type, wire)
    }

    fn wire_ptr(&self, kind: &ResourceKind, path: &str) -> anyhow::Result<PointerBuf> {
        let fields = self.registry.resolve_path(&kind.root_type, path)?;
        Ok(PointerBuf::from_tokens(fields.iter().map(|f| f.wire_name.as_str())))
    }
}

fn key(kind: &ResourceKind, name: &str, namespace: Option<&str>) -> String {
    format!("{}/{}/{name}", kind.plural, namespace.unwrap_or_default())
}

fn not_found(key: &str) -> anyhow::Error {
    TransportError::status(&ApiStatus::not_found(key))
}

fn invalid(message: &str) -> anyhow::Error {
    TransportError::status(&ApiStatus::new(STATUS_INVALID, "Invalid", message))
}

fn resource_version(obj: &Value) -> u64 {
    format_ptr!("/metadata/resourceVersion")
        .resolve(obj)
        .ok()
        .and_then(Value::as_str)
        .and_then(|rv| rv.parse().ok())
        .unwrap_or_default()
}

#[async_trait]
impl ResourceClient for FakeResourceClient {
    async fn create(&self, kind: &ResourceKind, namespace: Option<&str>, body: &Value) -> anyhow::Result<TypedObject> {
        let Some(name) = format_ptr!("/metadata/name").resolve(body).ok().and_then(Value::as_str) else {
            return Err(invalid("metadata.name: Required value"));
        };
        let k = key(kind, name, namespace);
        self.record("create", &k);

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&k) {
            return Err(TransportError::status(&ApiStatus::conflict(&k)));
        }

        let n = objects.len() + 1;
        let mut obj = body.clone();
        if let Some(ns) = namespace {
            add_at(&mut obj, &format_ptr!("/metadata/namespace"), json!(ns))?;
        }
        add_at(&mut obj, &format_ptr!("/metadata/uid"), json!(format!("uid-{n}")))?;
        add_at(&mut obj, &format_ptr!("/metadata/resourceVersion"), json!("1"))?;
        add_at(&mut obj, &format_ptr!("/metadata/creationTimestamp"), json!(FAKE_CREATION_TIMESTAMP))?;
        match kind.kind() {
            SERVICE_KIND if format_ptr!("/spec/clusterIP").resolve(&obj).is_err() => {
                add_at(&mut obj, &format_ptr!("/spec/clusterIP"), json!(format!("10.0.0.{n}")))?;
                add_at(&mut obj, &format_ptr!("/spec/sessionAffinity"), json!("None"))?;
            },
            POD_KIND => {
                add_at(&mut obj, &format_ptr!("/status"), json!({"phase": "Pending", "hostIP": "10.1.0.1"}))?;
            },
            _ => (),
        }

        let res = self.decode(kind, &obj)?;
        objects.insert(k, obj);
        Ok(res)
    }

    async fn get(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> anyhow::Result<Option<TypedObject>> {
        let k = key(kind, name, namespace);
        self.record("get", &k);
        match self.objects.lock().unwrap().get(&k) {
            Some(obj) => Ok(Some(self.decode(kind, obj)?)),
            None => Ok(None),
        }
    }

    async fn patch(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TypedObject> {
        let k = key(kind, name, namespace);
        self.record("patch", &k);

        let mut objects = self.objects.lock().unwrap();
        let obj = objects.get_mut(&k).ok_or_else(|| not_found(&k))?;
        let rv = resource_version(obj);
        json_patch::merge(obj, body);
        add_at(obj, &format_ptr!("/metadata/resourceVersion"), json!((rv + 1).to_string()))?;
        self.decode(kind, obj)
    }

    async fn replace(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TypedObject> {
        let k = key(kind, name, namespace);
        self.record("replace", &k);

        let mut objects = self.objects.lock().unwrap();
        let existing = objects.get(&k).ok_or_else(|| not_found(&k))?;
        for path in &kind.immutable_fields {
            let ptr = self.wire_ptr(kind, path)?;
            if ptr.resolve(existing).ok() != ptr.resolve(body).ok() {
                return Err(invalid(&format!("{ptr}: field is immutable")));
            }
        }

        let mut obj = body.clone();
        for server_field in PRESERVED_FIELDS {
            let ptr = PointerBuf::parse(*server_field)?;
            if let Ok(v) = ptr.resolve(existing) {
                add_at(&mut obj, &ptr, v.clone())?;
            }
        }
        if let Some(ns) = namespace {
            add_at(&mut obj, &format_ptr!("/metadata/namespace"), json!(ns))?;
        }
        add_at(
            &mut obj,
            &format_ptr!("/metadata/resourceVersion"),
            json!((resource_version(existing) + 1).to_string()),
        )?;

        let res = self.decode(kind, &obj)?;
        objects.insert(k, obj);
        Ok(res)
    }

    async fn delete(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> EmptyResult {
        let k = key(kind, name, namespace);
        self.record("delete", &k);
        match self.objects.lock().unwrap().remove(&k) {
            Some(_) => Ok(()),
            None => Err(not_found(&k)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn test_resource_version() {
        assert_eq!(resource_version(&json!({"metadata": {"resourceVersion": "7"}})), 7);
        assert_eq!(resource_version(&json!({"metadata": {}})), 0);
        assert_eq!(resource_version(&json!({"metadata": {"resourceVersion": "abc"}})), 0);
    }
}
