use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{
    DeleteParams,
    DynamicObject,
    Patch,
    PatchParams,
    PostParams,
};
use kube::error::ErrorResponse;
use serde_json::Value;
use tracing::*;

use super::*;
use crate::errors::*;
use crate::object::TypedObject;
use crate::schema::{
    ResourceKind,
    SchemaRegistry,
};

// Groups whose built-in types understand strategic merge patches; everything else (CRDs,
// aggregated APIs) only takes JSON merge patches
const STRATEGIC_MERGE_GROUPS: &[&str] = &["", "apps"];

// A ResourceClient backed by kube's dynamic API.  The ApiResource for each kind comes straight
// from the schema registry, so no discovery calls are made.
pub struct KubeResourceClient {
    client: kube::Client,
    registry: Arc<SchemaRegistry>,
}

impl KubeResourceClient {
    pub fn new(client: kube::Client, registry: Arc<SchemaRegistry>) -> KubeResourceClient {
        KubeResourceClient { client, registry }
    }

    fn api_for(&self, kind: &ResourceKind, namespace: Option<&str>) -> kube::Api<DynamicObject> {
        let ar = kind.gvk.api_resource(&kind.plural);
        match (kind.namespaced, namespace) {
            (true, Some(ns)) => kube::Api::namespaced_with(self.client.clone(), ns, &ar),
            (true, None) => kube::Api::default_namespaced_with(self.client.clone(), &ar),
            (false, _) => kube::Api::all_with(self.client.clone(), &ar),
        }
    }

    fn decode(&self, kind: &ResourceKind, obj: &DynamicObject) -> anyhow::Result<TypedObject> {
        let wire = serde_json::to_value(obj)?;
        TypedObject::from_wire(&self.registry, &kind.root_type, &wire)
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn create(&self, kind: &ResourceKind, namespace: Option<&str>, body: &Value) -> anyhow::Result<TypedObject> {
        let obj: DynamicObject = serde_json::from_value(body.clone())?;
        debug!("creating {} in namespace {namespace:?}", kind.kind());
        let created = self
            .api_for(kind, namespace)
            .create(&PostParams::default(), &obj)
            .await
            .map_err(from_kube_err)?;
        self.decode(kind, &created)
    }

    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
    ) -> anyhow::Result<Option<TypedObject>> {
        match self.api_for(kind, namespace).get_opt(name).await.map_err(from_kube_err)? {
            Some(obj) => Ok(Some(self.decode(kind, &obj)?)),
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
        let patch = if STRATEGIC_MERGE_GROUPS.contains(&kind.gvk.group.as_str()) {
            Patch::Strategic(body)
        } else {
            Patch::Merge(body)
        };

        debug!("patching {} {name}", kind.kind());
        let patched = self
            .api_for(kind, namespace)
            .patch(name, &PatchParams::default(), &patch)
            .await
            .map_err(from_kube_err)?;
        self.decode(kind, &patched)
    }

    async fn replace(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TypedObject> {
        let obj: DynamicObject = serde_json::from_value(body.clone())?;
        debug!("replacing {} {name}", kind.kind());
        let replaced = self
            .api_for(kind, namespace)
            .replace(name, &PostParams::default(), &obj)
            .await
            .map_err(from_kube_err)?;
        self.decode(kind, &replaced)
    }

    async fn delete(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> EmptyResult {
        debug!("deleting {} {name}", kind.kind());
        self.api_for(kind, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(from_kube_err)?;
        Ok(())
    }
}

fn from_kube_err(err: kube::Error) -> anyhow::Error {
    match err {
        kube::Error::Api(ErrorResponse { code, reason, message, .. }) => {
            TransportError::status(&ApiStatus { code, reason, message })
        },
        err => err.into(),
    }
}
