use serde_json::Value;
use tracing::*;

use crate::body::RequestBodyBuilder;
use crate::compare::{
    ComparisonResult,
    ObjectComparator,
};
use crate::mapper::{
    ParameterMapper,
    ParameterSet,
};
use crate::object::{
    Serializable,
    TypedObject,
};
use crate::schema::SchemaRegistry;

// The Reconciler bundles the mapper, comparator, and body builder around one registry; it's the
// interface the CLI and the scenario runner use.
pub struct Reconciler<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Reconciler<'a> {
        Reconciler { registry }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    // An empty object of the given kind's root type
    pub fn new_object(&self, kind: &str) -> anyhow::Result<TypedObject> {
        Ok(TypedObject::new(&self.registry.kind(kind)?.root_type))
    }

    pub fn object_from_params<'t>(
        &self,
        params: &ParameterSet,
        obj: &'t mut TypedObject,
    ) -> anyhow::Result<&'t mut TypedObject> {
        ParameterMapper::new(self.registry).apply(params, obj)
    }

    pub fn objects_match(&self, expected: &TypedObject, actual: &TypedObject) -> anyhow::Result<ComparisonResult> {
        ObjectComparator::new(self.registry).compare(expected, actual)
    }

    pub fn request_body_from_params(&self, params: &ParameterSet, kind: &str) -> anyhow::Result<Value> {
        RequestBodyBuilder::new(self.registry).build(params, kind)
    }

    // Checks that a server object reflects the given parameters: the parameters are applied to a
    // copy of `actual`, and `actual` is compared against the copy.  Any field the parameters
    // changed shows up in the diff.
    pub fn verify_params(&self, actual: &TypedObject, params: &ParameterSet) -> anyhow::Result<ComparisonResult> {
        let mut requested = actual.clone();
        self.object_from_params(params, &mut requested)?;

        debug!("parameters: {}", serde_json::to_string_pretty(params)?);
        debug!("server object: {}", serde_json::to_string_pretty(&actual.to_dict())?);
        debug!("from parameters: {}", serde_json::to_string_pretty(&requested.to_dict())?);

        let res = self.objects_match(actual, &requested)?;
        if !res.is_match() {
            warn!("{} does not match its parameters", actual.type_name());
            warn!("differences: {}", serde_json::to_string_pretty(&res.diff)?);
        }
        Ok(res)
    }

    pub fn decode(&self, kind: &str, wire: &Value) -> anyhow::Result<TypedObject> {
        TypedObject::from_wire(self.registry, &self.registry.kind(kind)?.root_type, wire)
    }

    pub fn encode(&self, obj: &TypedObject) -> anyhow::Result<Value> {
        obj.to_wire(self.registry)
    }
}
