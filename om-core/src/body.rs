use json_patch_ext::prelude::*;
use serde_json::{
    Map,
    Value,
};
use tracing::*;

use crate::constants::*;
use crate::errors::*;
use crate::jsonutils::add_at;
use crate::mapper::{
    ParameterMapper,
    ParameterSet,
};
use crate::object::{
    FieldValue,
    Serializable,
    TypedObject,
};
use crate::schema::{
    ResourceKind,
    SchemaRegistry,
};

// Builds wire-format request bodies for create and replace calls straight from a parameter set.
// Resolution and coercion are the ParameterMapper's; on top of that the builder fills in the
// envelope (apiVersion, kind, metadata) from the resource kind.
pub struct RequestBodyBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> RequestBodyBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> RequestBodyBuilder<'a> {
        RequestBodyBuilder { registry }
    }

    pub fn build(&self, params: &ParameterSet, kind: &str) -> anyhow::Result<Value> {
        self.build_for(params, self.registry.kind(kind)?)
    }

    pub fn build_for(&self, params: &ParameterSet, kind: &ResourceKind) -> anyhow::Result<Value> {
        let mut obj = TypedObject::new(&kind.root_type);
        ParameterMapper::new(self.registry).apply(params, &mut obj)?;

        if !kind.namespaced
            && let Some(FieldValue::Object(meta)) = obj.get_mut(METADATA_FIELD)
            && meta.unset(NAMESPACE_PARAM).is_some()
        {
            debug!("dropping namespace for cluster-scoped kind {}", kind.kind());
        }

        if kind.name_required {
            let name = obj.scalar(&format!("{METADATA_FIELD}.{NAME_PARAM}"));
            ensure!(
                name.is_some_and(|n| n.as_str().is_some_and(|s| !s.is_empty())),
                ReconcileError::missing_required_field(&format!("{METADATA_FIELD}.{NAME_PARAM}"))
            );
        }

        let mut body = obj.to_wire(self.registry)?;
        let Value::Object(map) = &mut body else {
            bail!(ReconcileError::type_mismatch(&format!("{}: expected object body", kind.kind())));
        };
        map.insert(API_VERSION_KEY.into(), Value::String(kind.api_version()));
        map.insert(KIND_KEY.into(), Value::String(kind.kind().into()));
        map.entry(METADATA_FIELD).or_insert_with(|| Value::Object(Map::new()));

        Ok(body)
    }

    // Copies the value at the (internal, dotted) `path` on `prior` into `body` at the matching
    // wire path.  Returns false if `prior` doesn't have a value there; the body is untouched in
    // that case.
    pub fn carry_over(&self, body: &mut Value, prior: &TypedObject, path: &str) -> anyhow::Result<bool> {
        let fields = self.registry.resolve_path(prior.type_name(), path)?;
        let internal: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        let ptr = PointerBuf::from_tokens(fields.iter().map(|f| f.wire_name.as_str()));

        match prior.lookup(&internal.join(".")) {
            Some(value) if !value.is_default() => {
                add_at(body, &ptr, value.to_wire(self.registry)?)?;
                debug!("carried over {path} from prior {}", prior.type_name());
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    // Carries over every field the kind declares immutable after creation; returns the paths that
    // were actually copied
    pub fn carry_over_immutable(
        &self,
        body: &mut Value,
        kind: &ResourceKind,
        prior: &TypedObject,
    ) -> anyhow::Result<Vec<String>> {
        ensure!(
            prior.type_name() == kind.root_type,
            ReconcileError::resource_type_mismatch(&format!("{} != {}", prior.type_name(), kind.root_type))
        );

        let mut carried = vec![];
        for path in &kind.immutable_fields {
            if self.carry_over(body, prior, path)? {
                carried.push(path.clone());
            }
        }
        Ok(carried)
    }
}
