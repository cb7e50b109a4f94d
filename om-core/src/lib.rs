pub mod body;
pub mod compare;
pub mod config;
pub mod constants;
pub mod errors;
pub mod jsonutils;
pub mod k8s;
pub mod logging;
pub mod macros;
pub mod mapper;
pub mod object;
pub mod reconcile;
pub mod scenario;
pub mod schema;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub mod prelude {
    pub use serde_json::Value;

    pub use crate::body::RequestBodyBuilder;
    pub use crate::compare::{
        ComparisonResult,
        DiffEntry,
        ObjectComparator,
    };
    pub use crate::constants::*;
    pub use crate::errors::{
        EmptyResult,
        ReconcileError,
    };
    pub use crate::k8s::{
        GVK,
        ResourceClient,
    };
    pub use crate::mapper::{
        ParameterMapper,
        ParameterSet,
    };
    pub use crate::object::{
        FieldValue,
        Serializable,
        TypedObject,
    };
    pub use crate::reconcile::Reconciler;
    pub use crate::schema::{
        FieldKind,
        FieldSchema,
        ResourceKind,
        ScalarType,
        SchemaRegistry,
        TypeSchema,
    };
}

#[cfg(test)]
mod tests;
