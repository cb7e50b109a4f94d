use async_trait::async_trait;
use serde_json::Value;
use tracing::*;

use crate::errors::*;
use crate::object::TypedObject;
use crate::schema::ResourceKind;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

// The parts of an apiserver Status response we care about; kept separate from kube's own type so
// that non-kube transports (and the fake one in the test utils) can produce the same errors
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApiStatus {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl ApiStatus {
    pub fn new(code: u16, reason: &str, message: &str) -> ApiStatus {
        ApiStatus { code, reason: reason.into(), message: message.into() }
    }

    pub fn not_found(name: &str) -> ApiStatus {
        ApiStatus::new(STATUS_NOT_FOUND, "NotFound", &format!("{name} not found"))
    }

    pub fn conflict(name: &str) -> ApiStatus {
        ApiStatus::new(STATUS_CONFLICT, "AlreadyExists", &format!("{name} already exists"))
    }
}

err_impl! {pub TransportError,
    #[error("API request failed: {0:?}")]
    Status(ApiStatus),
}

pub fn status_code(err: &anyhow::Error) -> Option<u16> {
    match err.downcast_ref::<TransportError>() {
        Some(TransportError::Status(status)) => Some(status.code),
        None => None,
    }
}

pub fn is_not_found(err: &anyhow::Error) -> bool {
    status_code(err) == Some(STATUS_NOT_FOUND)
}

// The transport contract: create/get/patch/replace/delete against the apiserver, returning typed
// objects decoded against the schema registry.  Errors the server reports come back as a
// TransportError::Status; everything else (connection failures, decode errors, ...) is passed
// through as-is.  Implementations don't retry.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create(&self, kind: &ResourceKind, namespace: Option<&str>, body: &Value) -> anyhow::Result<TypedObject>;

    async fn get(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>)
    -> anyhow::Result<Option<TypedObject>>;

    async fn patch(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TypedObject>;

    async fn replace(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: Option<&str>,
        body: &Value,
    ) -> anyhow::Result<TypedObject>;

    async fn delete(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> EmptyResult;

    // Deleting something that's already gone counts as success
    async fn delete_idempotent(&self, kind: &ResourceKind, name: &str, namespace: Option<&str>) -> EmptyResult {
        match self.delete(kind, name, namespace).await {
            Err(err) if is_not_found(&err) => {
                debug!("{} {name} was already deleted", kind.kind());
                Ok(())
            },
            res => res,
        }
    }
}
