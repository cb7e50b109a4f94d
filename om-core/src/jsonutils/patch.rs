use json_patch_ext::prelude::*;
use serde_json::{
    Value,
    json,
};

use crate::errors::*;

// JSON patch `add` won't create intermediate maps, so any missing (or null) parent of `ptr` gets
// an empty map added first.  A parent that exists but isn't a map fails the patch.
pub fn add_at(obj: &mut Value, ptr: &Pointer, value: Value) -> EmptyResult {
    if let Some(parent) = ptr.parent() {
        let mut at = PointerBuf::new();
        for token in parent.tokens() {
            at.push_back(token);
            if !at.resolve(obj).is_ok_and(|v| !v.is_null()) {
                patch_ext(obj, add_operation(at.clone(), json!({})))?;
            }
        }
    }

    patch_ext(obj, add_operation(ptr.to_buf(), value))?;
    Ok(())
}
