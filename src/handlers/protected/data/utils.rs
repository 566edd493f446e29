use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::middleware::require_role;
use crate::rbac::Session;
use crate::resources::ResourceDescriptor;
use crate::server::AppState;
use crate::types::Record;

/// Resolve the descriptor served at `endpoint` and check the caller may use it.
pub fn authorize<'a>(state: &'a AppState, session: &Session, endpoint: &str) -> ApiResult<&'a ResourceDescriptor> {
    let descriptor = state.catalog.registry.by_endpoint(endpoint)?;
    require_role(session, descriptor.access_role())?;
    Ok(descriptor)
}

/// Request bodies must be JSON objects.
pub fn into_record(body: Value) -> ApiResult<Record> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}
