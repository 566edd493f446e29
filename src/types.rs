//! Shared wire types for the server, client and renderer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entity record. Opaque to the admin layer beyond its declared keys.
pub type Record = Map<String, Value>;

/// One page of a list response, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Read the `id` of a record as a string, whether stored as string or number.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
