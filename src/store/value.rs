//! Stored value representations

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value as JsonValue;
use tokio::time::Instant;

use super::bloom::BloomFilter;

/// One entry in the keyspace.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Str(StringValue),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    List(VecDeque<String>),
    SortedSet(HashMap<String, f64>),
    Json(JsonValue),
    Bloom(BloomFilter),
}

/// A plain string value with an optional expiry deadline.
#[derive(Debug, Clone)]
pub(crate) struct StringValue {
    pub value: String,
    pub expires_at: Option<Instant>,
}

impl StringValue {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Hash(_) => "hash",
            Value::Set(_) => "set",
            Value::List(_) => "list",
            Value::SortedSet(_) => "sorted set",
            Value::Json(_) => "json",
            Value::Bloom(_) => "bloom filter",
        }
    }
}
