//! Identity Store Adapter
//!
//! Read/write operations against the external document database. The store
//! holds all durable state; this module issues queries and all-or-nothing
//! write batches and carries no business logic of its own.

pub mod http;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use http::HttpStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or storage failure. Callers must treat this as "no state
    /// changed" and either retry or surface it to the user.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// An equality-filtered query against one collection
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: &'static str,
    pub filter: Vec<(String, Value)>,
    /// Order by server insertion time, newest first
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn collection(collection: &'static str) -> Self {
        Self {
            collection,
            filter: Vec::new(),
            newest_first: false,
            limit: None,
        }
    }

    #[must_use]
    pub fn where_eq(mut self, field: &str, value: Value) -> Self {
        self.filter.push((field.to_string(), value));
        self
    }

    #[must_use]
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One entry in a write batch. Batches are applied atomically: on failure
/// no operation has been applied.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Create {
        collection: &'static str,
        id: String,
        fields: Value,
    },
    Update {
        collection: &'static str,
        id: String,
        fields: Value,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

impl WriteOp {
    /// Wire representation: `["set"|"update"|"delete", collection, id, fields?]`
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            WriteOp::Create {
                collection,
                id,
                fields,
            } => serde_json::json!(["set", collection, id, fields]),
            WriteOp::Update {
                collection,
                id,
                fields,
            } => serde_json::json!(["update", collection, id, fields]),
            WriteOp::Delete { collection, id } => {
                serde_json::json!(["delete", collection, id])
            }
        }
    }
}

/// Contract against the document store: collection-based find plus batched
/// all-or-nothing writes
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Run a query, returning zero or more raw records
    async fn query(&self, query: Query) -> Result<Vec<Value>, StoreError>;

    /// Apply a write batch as a single unit
    async fn transact(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}

/// Decode raw records into a typed collection
///
/// # Errors
///
/// Returns `StoreError::Malformed` if any record fails to deserialize
pub fn decode<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>, StoreError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record).map_err(|e| StoreError::Malformed(e.to_string()))
        })
        .collect()
}

/// Decode the first record of a result set, if any
///
/// # Errors
///
/// Returns `StoreError::Malformed` if the record fails to deserialize
pub fn decode_first<T: DeserializeOwned>(records: Vec<Value>) -> Result<Option<T>, StoreError> {
    records
        .into_iter()
        .next()
        .map(|record| {
            serde_json::from_value(record).map_err(|e| StoreError::Malformed(e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_op_wire_format() {
        let create = WriteOp::Create {
            collection: "accounts",
            id: "a1".to_string(),
            fields: json!({"status": "needs_email"}),
        };
        assert_eq!(
            create.to_wire(),
            json!(["set", "accounts", "a1", {"status": "needs_email"}])
        );

        let update = WriteOp::Update {
            collection: "accounts",
            id: "a1".to_string(),
            fields: json!({"display_name": "Steve"}),
        };
        assert_eq!(
            update.to_wire(),
            json!(["update", "accounts", "a1", {"display_name": "Steve"}])
        );

        let delete = WriteOp::Delete {
            collection: "verification_codes",
            id: "c1".to_string(),
        };
        assert_eq!(delete.to_wire(), json!(["delete", "verification_codes", "c1"]));
    }

    #[test]
    fn test_query_builder() {
        let query = Query::collection("verification_codes")
            .where_eq("account_id", json!("a1"))
            .newest_first()
            .limit(1);

        assert_eq!(query.collection, "verification_codes");
        assert_eq!(query.filter, vec![("account_id".to_string(), json!("a1"))]);
        assert!(query.newest_first);
        assert_eq!(query.limit, Some(1));
    }

    #[test]
    fn test_decode_first_empty() {
        let result: Option<serde_json::Value> = decode_first(vec![]).unwrap();
        assert!(result.is_none());
    }
}
