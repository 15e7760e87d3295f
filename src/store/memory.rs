//! In-memory identity store used by tests
//!
//! Applies the same query and batch semantics as the HTTP store against a
//! mutex-guarded map, so services can be exercised without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::store::{IdentityStore, Query, StoreError, WriteOp};

#[derive(Debug)]
struct Record {
    id: String,
    fields: Value,
    /// Insertion order, stands in for the server creation timestamp
    seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Record>>>,
    seq: Mutex<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently in a collection
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn matches(record: &Record, filter: &[(String, Value)]) -> bool {
        filter
            .iter()
            .all(|(field, value)| record.fields.get(field) == Some(value))
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn query(&self, query: Query) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let Some(records) = collections.get(query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Record> = records
            .iter()
            .filter(|record| Self::matches(record, &query.filter))
            .collect();

        if query.newest_first {
            matched.sort_by(|a, b| b.seq.cmp(&a.seq));
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched.iter().map(|record| record.fields.clone()).collect())
    }

    async fn transact(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();

        // Validate the whole batch before applying anything, mirroring the
        // all-or-nothing contract of the real store. Updates are exempt:
        // the modeled store's update op upserts.
        for op in &ops {
            if let WriteOp::Delete { collection, id } = op {
                let exists = collections
                    .get(*collection)
                    .is_some_and(|records| records.iter().any(|r| r.id == *id));
                if !exists {
                    return Err(StoreError::Unavailable(format!(
                        "no record '{id}' in collection '{collection}'"
                    )));
                }
            }
        }

        for op in ops {
            match op {
                WriteOp::Create {
                    collection,
                    id,
                    fields,
                } => {
                    let seq = {
                        let mut counter = self.seq.lock().unwrap();
                        *counter += 1;
                        *counter
                    };
                    collections
                        .entry(collection.to_string())
                        .or_default()
                        .push(Record { id, fields, seq });
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => {
                    let records = collections.entry(collection.to_string()).or_default();
                    if let Some(record) = records.iter_mut().find(|r| r.id == id) {
                        if let (Value::Object(existing), Value::Object(updates)) =
                            (&mut record.fields, fields)
                        {
                            for (key, value) in updates {
                                existing.insert(key, value);
                            }
                        }
                    } else {
                        // Upsert: an update to an unknown id creates the record
                        let seq = {
                            let mut counter = self.seq.lock().unwrap();
                            *counter += 1;
                            *counter
                        };
                        records.push(Record { id, fields, seq });
                    }
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(records) = collections.get_mut(collection) {
                        records.retain(|r| r.id != id);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_query_roundtrip() {
        let store = MemoryStore::new();
        store
            .transact(vec![WriteOp::Create {
                collection: "accounts",
                id: "a1".to_string(),
                fields: json!({"id": "a1", "status": "needs_email"}),
            }])
            .await
            .unwrap();

        let records = store
            .query(Query::collection("accounts").where_eq("id", json!("a1")))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status"], json!("needs_email"));
    }

    #[tokio::test]
    async fn test_newest_first_ordering() {
        let store = MemoryStore::new();
        for id in ["c1", "c2", "c3"] {
            store
                .transact(vec![WriteOp::Create {
                    collection: "verification_codes",
                    id: id.to_string(),
                    fields: json!({"id": id, "account_id": "a1"}),
                }])
                .await
                .unwrap();
        }

        let records = store
            .query(
                Query::collection("verification_codes")
                    .where_eq("account_id", json!("a1"))
                    .newest_first()
                    .limit(1),
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!("c3"));
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = MemoryStore::new();
        let result = store
            .transact(vec![
                WriteOp::Create {
                    collection: "accounts",
                    id: "a1".to_string(),
                    fields: json!({"id": "a1"}),
                },
                WriteOp::Delete {
                    collection: "accounts",
                    id: "missing".to_string(),
                },
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(store.count("accounts"), 0);
    }

    #[tokio::test]
    async fn test_update_upserts_missing_record() {
        let store = MemoryStore::new();
        store
            .transact(vec![WriteOp::Update {
                collection: "accounts",
                id: "a1".to_string(),
                fields: json!({"id": "a1", "email": "steve@example.com"}),
            }])
            .await
            .unwrap();

        let records = store
            .query(Query::collection("accounts").where_eq("id", json!("a1")))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["email"], json!("steve@example.com"));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        store
            .transact(vec![WriteOp::Create {
                collection: "accounts",
                id: "a1".to_string(),
                fields: json!({"id": "a1", "status": "needs_email", "rating": 1000}),
            }])
            .await
            .unwrap();

        store
            .transact(vec![WriteOp::Update {
                collection: "accounts",
                id: "a1".to_string(),
                fields: json!({"status": "needs_display_name"}),
            }])
            .await
            .unwrap();

        let records = store
            .query(Query::collection("accounts").where_eq("id", json!("a1")))
            .await
            .unwrap();
        assert_eq!(records[0]["status"], json!("needs_display_name"));
        assert_eq!(records[0]["rating"], json!(1000));
    }
}
