//! HTTP implementation of the identity store contract
//!
//! Speaks the document database's admin API: a JSON query endpoint and a
//! batched transact endpoint, both authenticated with a bearer admin token.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use serde_json::{json, Map, Value};

use crate::settings::StoreSettings;
use crate::store::{IdentityStore, Query, StoreError, WriteOp};

pub struct HttpStore {
    client: reqwest::Client,
    query_url: String,
    transact_url: String,
    admin_token: String,
}

impl HttpStore {
    /// Build the store client from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the admin token is missing or the HTTP client
    /// cannot be constructed
    pub fn from_settings(settings: &StoreSettings) -> anyhow::Result<Self> {
        let admin_token = settings
            .get_admin_token()
            .ok_or_else(|| anyhow::anyhow!("store admin token is not configured"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            query_url: settings.query_url(),
            transact_url: settings.transact_url(),
            admin_token,
        })
    }

    /// Build the wire form of a query:
    /// `{collection: {"$": {where: {..}, order: {serverCreatedAt: "desc"}, limit: n}}}`
    fn query_body(query: &Query) -> Value {
        let mut clause = Map::new();

        let mut where_clause = Map::new();
        for (field, value) in &query.filter {
            where_clause.insert(field.clone(), value.clone());
        }
        if !where_clause.is_empty() {
            clause.insert("where".to_string(), Value::Object(where_clause));
        }
        if query.newest_first {
            clause.insert("order".to_string(), json!({"serverCreatedAt": "desc"}));
        }
        if let Some(limit) = query.limit {
            clause.insert("limit".to_string(), json!(limit));
        }

        let mut body = Map::new();
        body.insert(
            query.collection.to_string(),
            json!({ "$": Value::Object(clause) }),
        );
        Value::Object(body)
    }
}

#[async_trait]
impl IdentityStore for HttpStore {
    async fn query(&self, query: Query) -> Result<Vec<Value>, StoreError> {
        let collection = query.collection;
        let body = Self::query_body(&query);
        debug!("Store query against collection '{collection}'");

        let response = self
            .client
            .post(&self.query_url)
            .bearer_auth(&self.admin_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            error!("Store query failed with status {}", response.status());
            return Err(StoreError::Unavailable(format!(
                "query returned status {}",
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        match data.get(collection) {
            Some(Value::Array(records)) => Ok(records.clone()),
            Some(_) => Err(StoreError::Malformed(format!(
                "collection '{collection}' is not an array"
            ))),
            None => Ok(Vec::new()),
        }
    }

    async fn transact(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let wire_ops: Vec<Value> = ops.iter().map(WriteOp::to_wire).collect();
        debug!("Store transact with {} op(s)", wire_ops.len());

        let response = self
            .client
            .post(&self.transact_url)
            .bearer_auth(&self.admin_token)
            .json(&json!({ "ops": wire_ops }))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            error!("Store transact failed with status {}", response.status());
            return Err(StoreError::Unavailable(format!(
                "transact returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_body_shape() {
        let query = Query::collection("verification_codes")
            .where_eq("account_id", json!("a1"))
            .newest_first()
            .limit(1);

        let body = HttpStore::query_body(&query);
        assert_eq!(
            body,
            json!({
                "verification_codes": {
                    "$": {
                        "where": {"account_id": "a1"},
                        "order": {"serverCreatedAt": "desc"},
                        "limit": 1
                    }
                }
            })
        );
    }

    #[test]
    fn test_query_body_without_clauses() {
        let query = Query::collection("accounts");
        let body = HttpStore::query_body(&query);
        assert_eq!(body, json!({"accounts": {"$": {}}}));
    }
}
