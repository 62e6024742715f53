//! Sequential batch forwarder for ingestion endpoints
//!
//! Splits records with the batch planner and sends each batch through the
//! retry policy, awaiting batch `k` (retries included) before batch `k + 1`.
//! Batches already accepted are not rolled back when a later one fails.

use std::sync::Arc;

use mixpanel_core::{split, IngestionOutcome};
use mixpanel_domain::{MixpanelError, Result};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::dispatcher::{ApiRequest, RequestDispatcher};
use super::errors::ApiError;
use super::retry::RetryPolicy;

/// Forwards record batches to one ingestion endpoint.
pub struct BatchForwarder {
    dispatcher: Arc<RequestDispatcher>,
    retry: RetryPolicy,
    max_batch_size: usize,
}

impl BatchForwarder {
    pub fn new(dispatcher: Arc<RequestDispatcher>, retry: RetryPolicy, max_batch_size: usize) -> Self {
        Self { dispatcher, retry, max_batch_size }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Send `records` as JSON arrays using `template` for path, auth and query.
    ///
    /// Returns one item per batch: the ingestion result plus `batch_index` and
    /// `record_count`.
    ///
    /// # Errors
    ///
    /// The first failing batch aborts the loop with [`MixpanelError::Batch`]
    /// naming its zero-based index.
    #[instrument(skip(self, records, template), fields(count = records.len(), path = %template.path))]
    pub async fn forward(&self, records: Vec<Value>, template: &ApiRequest) -> Result<Vec<Value>> {
        let batches = split(records, self.max_batch_size)?;
        let total = batches.len();
        let mut results = Vec::with_capacity(total);

        for batch in batches {
            let index = batch.index;
            let record_count = batch.len();
            let request = template.clone().with_json(Value::Array(batch.records));
            debug!(batch = index, total, record_count, "dispatching batch");

            match self.send_batch(&request).await {
                Ok(outcome) => results.push(batch_item(outcome, index, record_count)?),
                Err(err) => {
                    warn!(batch = index, total, error = %err, "batch failed, aborting remaining batches");
                    return Err(MixpanelError::Batch { index, total, message: err.to_string() });
                }
            }
        }

        info!(batches = total, "all batches accepted");
        Ok(results)
    }

    async fn send_batch(&self, request: &ApiRequest) -> std::result::Result<IngestionOutcome, ApiError> {
        let dispatcher = &self.dispatcher;
        self.retry
            .execute(move |_| async move {
                match dispatcher.ingest(request).await? {
                    IngestionOutcome::Failure(reason) => Err(ApiError::Rejected(reason)),
                    outcome => Ok(outcome),
                }
            })
            .await
    }
}

fn batch_item(outcome: IngestionOutcome, index: usize, record_count: usize) -> Result<Value> {
    let mut item = match outcome.into_item()? {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("result".into(), other);
            map
        }
    };
    item.insert("batch_index".into(), json!(index));
    item.insert("record_count".into(), json!(record_count));
    Ok(Value::Object(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_item_carries_batch_metadata() {
        let item = batch_item(IngestionOutcome::Success, 2, 10).unwrap();
        assert_eq!(item, json!({"success": true, "batch_index": 2, "record_count": 10}));
    }

    #[test]
    fn payload_item_keeps_upstream_fields() {
        let outcome = IngestionOutcome::Payload(json!({"code": 200, "num_records_imported": 3}));
        let item = batch_item(outcome, 0, 3).unwrap();
        assert_eq!(item["num_records_imported"], 3);
        assert_eq!(item["batch_index"], 0);
    }
}
