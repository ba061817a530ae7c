//! Document indexing seam.
//!
//! The engine hands write batches to an [`Indexer`]; [`BulkIndexer`] is the
//! stock implementation, batching through the engine's bulk endpoint.
//! Writes go through the configurator's write alias when one exists, so a
//! migration can repoint them without touching callers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::SearchClient;
use crate::config::EngineConfig;
use crate::error::{ClientError, EngineResult};
use crate::index::{IndexConfigurator, SearchableEntity};

/// One document destined for the search engine.
#[derive(Debug, Clone)]
pub struct SearchDocument {
    /// The engine document id.
    pub id: String,
    /// The document body.
    pub source: Value,
}

impl SearchDocument {
    /// Creates a document.
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

/// Writes and removes entity documents.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Indexes `documents` for `entity`.
    async fn index(
        &self,
        entity: &dyn SearchableEntity,
        documents: &[SearchDocument],
    ) -> EngineResult<()>;

    /// Removes the documents with the given ids for `entity`.
    async fn delete(&self, entity: &dyn SearchableEntity, ids: &[String]) -> EngineResult<()>;
}

/// The index document writes are sent to: the write alias when the
/// configurator has one, otherwise the index itself.
pub fn write_index(configurator: &dyn IndexConfigurator) -> String {
    configurator
        .write_alias()
        .unwrap_or_else(|| configurator.name().to_string())
}

/// Indexer batching writes through the bulk endpoint.
pub struct BulkIndexer {
    client: Arc<dyn SearchClient>,
    chunk_size: usize,
}

impl BulkIndexer {
    /// Creates a bulk indexer with the configured chunk size.
    pub fn new(client: Arc<dyn SearchClient>, config: &EngineConfig) -> Self {
        Self {
            client,
            chunk_size: config.chunk_size.max(1),
        }
    }

    fn check_bulk_response(index: &str, response: &Value) -> EngineResult<()> {
        if !response
            .get("errors")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Ok(());
        }

        let failed = response
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.as_object()
                            .and_then(|ops| ops.values().next())
                            .and_then(|op| op.get("error"))
                            .is_some()
                    })
                    .count()
            })
            .unwrap_or(0);

        Err(ClientError::BulkRejections {
            index: index.to_string(),
            failed,
        }
        .into())
    }
}

#[async_trait]
impl Indexer for BulkIndexer {
    async fn index(
        &self,
        entity: &dyn SearchableEntity,
        documents: &[SearchDocument],
    ) -> EngineResult<()> {
        let configurator = entity.configurator();
        let index = write_index(configurator.as_ref());

        for chunk in documents.chunks(self.chunk_size) {
            let mut operations = Vec::with_capacity(chunk.len() * 2);
            for document in chunk {
                operations.push(json!({"index": {"_id": document.id}}));
                operations.push(document.source.clone());
            }

            let response = self.client.bulk(&index, operations).await?;
            Self::check_bulk_response(&index, &response)?;
        }

        tracing::debug!(
            index = %index,
            entity = %entity.type_name(),
            count = documents.len(),
            "Indexed documents"
        );
        Ok(())
    }

    async fn delete(&self, entity: &dyn SearchableEntity, ids: &[String]) -> EngineResult<()> {
        let configurator = entity.configurator();
        let index = write_index(configurator.as_ref());

        for chunk in ids.chunks(self.chunk_size) {
            let operations: Vec<Value> = chunk
                .iter()
                .map(|id| json!({"delete": {"_id": id}}))
                .collect();

            let response = self.client.bulk(&index, operations).await?;
            Self::check_bulk_response(&index, &response)?;
        }

        tracing::debug!(
            index = %index,
            entity = %entity.type_name(),
            count = ids.len(),
            "Deleted documents"
        );
        Ok(())
    }
}
