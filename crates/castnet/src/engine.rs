//! Execution coordinator.
//!
//! Candidate payloads are submitted sequentially, in rule order. For search
//! and count the first candidate with a positive total wins; the fallback
//! order is part of the correctness contract (earlier rules are more
//! specific), not a performance concern, and must not be parallelized.
//! Transport errors propagate immediately; there is no fallback to the next
//! candidate on error, only on empty results.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use crate::client::SearchClient;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::index::{SearchableEntity, update_entity_mapping};
use crate::indexer::{Indexer, SearchDocument};
use crate::search::request::SearchRequest;
use crate::search::translator::{CandidatePayload, build_payload_collection, entity_payload};

/// One search response, annotated with the payload that produced it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    raw: Value,
    payload: Option<Value>,
}

impl SearchOutcome {
    /// An empty outcome: zero hits, no producing payload. Returned when no
    /// rule was applicable: "no results", not an error.
    pub fn empty() -> Self {
        Self {
            raw: json!({"hits": {"total": {"value": 0}, "hits": []}}),
            payload: None,
        }
    }

    fn new(raw: Value, payload: &CandidatePayload) -> Self {
        Self {
            raw,
            payload: Some(payload.document().clone()),
        }
    }

    /// Wraps a raw response with no producing payload (raw overrides).
    pub fn from_raw(raw: Value) -> Self {
        Self { raw, payload: None }
    }

    /// The raw engine response.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The payload that produced this response, when translation ran.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// The total hit count.
    pub fn total_hits(&self) -> u64 {
        self.raw["hits"]["total"]["value"].as_u64().unwrap_or(0)
    }

    /// The hit documents.
    pub fn hits(&self) -> Vec<&Value> {
        self.raw["hits"]["hits"]
            .as_array()
            .map(|hits| hits.iter().collect())
            .unwrap_or_default()
    }

    /// The `_id` of every hit, in result order.
    pub fn ids(&self) -> Vec<String> {
        self.hits()
            .iter()
            .filter_map(|hit| hit.get("_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    /// The highlight attached to `hit`, if any.
    pub fn highlight(hit: &Value) -> Option<Highlight> {
        hit.get("highlight")
            .and_then(Value::as_object)
            .map(|fields| Highlight {
                fields: fields.clone(),
            })
    }
}

/// Per-hit highlight fragments, keyed by field.
#[derive(Debug, Clone)]
pub struct Highlight {
    fields: Map<String, Value>,
}

impl Highlight {
    /// The highlighted field names.
    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// The fragments for `field`.
    pub fn fragments(&self, field: &str) -> Vec<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(|fragments| {
                fragments
                    .iter()
                    .filter_map(Value::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The driver's execution coordinator.
pub struct ElasticEngine {
    client: Arc<dyn SearchClient>,
    indexer: Arc<dyn Indexer>,
    config: EngineConfig,
    refreshed_mappings: Mutex<HashSet<String>>,
}

impl ElasticEngine {
    /// Creates an engine.
    pub fn new(client: Arc<dyn SearchClient>, indexer: Arc<dyn Indexer>, config: EngineConfig) -> Self {
        Self {
            client,
            indexer,
            config,
            refreshed_mappings: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<dyn SearchClient> {
        &self.client
    }

    /// Performs a search.
    ///
    /// A raw callback on the request bypasses translation entirely.
    pub async fn search(&self, request: &SearchRequest) -> EngineResult<SearchOutcome> {
        if let Some(callback) = &request.callback {
            return Ok(SearchOutcome::from_raw(callback(request)?));
        }

        let payloads = build_payload_collection(request, true);

        let mut outcome = SearchOutcome::empty();
        for payload in &payloads {
            let raw = self.client.search(payload.index(), payload.body()).await?;
            outcome = SearchOutcome::new(raw, payload);
            if outcome.total_hits() > 0 {
                break;
            }
        }
        Ok(outcome)
    }

    /// Counts matching documents.
    ///
    /// The first candidate with a positive count wins; counts are not
    /// summed across candidates, so multiple rules matching disjoint
    /// documents undercount.
    pub async fn count(&self, request: &SearchRequest) -> EngineResult<u64> {
        let payloads = build_payload_collection(request, false);

        let mut count = 0;
        for payload in &payloads {
            let raw = self
                .client
                .count(payload.index(), payload.query_body())
                .await?;
            count = raw.get("count").and_then(Value::as_u64).unwrap_or(0);
            if count > 0 {
                break;
            }
        }
        Ok(count)
    }

    /// Deletes matching documents.
    ///
    /// Unlike search, every candidate is submitted: each may target a
    /// disjoint document set. The last response is returned; with no
    /// applicable rule nothing is submitted and `null` is returned.
    pub async fn delete_by_query(&self, request: &SearchRequest) -> EngineResult<Value> {
        let payloads = build_payload_collection(request, false);

        let mut result = Value::Null;
        for payload in &payloads {
            result = self
                .client
                .delete_by_query(payload.index(), payload.query_body())
                .await?;
        }
        Ok(result)
    }

    /// Searches one page, rewriting `from`/`size` on the request before
    /// translation. Pages are 1-based.
    pub async fn paginate(
        &self,
        request: SearchRequest,
        per_page: u64,
        page: u64,
    ) -> EngineResult<SearchOutcome> {
        let request = request
            .from(page.saturating_sub(1) * per_page)
            .take(per_page);
        self.search(&request).await
    }

    /// Searches with scoring explanation.
    pub async fn explain(&self, request: SearchRequest) -> EngineResult<SearchOutcome> {
        self.search(&request.explain()).await
    }

    /// Searches with query profiling.
    pub async fn profile(&self, request: SearchRequest) -> EngineResult<SearchOutcome> {
        self.search(&request.profile()).await
    }

    /// Runs a verbatim body against the entity's index, bypassing rules and
    /// augmentation.
    pub async fn search_raw(
        &self,
        entity: &dyn SearchableEntity,
        body: Value,
    ) -> EngineResult<Value> {
        let payload = entity_payload(entity).set_if_not_empty("body", body);
        let index = payload
            .get("index")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let body = payload.get_or("body", json!({}));
        Ok(self.client.search(&index, body).await?)
    }

    /// Indexes a write batch.
    ///
    /// When mapping updates are enabled, the first batch for each entity
    /// type refreshes the type's mapping before any document is written;
    /// later batches skip the refresh for the engine's lifetime.
    pub async fn update(
        &self,
        entity: &dyn SearchableEntity,
        documents: &[SearchDocument],
    ) -> EngineResult<()> {
        if self.config.update_mapping {
            let pending = !self
                .refreshed_mappings
                .lock()
                .contains(entity.type_name());
            if pending {
                let configurator = entity.configurator();
                update_entity_mapping(
                    self.client.as_ref(),
                    configurator.as_ref(),
                    entity,
                    configurator.name(),
                )
                .await?;
                self.refreshed_mappings
                    .lock()
                    .insert(entity.type_name().to_string());
            }
        }

        self.indexer.index(entity, documents).await
    }

    /// Removes documents by id.
    pub async fn delete(&self, entity: &dyn SearchableEntity, ids: &[String]) -> EngineResult<()> {
        self.indexer.delete(entity, ids).await
    }

    /// The `_id` of every hit in `outcome`.
    pub fn map_ids(&self, outcome: &SearchOutcome) -> Vec<String> {
        outcome.ids()
    }
}
