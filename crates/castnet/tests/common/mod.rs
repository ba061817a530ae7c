//! Shared test doubles: a recording mock client, fixture configurators,
//! entities, and importers.

// Each integration test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use castnet::error::{ClientError, ClientResult, EngineResult};
use castnet::{
    DataSource, Importer, IndexConfigurator, Rule, SearchClient, SearchDocument, SearchableEntity,
};

/// One recorded client call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    IndexExists(String),
    CreateIndex(String, Value),
    DeleteIndex(String),
    CloseIndex(String),
    OpenIndex(String),
    PutSettings(String, Value),
    PutMapping(String, String, Value),
    GetMapping(String),
    AliasExists(String),
    GetAlias(String),
    PutAlias(String, String),
    DeleteAlias(String, String),
    Search(String, Value),
    Count(String, Value),
    DeleteByQuery(String, Value),
    Bulk(String, usize),
}

/// A `SearchClient` double recording every call against an in-memory
/// index/alias state.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    indices: Mutex<HashSet<String>>,
    aliases: Mutex<HashMap<String, Vec<String>>>,
    search_responses: Mutex<VecDeque<Value>>,
    count_responses: Mutex<VecDeque<Value>>,
    fail_put_settings: Mutex<bool>,
    failing_opens: Mutex<u32>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, index: &str) -> Self {
        self.indices.lock().insert(index.to_string());
        self
    }

    pub fn with_alias(self, name: &str, holders: &[&str]) -> Self {
        self.aliases.lock().insert(
            name.to_string(),
            holders.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn queue_search(&self, response: Value) {
        self.search_responses.lock().push_back(response);
    }

    pub fn queue_count(&self, count: u64) {
        self.count_responses.lock().push_back(json!({"count": count}));
    }

    pub fn fail_put_settings(&self) {
        *self.fail_put_settings.lock() = true;
    }

    /// Makes the next `n` open calls fail.
    pub fn fail_opens(&self, n: u32) {
        *self.failing_opens.lock() = n;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn alias_holders(&self, name: &str) -> Vec<String> {
        self.aliases.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indices.lock().contains(index)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn transport_failure(operation: &str) -> ClientError {
        ClientError::Transport {
            operation: operation.to_string(),
            message: "simulated transport failure".to_string(),
        }
    }

    fn empty_search_response() -> Value {
        json!({"hits": {"total": {"value": 0}, "hits": []}})
    }
}

#[async_trait]
impl SearchClient for RecordingClient {
    async fn index_exists(&self, index: &str) -> ClientResult<bool> {
        self.record(Call::IndexExists(index.to_string()));
        Ok(self.indices.lock().contains(index))
    }

    async fn create_index(&self, index: &str, body: Value) -> ClientResult<()> {
        self.record(Call::CreateIndex(index.to_string(), body));
        self.indices.lock().insert(index.to_string());
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> ClientResult<()> {
        self.record(Call::DeleteIndex(index.to_string()));
        self.indices.lock().remove(index);
        for holders in self.aliases.lock().values_mut() {
            holders.retain(|holder| holder != index);
        }
        Ok(())
    }

    async fn close_index(&self, index: &str) -> ClientResult<()> {
        self.record(Call::CloseIndex(index.to_string()));
        Ok(())
    }

    async fn open_index(&self, index: &str) -> ClientResult<()> {
        self.record(Call::OpenIndex(index.to_string()));
        let mut failing = self.failing_opens.lock();
        if *failing > 0 {
            *failing -= 1;
            return Err(Self::transport_failure("open_index"));
        }
        Ok(())
    }

    async fn put_settings(&self, index: &str, body: Value) -> ClientResult<()> {
        self.record(Call::PutSettings(index.to_string(), body));
        if *self.fail_put_settings.lock() {
            return Err(Self::transport_failure("put_settings"));
        }
        Ok(())
    }

    async fn put_mapping(&self, index: &str, doc_type: &str, body: Value) -> ClientResult<()> {
        self.record(Call::PutMapping(
            index.to_string(),
            doc_type.to_string(),
            body,
        ));
        Ok(())
    }

    async fn get_mapping(&self, index: &str) -> ClientResult<Value> {
        self.record(Call::GetMapping(index.to_string()));
        Ok(json!({}))
    }

    async fn alias_exists(&self, name: &str) -> ClientResult<bool> {
        self.record(Call::AliasExists(name.to_string()));
        Ok(self.aliases.lock().contains_key(name))
    }

    async fn get_alias(&self, name: &str) -> ClientResult<Value> {
        self.record(Call::GetAlias(name.to_string()));
        let mut record = Map::new();
        if let Some(holders) = self.aliases.lock().get(name) {
            for holder in holders {
                let mut aliases = Map::new();
                aliases.insert(name.to_string(), json!({}));
                record.insert(holder.clone(), json!({"aliases": aliases}));
            }
        }
        Ok(Value::Object(record))
    }

    async fn put_alias(&self, index: &str, name: &str) -> ClientResult<()> {
        self.record(Call::PutAlias(index.to_string(), name.to_string()));
        self.aliases
            .lock()
            .entry(name.to_string())
            .or_default()
            .push(index.to_string());
        Ok(())
    }

    async fn delete_alias(&self, index: &str, name: &str) -> ClientResult<()> {
        self.record(Call::DeleteAlias(index.to_string(), name.to_string()));
        if let Some(holders) = self.aliases.lock().get_mut(name) {
            holders.retain(|holder| holder != index);
        }
        Ok(())
    }

    async fn search(&self, index: &str, body: Value) -> ClientResult<Value> {
        self.record(Call::Search(index.to_string(), body));
        Ok(self
            .search_responses
            .lock()
            .pop_front()
            .unwrap_or_else(Self::empty_search_response))
    }

    async fn count(&self, index: &str, body: Value) -> ClientResult<Value> {
        self.record(Call::Count(index.to_string(), body));
        Ok(self
            .count_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| json!({"count": 0})))
    }

    async fn delete_by_query(&self, index: &str, body: Value) -> ClientResult<Value> {
        self.record(Call::DeleteByQuery(index.to_string(), body));
        Ok(json!({"deleted": 0, "index": index}))
    }

    async fn bulk(&self, index: &str, operations: Vec<Value>) -> ClientResult<Value> {
        self.record(Call::Bulk(index.to_string(), operations.len()));
        Ok(json!({"errors": false, "items": []}))
    }
}

/// Fixture index configurator.
pub struct TestConfigurator {
    pub name: String,
    pub settings: Value,
    pub default_mapping: Value,
    pub write_alias: Option<String>,
    pub entity_types: Vec<String>,
}

impl Default for TestConfigurator {
    fn default() -> Self {
        Self {
            name: "products".to_string(),
            settings: json!({"number_of_shards": 1}),
            default_mapping: Value::Null,
            write_alias: Some("products_write".to_string()),
            entity_types: vec!["product".to_string()],
        }
    }
}

impl IndexConfigurator for TestConfigurator {
    fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> Value {
        self.settings.clone()
    }

    fn default_mapping(&self) -> Value {
        self.default_mapping.clone()
    }

    fn write_alias(&self) -> Option<String> {
        self.write_alias.clone()
    }

    fn entity_types(&self) -> Vec<String> {
        self.entity_types.clone()
    }
}

/// Fixture entity.
pub struct TestEntity {
    pub type_name: String,
    pub searchable_as: String,
    pub mapping: Value,
    pub rules: Vec<Rule>,
    pub configurator: Arc<dyn IndexConfigurator>,
}

impl TestEntity {
    pub fn new(configurator: Arc<dyn IndexConfigurator>) -> Self {
        Self {
            type_name: "product".to_string(),
            searchable_as: "product".to_string(),
            mapping: json!({"properties": {"name": {"type": "text"}}}),
            rules: Vec::new(),
            configurator,
        }
    }
}

impl SearchableEntity for TestEntity {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn searchable_as(&self) -> &str {
        &self.searchable_as
    }

    fn mapping(&self) -> Value {
        self.mapping.clone()
    }

    fn search_rules(&self) -> Vec<Rule> {
        self.rules.clone()
    }

    fn configurator(&self) -> Arc<dyn IndexConfigurator> {
        self.configurator.clone()
    }
}

/// Builds the default product entity over the default configurator.
pub fn product_entity() -> Arc<dyn SearchableEntity> {
    Arc::new(TestEntity::new(Arc::new(TestConfigurator::default())))
}

/// Importer double recording triggered entity types.
#[derive(Default)]
pub struct RecordingImporter {
    pub imported: Mutex<Vec<String>>,
}

impl RecordingImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imported(&self) -> Vec<String> {
        self.imported.lock().clone()
    }
}

#[async_trait]
impl Importer for RecordingImporter {
    async fn import(&self, type_name: &str) -> EngineResult<()> {
        self.imported.lock().push(type_name.to_string());
        Ok(())
    }
}

/// Data source double serving a fixed document list.
pub struct FixedDataSource {
    pub documents: Vec<SearchDocument>,
}

#[async_trait]
impl DataSource for FixedDataSource {
    async fn fetch_all(&self) -> EngineResult<Vec<SearchDocument>> {
        Ok(self.documents.clone())
    }
}

/// A search response with `total` hits, each hit carrying a sequential id.
pub fn hits_response(total: u64) -> Value {
    let hits: Vec<Value> = (0..total)
        .map(|i| json!({"_id": format!("{}", i + 1), "_source": {}}))
        .collect();
    json!({"hits": {"total": {"value": total}, "hits": hits}})
}
