//! Abstract search engine client.
//!
//! [`SearchClient`] defines every engine operation the driver issues,
//! allowing the production transport and test doubles to be swapped. All
//! operations are keyed by index name and, where applicable, document-type
//! name. No operation is retried by the driver; retry policy, if any,
//! belongs to the transport.

pub mod elastic;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientResult;

pub use elastic::ElasticClient;

/// Engine operations required by the driver.
///
/// All implementations must be `Send + Sync` to allow use across async
/// tasks.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Whether `index` exists.
    async fn index_exists(&self, index: &str) -> ClientResult<bool>;

    /// Creates `index` with the given body (settings, and optionally
    /// mappings). An empty body creates the index with engine defaults.
    async fn create_index(&self, index: &str, body: Value) -> ClientResult<()>;

    /// Deletes `index`. Deleting an absent index is not an error.
    async fn delete_index(&self, index: &str) -> ClientResult<()>;

    /// Closes `index`.
    async fn close_index(&self, index: &str) -> ClientResult<()>;

    /// Opens `index`.
    async fn open_index(&self, index: &str) -> ClientResult<()>;

    /// Applies a settings document to `index`.
    async fn put_settings(&self, index: &str, body: Value) -> ClientResult<()>;

    /// Applies a mapping to `index`, scoped to `doc_type`.
    async fn put_mapping(&self, index: &str, doc_type: &str, body: Value) -> ClientResult<()>;

    /// Returns the current mapping of `index`.
    async fn get_mapping(&self, index: &str) -> ClientResult<Value>;

    /// Whether an alias named `name` exists on any index.
    async fn alias_exists(&self, name: &str) -> ClientResult<bool>;

    /// Returns the alias record for `name`: an object keyed by the names of
    /// every index currently holding the alias.
    async fn get_alias(&self, name: &str) -> ClientResult<Value>;

    /// Points alias `name` at `index`.
    async fn put_alias(&self, index: &str, name: &str) -> ClientResult<()>;

    /// Removes alias `name` from `index`.
    async fn delete_alias(&self, index: &str, name: &str) -> ClientResult<()>;

    /// Executes a search request against `index`.
    async fn search(&self, index: &str, body: Value) -> ClientResult<Value>;

    /// Executes a count request against `index`.
    async fn count(&self, index: &str, body: Value) -> ClientResult<Value>;

    /// Executes a delete-by-query request against `index`.
    async fn delete_by_query(&self, index: &str, body: Value) -> ClientResult<Value>;

    /// Submits a bulk request against `index`. `operations` is the flat
    /// action/source line sequence of the bulk wire format.
    async fn bulk(&self, index: &str, operations: Vec<Value>) -> ClientResult<Value>;
}
