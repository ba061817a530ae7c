//! Castnet: an Elasticsearch driver with rule-based query building and
//! zero-downtime index migration.
//!
//! The driver sits between an application's model layer and the search
//! engine. It covers two tightly coupled concerns:
//!
//! - **Payload construction**: a fluent [`SearchRequest`](search::SearchRequest)
//!   plus pluggable [`Rule`](search::Rule)s translate deterministically into
//!   one or more candidate wire documents, which the
//!   [`ElasticEngine`](engine::ElasticEngine) submits in priority order,
//!   short-circuiting on the first candidate with results.
//! - **Migration orchestration**: a [`Migrator`](index::migrate::Migrator)
//!   creates a new index, propagates settings and per-entity mappings,
//!   re-imports all documents, repoints the write alias, and removes the
//!   obsolete index.
//!
//! # Architecture
//!
//! - [`payload`] - Nested wire-document builder with conditional-set
//!   semantics
//! - [`search`] - Request description, rules, and payload translation
//! - [`client`] - Engine operations behind a swappable async trait
//! - [`engine`] - Execution coordination and the write path
//! - [`index`] - Index configuration contracts and migration
//! - [`indexer`] / [`import`] - Bulk writes and full re-import
//! - [`config`] / [`error`] - Configuration and error types
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use castnet::{ConnectionConfig, ElasticClient, ElasticEngine, EngineConfig};
//! use castnet::indexer::BulkIndexer;
//! use castnet::search::SearchRequest;
//!
//! let client = Arc::new(ElasticClient::new(&ConnectionConfig::default())?);
//! let config = EngineConfig::default();
//! let indexer = Arc::new(BulkIndexer::new(client.clone(), &config));
//! let engine = ElasticEngine::new(client, indexer, config);
//!
//! // `product` implements SearchableEntity.
//! let request = SearchRequest::new(product, "wireless phone")
//!     .where_term("status", "active")
//!     .take(25);
//! let outcome = engine.search(&request).await?;
//! println!("{} hits", outcome.total_hits());
//! ```
//!
//! # Concurrency
//!
//! One logical thread of control per request or migration; no internal
//! parallelism. Independent search requests need no coordination. The
//! engine-owned "mappings already refreshed" set is guarded by a mutex so
//! concurrent writers stay correct.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod index;
pub mod indexer;
pub mod payload;
pub mod search;

pub use client::{ElasticClient, SearchClient};
pub use config::{Auth, ConnectionConfig, EngineConfig};
pub use engine::{ElasticEngine, Highlight, SearchOutcome};
pub use error::{ClientError, ConfigurationError, EngineError, EngineResult};
pub use import::{ChunkedImporter, DataSource, Importer};
pub use index::migrate::{MigrationReport, Migrator};
pub use index::{IndexConfigurator, SearchableEntity};
pub use indexer::{BulkIndexer, Indexer, SearchDocument};
pub use payload::{Payload, deep_merge};
pub use search::{BoolClause, Rule, SearchRequest, SearchRule, SortOrder};
