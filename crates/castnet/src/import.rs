//! Full re-import of entity data into the search engine.
//!
//! A migration triggers one import per entity type by name. The
//! [`ChunkedImporter`] resolves the name to its registered entity, drains
//! every [`DataSource`] attached to it, and feeds the documents to the
//! [`Indexer`](crate::indexer::Indexer) in config-sized chunks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::error::{ConfigurationError, EngineResult};
use crate::index::SearchableEntity;
use crate::indexer::{Indexer, SearchDocument};

/// Triggers a full re-import for an entity type.
///
/// The trigger returns once the import has been issued; document-level
/// completion tracking beyond the call returning is up to the
/// implementation.
#[async_trait]
pub trait Importer: Send + Sync {
    /// Re-imports all searchable data for the entity type named
    /// `type_name`.
    async fn import(&self, type_name: &str) -> EngineResult<()>;
}

/// Produces the full searchable dataset for one entity.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches every document this source contributes.
    async fn fetch_all(&self) -> EngineResult<Vec<SearchDocument>>;
}

struct Registration {
    entity: Arc<dyn SearchableEntity>,
    sources: Vec<Arc<dyn DataSource>>,
}

/// Importer draining registered data sources in chunks.
pub struct ChunkedImporter {
    indexer: Arc<dyn Indexer>,
    chunk_size: usize,
    registrations: HashMap<String, Registration>,
}

impl ChunkedImporter {
    /// Creates an importer with the configured chunk size.
    pub fn new(indexer: Arc<dyn Indexer>, config: &EngineConfig) -> Self {
        Self {
            indexer,
            chunk_size: config.chunk_size.max(1),
            registrations: HashMap::new(),
        }
    }

    /// Registers an entity with its data sources, keyed by the entity's
    /// type name.
    pub fn register(&mut self, entity: Arc<dyn SearchableEntity>, sources: Vec<Arc<dyn DataSource>>) {
        self.registrations.insert(
            entity.type_name().to_string(),
            Registration { entity, sources },
        );
    }
}

#[async_trait]
impl Importer for ChunkedImporter {
    async fn import(&self, type_name: &str) -> EngineResult<()> {
        let registration = self.registrations.get(type_name).ok_or_else(|| {
            ConfigurationError::UnknownEntityType {
                type_name: type_name.to_string(),
            }
        })?;

        let mut total = 0usize;
        for source in &registration.sources {
            let documents = source.fetch_all().await?;
            total += documents.len();
            for chunk in documents.chunks(self.chunk_size) {
                self.indexer.index(registration.entity.as_ref(), chunk).await?;
            }
        }

        tracing::info!(
            entity = %type_name,
            documents = total,
            "Imported entity documents"
        );
        Ok(())
    }
}
