//! Index configuration and entity collaborator contracts.
//!
//! An [`IndexConfigurator`] describes one physical index: its name, settings,
//! default mapping, optional write alias, and the entity types it hosts. A
//! [`SearchableEntity`] describes one document-producing entity type. The
//! driver consumes both purely through these traits; the application's model
//! layer provides the implementations.

pub mod migrate;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::SearchClient;
use crate::error::EngineResult;
use crate::payload::{deep_merge, is_empty_value};
use crate::search::rule::Rule;

/// Describes one search index.
pub trait IndexConfigurator: Send + Sync {
    /// The configured index name.
    fn name(&self) -> &str;

    /// Index settings document. May be empty, in which case indices are
    /// created with engine defaults.
    fn settings(&self) -> Value {
        Value::Null
    }

    /// The mapping every hosted entity type starts from.
    fn default_mapping(&self) -> Value {
        Value::Null
    }

    /// The write alias used for zero-downtime cutover. `None` means the
    /// configurator cannot take part in a migration.
    fn write_alias(&self) -> Option<String> {
        None
    }

    /// The entity type names hosted by this index.
    fn entity_types(&self) -> Vec<String>;
}

/// Describes one searchable entity type.
pub trait SearchableEntity: Send + Sync {
    /// A stable identifier for the entity type.
    fn type_name(&self) -> &str;

    /// The document type name this entity is indexed under.
    fn searchable_as(&self) -> &str;

    /// The entity's own mapping contribution. Merged over the
    /// configurator's default mapping (default wins scalar conflicts).
    fn mapping(&self) -> Value {
        Value::Null
    }

    /// The entity's default search rules.
    fn search_rules(&self) -> Vec<Rule> {
        Vec::new()
    }

    /// The index configurator this entity is hosted by.
    fn configurator(&self) -> Arc<dyn IndexConfigurator>;
}

/// The effective mapping of `entity` under `configurator`: the default
/// mapping deep-merged with the entity's own, default-then-entity precedence.
pub fn effective_mapping(configurator: &dyn IndexConfigurator, entity: &dyn SearchableEntity) -> Value {
    deep_merge(&configurator.default_mapping(), &entity.mapping())
}

/// Pushes the effective mapping of `entity` to `index`, scoped to the
/// entity's document type.
///
/// An empty effective mapping is a warning, not an error: the push is
/// skipped and `Ok(false)` is returned.
pub async fn update_entity_mapping(
    client: &dyn SearchClient,
    configurator: &dyn IndexConfigurator,
    entity: &dyn SearchableEntity,
    index: &str,
) -> EngineResult<bool> {
    let mapping = effective_mapping(configurator, entity);

    if is_empty_value(&mapping) {
        tracing::warn!(
            index = %configurator.name(),
            entity = %entity.type_name(),
            "The computed mapping is empty; skipping mapping update"
        );
        return Ok(false);
    }

    let doc_type = entity.searchable_as();
    let mut body = Map::new();
    body.insert(doc_type.to_string(), mapping);
    client
        .put_mapping(index, doc_type, Value::Object(body))
        .await?;

    tracing::info!(
        index = %index,
        entity = %entity.type_name(),
        "The index mapping was updated"
    );
    Ok(true)
}
