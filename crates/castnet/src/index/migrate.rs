//! Index migration orchestration.
//!
//! [`Migrator`] drives the full sequence: target existence check, index
//! creation, per-entity mapping propagation, write-alias cutover, full
//! re-import, and, for replacement migrations, source removal and alias
//! promotion. Re-running a migration against an already-migrated target is a
//! no-op past the existence check.
//!
//! There is no partial rollback: a failure after target creation but before
//! alias promotion leaves the target index for the operator to clean up.
//! The one compensating action is the settings-update sub-protocol, which
//! reopens the index before re-raising any failure inside the close/apply
//! window.

use std::sync::Arc;

use crate::client::SearchClient;
use crate::error::{ConfigurationError, EngineResult};
use crate::import::Importer;
use crate::index::{IndexConfigurator, SearchableEntity, update_entity_mapping};
use crate::payload::{Payload, is_empty_value};

/// What a completed migration did.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// The index migrated to.
    pub target: String,
    /// Whether the target was created. `false` means the migration was a
    /// no-op against an existing target.
    pub created: bool,
    /// Entity types whose mapping was pushed.
    pub mapped_types: Vec<String>,
    /// Entity types skipped because their effective mapping was empty.
    pub skipped_mappings: Vec<String>,
    /// Entity types whose import was triggered.
    pub imported_types: Vec<String>,
    /// Indices removed during replacement cleanup.
    pub removed_indices: Vec<String>,
    /// Whether the target was promoted under the source's own name.
    pub promoted: bool,
}

/// Drives one migration of an index configuration to a target index.
pub struct Migrator<'a> {
    client: &'a dyn SearchClient,
    configurator: &'a dyn IndexConfigurator,
    entities: &'a [Arc<dyn SearchableEntity>],
    importer: &'a dyn Importer,
    target: Option<String>,
}

impl<'a> Migrator<'a> {
    /// Creates a migrator. `entities` must cover every type name the
    /// configurator lists; the mismatch is a configuration error reported
    /// before any mutation.
    pub fn new(
        client: &'a dyn SearchClient,
        configurator: &'a dyn IndexConfigurator,
        entities: &'a [Arc<dyn SearchableEntity>],
        importer: &'a dyn Importer,
    ) -> Self {
        Self {
            client,
            configurator,
            entities,
            importer,
            target: None,
        }
    }

    /// Migrates to an explicitly named target index instead of the
    /// configurator's own name. A target name differing from the source
    /// name makes this a replacement migration: after import the source is
    /// removed and the target promoted under the source's name.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    fn target_name(&self) -> String {
        self.target
            .clone()
            .unwrap_or_else(|| self.configurator.name().to_string())
    }

    /// Runs the full migration.
    pub async fn migrate(&self) -> EngineResult<MigrationReport> {
        let write_alias = self.configurator.write_alias().ok_or_else(|| {
            ConfigurationError::NotMigratable {
                configurator: self.configurator.name().to_string(),
            }
        })?;
        let entities = self.resolve_entities()?;

        let source_name = self.configurator.name().to_string();
        let target = self.target_name();
        let mut report = MigrationReport {
            target: target.clone(),
            ..Default::default()
        };

        let target_exists = self.client.index_exists(&target).await?;
        let replacement = !target_exists
            && self
                .target
                .as_deref()
                .is_some_and(|explicit| explicit != source_name);

        if !target_exists {
            self.create_target_index(&target).await?;
            report.created = true;

            for entity in &entities {
                let updated =
                    update_entity_mapping(self.client, self.configurator, entity.as_ref(), &target)
                        .await?;
                if updated {
                    report.mapped_types.push(entity.type_name().to_string());
                } else {
                    report.skipped_mappings.push(entity.type_name().to_string());
                }
            }

            self.create_alias_for_target(&target, &write_alias).await?;

            for entity in &entities {
                self.importer.import(entity.type_name()).await?;
                report.imported_types.push(entity.type_name().to_string());
            }

            if replacement {
                report.removed_indices = self.delete_source_index().await?;
                self.create_alias_for_target(&target, &source_name).await?;
                report.promoted = true;
            }
        }

        tracing::info!(
            source = %source_name,
            target = %target,
            created = report.created,
            "The index configuration was migrated"
        );
        Ok(report)
    }

    /// Applies the configurator's settings to the target index through the
    /// close/apply/open sub-protocol.
    ///
    /// The index is never left closed: any failure inside the window
    /// triggers a reopen before the original error is re-raised unchanged.
    pub async fn update_settings(&self) -> EngineResult<()> {
        let target = self.target_name();

        if let Err(err) = self.close_apply_open(&target).await {
            if let Err(reopen_err) = self.client.open_index(&target).await {
                tracing::error!(
                    index = %target,
                    error = %reopen_err,
                    "Failed to reopen index after settings update failure"
                );
            }
            return Err(err);
        }

        tracing::info!(index = %target, "The index settings were updated");
        Ok(())
    }

    async fn close_apply_open(&self, target: &str) -> EngineResult<()> {
        self.client.close_index(target).await?;

        let settings = self.configurator.settings();
        if !is_empty_value(&settings) {
            let body = Payload::new().set("settings", settings).into_value();
            self.client.put_settings(target, body).await?;
        }

        self.client.open_index(target).await?;
        Ok(())
    }

    async fn create_target_index(&self, target: &str) -> EngineResult<()> {
        let body = Payload::new()
            .set_if_not_empty("settings", self.configurator.settings())
            .into_value();

        self.client.create_index(target, body).await?;
        tracing::info!(index = %target, "The index was created");
        Ok(())
    }

    /// Points `name` at `target`, first deleting the alias from every index
    /// currently holding it. Aliases are not assumed to be exclusive to one
    /// index beforehand.
    async fn create_alias_for_target(&self, target: &str, name: &str) -> EngineResult<()> {
        if self.client.alias_exists(name).await? {
            let aliases = self.client.get_alias(name).await?;
            if let Some(holders) = aliases.as_object() {
                for index in holders.keys() {
                    self.client.delete_alias(index, name).await?;
                    tracing::info!(
                        alias = %name,
                        index = %index,
                        "The alias was deleted"
                    );
                }
            }
        }

        self.client.put_alias(target, name).await?;
        tracing::info!(alias = %name, index = %target, "The alias was created");
        Ok(())
    }

    /// Removes the source index: every index behind the source name when it
    /// is itself an alias, otherwise the index directly.
    async fn delete_source_index(&self) -> EngineResult<Vec<String>> {
        let name = self.configurator.name();
        let mut removed = Vec::new();

        if self.client.alias_exists(name).await? {
            let aliases = self.client.get_alias(name).await?;
            if let Some(holders) = aliases.as_object() {
                for index in holders.keys() {
                    self.client.delete_index(index).await?;
                    tracing::info!(index = %index, "The index was removed");
                    removed.push(index.clone());
                }
            }
        } else {
            self.client.delete_index(name).await?;
            tracing::info!(index = %name, "The index was removed");
            removed.push(name.to_string());
        }

        Ok(removed)
    }

    fn resolve_entities(&self) -> Result<Vec<Arc<dyn SearchableEntity>>, ConfigurationError> {
        self.configurator
            .entity_types()
            .iter()
            .map(|type_name| {
                self.entities
                    .iter()
                    .find(|entity| entity.type_name() == *type_name)
                    .cloned()
                    .ok_or_else(|| ConfigurationError::UnknownEntityType {
                        type_name: type_name.clone(),
                    })
            })
            .collect()
    }
}
