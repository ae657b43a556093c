//! Recommendation orchestrator.
//!
//! Validates each entity, then runs partition selection, clustering
//! selection, index advice, constraint diagnostics and DDL generation in that
//! order. Batches either abort on the first invalid entity or isolate
//! failures per entity, depending on [`BatchPolicy`].

use keyplan_core::{
    has_text, logging, BatchPolicy, EntityError, EntityModelRequest, EntityModelResponse, Error,
    ModelerConfig, ModelingRequest, ModelingResponse, Result,
};
use tracing::{debug, field::Empty, info, instrument, warn, Span};

use crate::clustering::select_clustering_keys;
use crate::context::EntityContext;
use crate::ddl::{generate_ddl, sanitize_identifier, TableTarget};
use crate::diagnostics::Diagnostics;
use crate::indexes::recommend_indexes;
use crate::partition::select_partition_key;

/// Stateless key layout advisor. Holds only immutable configuration, so one
/// instance can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Modeler {
    config: ModelerConfig,
}

impl Modeler {
    pub fn new(config: ModelerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelerConfig {
        &self.config
    }

    /// Model every entity of a request, in request order.
    #[instrument(
        skip(self, request),
        fields(
            subsystem = "modeler",
            component = "modeler",
            op = "generate",
            policy = %self.config.batch_policy,
            entity_count = Empty,
            rejected_count = Empty,
        )
    )]
    pub fn generate(&self, request: &ModelingRequest) -> Result<ModelingResponse> {
        Span::current().record(logging::ENTITY_COUNT, request.entities.len());

        if request.entities.is_empty() {
            return Err(Error::Validation(
                "At least one entity is required to generate a data model.".to_string(),
            ));
        }

        let mut response = ModelingResponse::default();

        for (index, entity) in request.entities.iter().enumerate() {
            match self.model_entity(entity) {
                Ok(layout) => response.entities.push(layout),
                Err(Error::Validation(message))
                    if self.config.batch_policy == BatchPolicy::IsolatePerEntity =>
                {
                    warn!(index, entity = %entity.entity_name, error = %message, "Entity rejected");
                    response.errors.push(EntityError {
                        index,
                        entity_name: Some(entity.entity_name.clone())
                            .filter(|name| has_text(Some(name.as_str()))),
                        message,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Span::current().record(logging::REJECTED_COUNT, response.errors.len());
        info!(
            modeled = response.entities.len(),
            rejected = response.errors.len(),
            "Modeling request complete"
        );
        Ok(response)
    }

    /// Validate and model one entity.
    #[instrument(
        skip(self, entity),
        fields(
            subsystem = "modeler",
            component = "modeler",
            op = "model_entity",
            entity = %entity.entity_name,
            partition_key = Empty,
            clustering_key_count = Empty,
            index_count = Empty,
            warning_count = Empty,
        )
    )]
    pub fn model_entity(&self, entity: &EntityModelRequest) -> Result<EntityModelResponse> {
        validate_entity(entity)?;

        let ctx = EntityContext::new(entity);
        let target = TableTarget::new(
            self.resolve_keyspace(entity),
            sanitize_identifier(&entity.entity_name),
        );

        let partition = select_partition_key(&ctx);
        let clustering = select_clustering_keys(&ctx, &partition.partition_key);
        let indexes = recommend_indexes(&ctx, &partition.partition_key, &clustering.clustering_keys);

        let mut diagnostics = Diagnostics::new();
        diagnostics.absorb(partition.diagnostics);
        diagnostics.absorb(clustering.diagnostics);
        diagnostics.absorb(indexes.diagnostics);
        self.apply_constraint_warnings(entity, &mut diagnostics);

        let ddl = generate_ddl(
            entity,
            &target,
            &partition.partition_key,
            &clustering.clustering_keys,
            &indexes.indexes,
        );

        let span = Span::current();
        span.record(logging::PARTITION_KEY, partition.partition_key.join(",").as_str());
        span.record(logging::CLUSTERING_KEY_COUNT, clustering.clustering_keys.len());
        span.record(logging::INDEX_COUNT, indexes.indexes.len());
        span.record(logging::WARNING_COUNT, diagnostics.warnings.len());
        debug!(keyspace = %target.keyspace, table = %target.table, "Entity modeled");

        Ok(EntityModelResponse {
            entity_name: entity.entity_name.clone(),
            keyspace: target.keyspace,
            table_name: target.table,
            partition_key: partition.partition_key,
            clustering_keys: clustering.clustering_keys,
            indexes: indexes.indexes,
            warnings: diagnostics.warnings,
            summary: diagnostics.summary,
            create_table_cql: ddl.create_table_cql,
            index_cql: ddl.index_cql,
        })
    }

    /// Constraint keyspace, then entity keyspace, then the configured
    /// default.
    fn resolve_keyspace(&self, entity: &EntityModelRequest) -> String {
        let requested = entity
            .constraints
            .as_ref()
            .and_then(|c| c.keyspace.as_deref())
            .filter(|k| has_text(Some(*k)))
            .or_else(|| entity.keyspace.as_deref().filter(|k| has_text(Some(*k))));

        match requested {
            Some(keyspace) => sanitize_identifier(keyspace),
            None => self.config.default_keyspace.clone(),
        }
    }

    fn apply_constraint_warnings(&self, entity: &EntityModelRequest, diagnostics: &mut Diagnostics) {
        let threshold = self.config.large_partition_mb;
        let oversized = entity
            .constraints
            .as_ref()
            .and_then(|c| c.expected_partition_size_mb)
            .map_or(false, |mb| mb > threshold);

        if oversized {
            diagnostics.warn(format!(
                "Expected partition size exceeds {}MB. Consider adding bucketing to partition key.",
                threshold
            ));
        }
    }
}

/// Reject entities the pipeline cannot model.
pub fn validate_entity(entity: &EntityModelRequest) -> Result<()> {
    if !has_text(Some(entity.entity_name.as_str())) {
        return Err(Error::Validation("Entity name is required.".to_string()));
    }
    if !entity.fields.iter().any(|f| has_text(Some(f.name.as_str()))) {
        return Err(Error::Validation(format!(
            "Fields are required for {}.",
            entity.entity_name
        )));
    }
    if entity.access_patterns.is_empty() {
        return Err(Error::Validation(format!(
            "At least one access pattern is required for {}.",
            entity.entity_name
        )));
    }
    if !entity.access_patterns.iter().any(|p| p.has_filters()) {
        return Err(Error::Validation(format!(
            "At least one access pattern with filters is required for {}.",
            entity.entity_name
        )));
    }
    Ok(())
}
