//! Secondary index advice for filtered fields the key layout cannot serve.

use std::collections::HashSet;

use keyplan_core::{
    has_text, normalize, AccessPattern, Cardinality, ClusteringKeyRecommendation,
    IndexRecommendation,
};
use tracing::debug;

use crate::context::{partition_key_set, EntityContext};
use crate::diagnostics::{Diagnostics, SUMMARY_INDEXES};

/// Index recommendations in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct IndexAdvice {
    pub indexes: Vec<IndexRecommendation>,
    pub diagnostics: Diagnostics,
}

/// Recommend one index per distinct filtered field, of any filter type,
/// that is neither a partition nor a clustering key. The first pattern to
/// filter on a field supplies the reason.
pub fn recommend_indexes(
    ctx: &EntityContext<'_>,
    partition_key: &[String],
    clustering_keys: &[ClusteringKeyRecommendation],
) -> IndexAdvice {
    let mut placed = partition_key_set(partition_key);
    placed.extend(clustering_keys.iter().map(|k| normalize(&k.field)));

    let mut indexed: HashSet<String> = HashSet::new();
    let mut advice = IndexAdvice::default();

    for view in &ctx.patterns {
        for filter in &view.pattern.filters {
            if !has_text(Some(filter.field.as_str())) {
                continue;
            }
            let Some(field) = ctx.field(&filter.field) else {
                continue;
            };
            let name = field.normalized_name();
            if placed.contains(&name) || !indexed.insert(name) {
                continue;
            }

            debug!(field = %field.name, pattern = view.pattern.display_name(), "Recommending index");
            advice.indexes.push(IndexRecommendation {
                field: field.name.clone(),
                reason: format!("Required for access pattern: {}", pattern_label(view.pattern)),
                cardinality: field.cardinality,
            });

            if field.cardinality == Cardinality::Low {
                advice.diagnostics.warn(format!(
                    "Index on low-cardinality field {} may not be optimal.",
                    field.name
                ));
            }
        }
    }

    if !advice.indexes.is_empty() {
        let fields: Vec<&str> = advice.indexes.iter().map(|i| i.field.as_str()).collect();
        advice.diagnostics.note(SUMMARY_INDEXES, fields.join(", "));
    }

    advice
}

/// Trimmed description, else name, else empty.
fn pattern_label(pattern: &AccessPattern) -> &str {
    match pattern.description.as_deref() {
        Some(description) if has_text(Some(description)) => description.trim(),
        _ => pattern.name.as_deref().unwrap_or(""),
    }
}
