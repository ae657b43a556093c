//! Partition key selection.
//!
//! The partition key is driven by equality/IN filter frequency across all
//! access patterns. Time-typed fields never win the heuristic; a declared
//! tenant field is prepended when the entity is multi-tenant. Cardinality is
//! only consulted for warnings, never for selection.

use indexmap::IndexMap;
use keyplan_core::{has_text, normalize, Cardinality, FieldMetadata, PartitionSizeExpectation};
use tracing::{debug, trace};

use crate::context::EntityContext;
use crate::diagnostics::{Diagnostics, SUMMARY_MULTI_TENANT, SUMMARY_PARTITION_KEY};

/// Partition key fields in order, plus what was noticed choosing them.
#[derive(Debug, Clone, Default)]
pub struct PartitionKeySelection {
    pub partition_key: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Choose the partition key for an entity.
///
/// Always yields at least one field for an entity with at least one named
/// field; selection problems surface as warnings.
pub fn select_partition_key(ctx: &EntityContext<'_>) -> PartitionKeySelection {
    let mut partition_key: Vec<String> = Vec::new();
    let mut diagnostics = Diagnostics::new();
    let constraints = ctx.constraints();

    if constraints.map(|c| c.is_multi_tenant()).unwrap_or(false) {
        match resolve_tenant_field(ctx) {
            Some(tenant) => {
                debug!(field = %tenant.name, "Prepending tenant field to partition key");
                partition_key.push(tenant.name.clone());
                diagnostics.note(
                    SUMMARY_MULTI_TENANT,
                    format!(
                        "Included {} as leading partition key to isolate tenants.",
                        tenant.name
                    ),
                );
            }
            None => diagnostics.warn(
                "Multi-tenant flag set but no tenant field provided; tenant isolation not guaranteed.",
            ),
        }
    }

    let frequency = filter_frequency(ctx);
    let candidates = rank_candidates(ctx, &frequency);

    let mut chosen: Option<&FieldMetadata> = None;
    if let Some(candidate) = candidates
        .iter()
        .map(|(field, _)| *field)
        .find(|field| !contains_ignore_case(&partition_key, &field.name))
    {
        debug!(
            field = %candidate.name,
            frequency = frequency.get(&candidate.normalized_name()).copied().unwrap_or(0),
            "Selected partition key from access pattern frequency"
        );
        partition_key.push(candidate.name.clone());
        chosen = Some(candidate);
    }

    if partition_key.is_empty() {
        if let Some(field) = ctx.fields().find(|f| !f.time_field) {
            debug!(field = %field.name, "No pattern candidate; falling back to first non-time field");
            partition_key.push(field.name.clone());
            chosen = Some(field);
            diagnostics.warn(
                "No fields found in access patterns; using first non-time field as partition key. \
                 Recommendation: Review access patterns to ensure partition key selection.",
            );
        }
    }

    if partition_key.is_empty() {
        if let Some(field) = ctx.fields().next() {
            debug!(field = %field.name, "Only time fields declared; defaulting to first field");
            partition_key.push(field.name.clone());
            chosen = Some(field);
            diagnostics.warn("No ideal partition key found; defaulted to first declared field.");
        }
    }

    let chosen = chosen.or_else(|| partition_key.first().and_then(|name| ctx.field(name)));
    let chosen_frequency = chosen
        .and_then(|field| frequency.get(&field.normalized_name()).copied())
        .unwrap_or(0);

    if let Some(field) = chosen {
        match field.cardinality {
            Cardinality::Low => diagnostics.warn(format!(
                "Partition key {} has LOW cardinality. Recommendation: Consider adding bucketing \
                 or using a composite partition key to improve data distribution.",
                field.name
            )),
            Cardinality::Unknown => diagnostics.warn(format!(
                "Partition key {} cardinality is UNKNOWN. Recommendation: Verify this field has \
                 sufficient cardinality (1000+ unique values) for even data distribution.",
                field.name
            )),
            Cardinality::High | Cardinality::Medium => {}
        }
    }

    let very_large = constraints
        .map(|c| c.partition_size_expectation == PartitionSizeExpectation::VeryLarge)
        .unwrap_or(false);
    if very_large && partition_key.len() == 1 {
        diagnostics.warn(
            "Very large partitions expected but partition key has a single column. \
             Recommend composite PK with bucketing.",
        );
    }

    if let Some(field) = chosen {
        if chosen_frequency == 1 && frequency.len() > 1 {
            diagnostics.warn(format!(
                "Partition key {} appears in only 1 access pattern. Recommendation: Consider if a \
                 more frequently used field would be a better partition key.",
                field.name
            ));
        }
    }

    diagnostics.note(
        SUMMARY_PARTITION_KEY,
        format!(
            "{} selected based on access pattern frequency ({} occurrences across patterns).",
            partition_key.join(", "),
            chosen_frequency
        ),
    );

    PartitionKeySelection {
        partition_key,
        diagnostics,
    }
}

/// Explicit `tenantField` when it resolves, else the first field flagged as
/// a tenant field.
fn resolve_tenant_field<'a>(ctx: &EntityContext<'a>) -> Option<&'a FieldMetadata> {
    ctx.constraints()
        .and_then(|c| c.tenant_field.as_deref())
        .filter(|name| has_text(Some(*name)))
        .and_then(|name| ctx.field(name))
        .or_else(|| ctx.fields().find(|f| f.tenant_field))
}

/// Count equality/IN filters per known non-time field, keyed by normalized
/// name in first-occurrence order.
fn filter_frequency(ctx: &EntityContext<'_>) -> IndexMap<String, usize> {
    let mut frequency: IndexMap<String, usize> = IndexMap::new();

    for view in &ctx.patterns {
        for filter in &view.pattern.filters {
            if !filter.filter_type.is_point_lookup() || !has_text(Some(filter.field.as_str())) {
                continue;
            }
            let Some(field) = ctx.field(&filter.field) else {
                trace!(field = %filter.field, "Filter references undeclared field");
                continue;
            };
            if field.time_field {
                trace!(field = %field.name, "Time field excluded from partition candidates");
                continue;
            }
            *frequency.entry(field.normalized_name()).or_insert(0) += 1;
        }
    }

    frequency
}

/// Order candidates by frequency descending, business keys first on ties,
/// first occurrence otherwise.
fn rank_candidates<'a>(
    ctx: &EntityContext<'a>,
    frequency: &IndexMap<String, usize>,
) -> Vec<(&'a FieldMetadata, usize)> {
    let mut candidates: Vec<(&'a FieldMetadata, usize)> = frequency
        .iter()
        .filter_map(|(name, count)| ctx.field(name).map(|field| (field, *count)))
        .collect();

    candidates.sort_by(|(a, a_count), (b, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| b.business_key.cmp(&a.business_key))
    });

    candidates
}

fn contains_ignore_case(fields: &[String], candidate: &str) -> bool {
    let candidate = normalize(candidate);
    fields.iter().any(|f| normalize(f) == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyplan_core::{AccessPattern, ConstraintSettings, EntityModelRequest, FilterType};

    fn field(name: &str, cardinality: Cardinality) -> FieldMetadata {
        FieldMetadata {
            cardinality,
            ..FieldMetadata::new(name)
        }
    }

    fn entity(fields: Vec<FieldMetadata>, patterns: Vec<AccessPattern>) -> EntityModelRequest {
        EntityModelRequest {
            entity_name: "events".to_string(),
            fields,
            access_patterns: patterns,
            ..Default::default()
        }
    }

    #[test]
    fn test_most_frequent_equality_field_wins() {
        let entity = entity(
            vec![
                field("user_id", Cardinality::High),
                field("device_id", Cardinality::High),
            ],
            vec![
                AccessPattern::named("a").filter("device_id", FilterType::Equality),
                AccessPattern::named("b").filter("user_id", FilterType::Equality),
                AccessPattern::named("c").filter("user_id", FilterType::In),
            ],
        );
        let ctx = EntityContext::new(&entity);
        let selection = select_partition_key(&ctx);
        assert_eq!(selection.partition_key, vec!["user_id"]);
        assert!(selection.diagnostics.warnings.is_empty());
        assert_eq!(
            selection.diagnostics.summary[SUMMARY_PARTITION_KEY],
            "user_id selected based on access pattern frequency (2 occurrences across patterns)."
        );
    }

    #[test]
    fn test_business_key_breaks_ties() {
        let entity = entity(
            vec![
                field("status", Cardinality::High),
                FieldMetadata {
                    business_key: true,
                    ..field("order_id", Cardinality::High)
                },
            ],
            vec![AccessPattern::named("a")
                .filter("status", FilterType::Equality)
                .filter("order_id", FilterType::Equality)],
        );
        let ctx = EntityContext::new(&entity);
        assert_eq!(select_partition_key(&ctx).partition_key, vec!["order_id"]);
    }

    #[test]
    fn test_range_and_time_fields_are_not_candidates() {
        let entity = entity(
            vec![
                FieldMetadata {
                    time_field: true,
                    ..field("created_at", Cardinality::High)
                },
                field("amount", Cardinality::High),
                field("region", Cardinality::High),
            ],
            vec![AccessPattern::named("a")
                .filter("created_at", FilterType::Equality)
                .filter("amount", FilterType::Range)],
        );
        let ctx = EntityContext::new(&entity);
        let selection = select_partition_key(&ctx);
        assert_eq!(selection.partition_key, vec!["amount"]);
        assert!(selection.diagnostics.warnings[0].starts_with("No fields found in access patterns"));
    }

    #[test]
    fn test_only_time_fields_defaults_to_first_field() {
        let entity = entity(
            vec![FieldMetadata {
                time_field: true,
                cardinality: Cardinality::High,
                ..FieldMetadata::new("ts")
            }],
            vec![AccessPattern::named("a").filter("ts", FilterType::Range)],
        );
        let ctx = EntityContext::new(&entity);
        let selection = select_partition_key(&ctx);
        assert_eq!(selection.partition_key, vec!["ts"]);
        assert_eq!(
            selection.diagnostics.warnings,
            vec!["No ideal partition key found; defaulted to first declared field."]
        );
    }

    #[test]
    fn test_tenant_field_leads_and_heuristic_follows() {
        let mut entity = entity(
            vec![
                field("account_id", Cardinality::High),
                field("org", Cardinality::Medium),
            ],
            vec![AccessPattern::named("a").filter("account_id", FilterType::Equality)],
        );
        entity.constraints = Some(ConstraintSettings {
            multi_tenant: Some(true),
            tenant_field: Some("ORG".to_string()),
            ..Default::default()
        });
        let ctx = EntityContext::new(&entity);
        let selection = select_partition_key(&ctx);
        assert_eq!(selection.partition_key, vec!["org", "account_id"]);
        assert_eq!(
            selection.diagnostics.summary[SUMMARY_MULTI_TENANT],
            "Included org as leading partition key to isolate tenants."
        );
        let topics: Vec<&str> = selection.diagnostics.summary.keys().map(String::as_str).collect();
        assert_eq!(topics, vec![SUMMARY_MULTI_TENANT, SUMMARY_PARTITION_KEY]);
    }

    #[test]
    fn test_tenant_flag_without_field_warns() {
        let mut entity = entity(
            vec![field("account_id", Cardinality::High)],
            vec![AccessPattern::named("a").filter("account_id", FilterType::Equality)],
        );
        entity.constraints = Some(ConstraintSettings {
            multi_tenant: Some(true),
            tenant_field: Some("missing".to_string()),
            ..Default::default()
        });
        let ctx = EntityContext::new(&entity);
        let selection = select_partition_key(&ctx);
        assert_eq!(selection.partition_key, vec!["account_id"]);
        assert_eq!(
            selection.diagnostics.warnings,
            vec!["Multi-tenant flag set but no tenant field provided; tenant isolation not guaranteed."]
        );
    }

    #[test]
    fn test_cardinality_and_frequency_diagnostics() {
        let entity = entity(
            vec![
                FieldMetadata {
                    business_key: true,
                    ..field("kind", Cardinality::Low)
                },
                field("other", Cardinality::Unknown),
            ],
            vec![AccessPattern::named("a")
                .filter("kind", FilterType::Equality)
                .filter("other", FilterType::Equality)],
        );
        let ctx = EntityContext::new(&entity);
        let warnings = select_partition_key(&ctx).diagnostics.warnings;
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Partition key kind has LOW cardinality."));
        assert!(warnings[1].starts_with("Partition key kind appears in only 1 access pattern."));
    }

    #[test]
    fn test_very_large_single_column_warns() {
        let mut entity = entity(
            vec![field("sensor", Cardinality::High)],
            vec![AccessPattern::named("a").filter("sensor", FilterType::Equality)],
        );
        entity.constraints = Some(ConstraintSettings {
            partition_size_expectation: PartitionSizeExpectation::VeryLarge,
            ..Default::default()
        });
        let ctx = EntityContext::new(&entity);
        let warnings = select_partition_key(&ctx).diagnostics.warnings;
        assert_eq!(
            warnings,
            vec!["Very large partitions expected but partition key has a single column. Recommend composite PK with bucketing."]
        );
    }
}
