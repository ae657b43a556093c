//! Clustering key selection.
//!
//! Only patterns that filter on a partition key field ("PK-qualified")
//! contribute clustering keys. Three passes run over those patterns in
//! request order, each appending to one ordered key list:
//!
//! 1. **Equality** - equality/IN filter fields, unless another sort-bearing
//!    pattern could no longer reach its ORDER BY column.
//! 2. **Range** - range filter fields.
//! 3. **Ordering** - sort fields, which may skip intermediate keys but never
//!    the first one. A field that is both point-filtered and sorted by the
//!    same pattern is mandatory: it is inserted right after the last key the
//!    pattern filters on, and keys after that slot the pattern never
//!    references are dropped so the new key stays reachable.
//!
//! The equality and range passes only extend the list from a pattern that
//! constrains every key already placed, so each such key is reachable
//! through a full prefix by the pattern that contributed it. For the range
//! pass this is stricter than requiring only the key in position 0: with
//! keys `[a, b]` placed, a pattern filtering `a` and ranging on `r` cannot
//! add `r`, since a query would have to skip `b` to reach it. Such fields
//! fall through to the index advisor instead.
//!
//! Time-series entities then get their ordering timestamp appended.
//! Anything filtered but not placed here falls through to the index advisor.

use std::collections::HashSet;

use keyplan_core::{
    has_text, ClusteringKeyRecommendation, ClusteringKeyType, FieldMetadata, FilterType, SortField,
};
use tracing::{debug, trace};

use crate::context::{partition_key_set, EntityContext, PatternView};
use crate::diagnostics::{Diagnostics, SUMMARY_CLUSTERING_KEYS};
use crate::key_list::ClusteringKeyList;

const EQUALITY_REASON: &str = "Supports equality filter from access pattern with partition key.";
const RANGE_REASON: &str = "Supports range filtering from access pattern with partition key.";
const MANDATORY_ORDERING_REASON: &str =
    "Required as clustering key (equality filter + ORDER BY) from access pattern with partition key.";
const ORDERING_REASON: &str =
    "Preserves requested ordering from access pattern with partition key.";

/// Clustering keys in on-disk order, plus what was noticed choosing them.
#[derive(Debug, Clone, Default)]
pub struct ClusteringKeySelection {
    pub clustering_keys: Vec<ClusteringKeyRecommendation>,
    pub diagnostics: Diagnostics,
}

/// Choose the ordered clustering keys for an entity given its partition key.
pub fn select_clustering_keys(
    ctx: &EntityContext<'_>,
    partition_key: &[String],
) -> ClusteringKeySelection {
    let pk = partition_key_set(partition_key);
    let qualified: Vec<&PatternView<'_>> = ctx
        .patterns
        .iter()
        .filter(|view| view.pattern.has_filters() && view.is_pk_qualified(&pk))
        .collect();

    debug!(
        qualified_patterns = qualified.len(),
        total_patterns = ctx.patterns.len(),
        "Selecting clustering keys"
    );

    let mut keys = ClusteringKeyList::new();
    let mut diagnostics = Diagnostics::new();

    add_equality_keys(ctx, &pk, &qualified, &mut keys);
    add_range_keys(ctx, &pk, &qualified, &mut keys);
    add_ordering_keys(ctx, &pk, &qualified, &mut keys, &mut diagnostics);
    add_time_series_key(ctx, &pk, &mut keys, &mut diagnostics);

    let summary = if keys.is_empty() {
        "No clustering keys required for single-row partitions.".to_string()
    } else {
        keys.iter()
            .map(|k| format!("{} ({})", k.field, k.key_type))
            .collect::<Vec<_>>()
            .join(" → ")
    };
    diagnostics.note(SUMMARY_CLUSTERING_KEYS, summary);

    ClusteringKeySelection {
        clustering_keys: keys.into_vec(),
        diagnostics,
    }
}

// =============================================================================
// PASS A: EQUALITY
// =============================================================================

fn add_equality_keys(
    ctx: &EntityContext<'_>,
    pk: &HashSet<String>,
    qualified: &[&PatternView<'_>],
    keys: &mut ClusteringKeyList,
) {
    for (position, view) in qualified.iter().enumerate() {
        for filter in view
            .pattern
            .filters
            .iter()
            .filter(|f| f.filter_type.is_point_lookup())
        {
            let Some(field) = resolve(ctx, &filter.field) else {
                continue;
            };
            let name = field.normalized_name();
            if pk.contains(&name) || keys.contains(&name) {
                continue;
            }

            if view.sorts_on(&name) {
                trace!(field = %field.name, "Deferring equality+sort field to ordering pass");
                continue;
            }

            if !covers_placed_keys(view, keys) {
                trace!(
                    field = %field.name,
                    pattern = view.pattern.display_name(),
                    "Equality field skipped; pattern does not cover the placed keys"
                );
                continue;
            }

            if let Some(blocked) = blocking_sort_pattern(qualified, position, &name) {
                debug!(
                    field = %field.name,
                    pattern = blocked,
                    "Skipping equality key that would strand another pattern's ORDER BY"
                );
                continue;
            }

            keys.push(ClusteringKeyRecommendation {
                field: field.name.clone(),
                order: "ASC".to_string(),
                key_type: ClusteringKeyType::Equality,
                reason: EQUALITY_REASON.to_string(),
            });
        }
    }
}

/// Another PK-qualified, sort-bearing pattern whose filters cover neither
/// `field` nor one of its own sort fields.
fn blocking_sort_pattern<'a>(
    qualified: &[&'a PatternView<'_>],
    position: usize,
    field: &str,
) -> Option<&'a str> {
    qualified
        .iter()
        .enumerate()
        .filter(|(other, view)| *other != position && view.has_sort_fields())
        .find(|(_, view)| {
            view.sort_field_names()
                .any(|sort| !view.filters_on(field) && !view.filters_on(sort))
        })
        .map(|(_, view)| view.pattern.display_name())
}

// =============================================================================
// PASS B: RANGE
// =============================================================================

fn add_range_keys(
    ctx: &EntityContext<'_>,
    pk: &HashSet<String>,
    qualified: &[&PatternView<'_>],
    keys: &mut ClusteringKeyList,
) {
    for view in qualified {
        let admissible = covers_placed_keys(view, keys);

        for filter in view
            .pattern
            .filters
            .iter()
            .filter(|f| f.filter_type == FilterType::Range)
        {
            let Some(field) = resolve(ctx, &filter.field) else {
                continue;
            };
            let name = field.normalized_name();
            if pk.contains(&name) || keys.contains(&name) {
                continue;
            }
            if !admissible {
                trace!(
                    field = %field.name,
                    pattern = view.pattern.display_name(),
                    "Range field skipped; pattern does not cover the placed keys"
                );
                continue;
            }

            keys.push(ClusteringKeyRecommendation {
                field: field.name.clone(),
                order: default_direction(field).to_string(),
                key_type: ClusteringKeyType::Range,
                reason: RANGE_REASON.to_string(),
            });
        }
    }
}

// =============================================================================
// PASS C: ORDERING
// =============================================================================

fn add_ordering_keys(
    ctx: &EntityContext<'_>,
    pk: &HashSet<String>,
    qualified: &[&PatternView<'_>],
    keys: &mut ClusteringKeyList,
    diagnostics: &mut Diagnostics,
) {
    for view in qualified.iter().filter(|v| v.has_sort_fields()) {
        let has_first = covers_first_key(view, keys);

        for sort in &view.pattern.sort_fields {
            let Some(field) = resolve(ctx, &sort.field) else {
                continue;
            };
            let name = field.normalized_name();
            if pk.contains(&name) || keys.contains(&name) {
                continue;
            }

            if !has_first {
                let first = keys.first().map(|k| k.field.as_str()).unwrap_or("none");
                diagnostics.warn(format!(
                    "Pattern '{}' uses sort field {} but doesn't include the first clustering key ({}). \
                     This pattern will require specifying the first CK before using {} in ORDER BY, \
                     or consider making {} an index instead.",
                    view.pattern.display_name(),
                    field.name,
                    first,
                    field.name,
                    field.name
                ));
                continue;
            }

            let order = sort_direction(sort, field);

            if view.point_filters_on(&name) {
                let referenced = |key: &str| view.filters_on(key);
                let slot = keys.slot_after_last(referenced);
                for removed in keys.remove_unreferenced_from(slot, referenced) {
                    debug!(
                        field = %removed.field,
                        displaced_by = %field.name,
                        pattern = view.pattern.display_name(),
                        "Demoting clustering key to index candidate"
                    );
                }
                keys.insert_at(
                    slot,
                    ClusteringKeyRecommendation {
                        field: field.name.clone(),
                        order,
                        key_type: ClusteringKeyType::Ordering,
                        reason: MANDATORY_ORDERING_REASON.to_string(),
                    },
                );
            } else {
                keys.push(ClusteringKeyRecommendation {
                    field: field.name.clone(),
                    order,
                    key_type: ClusteringKeyType::Ordering,
                    reason: ORDERING_REASON.to_string(),
                });
            }
        }
    }
}

// =============================================================================
// TIME SERIES
// =============================================================================

fn add_time_series_key(
    ctx: &EntityContext<'_>,
    pk: &HashSet<String>,
    keys: &mut ClusteringKeyList,
    diagnostics: &mut Diagnostics,
) {
    let Some(constraints) = ctx.constraints().filter(|c| c.is_time_series()) else {
        return;
    };

    let requested = constraints
        .time_ordering_field
        .as_deref()
        .filter(|name| has_text(Some(*name)))
        .map(str::to_string)
        .or_else(|| ctx.fields().find(|f| f.time_field).map(|f| f.name.clone()));

    let Some(requested) = requested else {
        diagnostics.warn("Time-series flag enabled but no timestamp field selected for ordering.");
        return;
    };

    let Some(field) = ctx.field(&requested) else {
        diagnostics.warn(format!(
            "Time-series ordering field {} is not a declared field; no ordering key added.",
            requested.trim()
        ));
        return;
    };

    let name = field.normalized_name();
    if pk.contains(&name) || keys.contains(&name) {
        trace!(field = %field.name, "Time-series field already placed");
        return;
    }

    keys.push(ClusteringKeyRecommendation {
        field: field.name.clone(),
        order: "DESC".to_string(),
        key_type: ClusteringKeyType::Ordering,
        reason: format!("Time-series flag enabled; ordering on {}", field.name),
    });
}

// =============================================================================
// HELPERS
// =============================================================================

fn resolve<'a>(ctx: &EntityContext<'a>, name: &str) -> Option<&'a FieldMetadata> {
    if has_text(Some(name)) {
        ctx.field(name)
    } else {
        None
    }
}

/// Full-prefix rule: the pattern constrains every key placed so far.
fn covers_placed_keys(view: &PatternView<'_>, keys: &ClusteringKeyList) -> bool {
    keys.names().all(|name| view.filters_on(name))
}

/// Sort-skip rule: the pattern must constrain clustering key 0.
fn covers_first_key(view: &PatternView<'_>, keys: &ClusteringKeyList) -> bool {
    keys.first_field().map_or(true, |first| view.filters_on(first))
}

fn default_direction(field: &FieldMetadata) -> &'static str {
    if field.time_field {
        "DESC"
    } else {
        "ASC"
    }
}

fn sort_direction(sort: &SortField, field: &FieldMetadata) -> String {
    match sort.direction.as_deref().map(str::trim) {
        Some(direction) if !direction.is_empty() => direction.to_uppercase(),
        _ => default_direction(field).to_string(),
    }
}
