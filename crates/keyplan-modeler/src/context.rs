//! Per-entity lookup structures shared by the selectors.
//!
//! Field references in patterns are resolved by normalized name once, and
//! each pattern's filter and sort sets are precomputed so the selectors never
//! rescan pattern lists to answer membership questions.

use std::collections::HashSet;

use indexmap::IndexMap;
use keyplan_core::{
    has_text, normalize, AccessPattern, ConstraintSettings, EntityModelRequest, FieldMetadata,
};

/// An access pattern with its normalized field sets.
#[derive(Debug)]
pub struct PatternView<'a> {
    pub pattern: &'a AccessPattern,
    filter_fields: HashSet<String>,
    point_filter_fields: HashSet<String>,
    sort_fields: HashSet<String>,
}

impl<'a> PatternView<'a> {
    pub fn new(pattern: &'a AccessPattern) -> Self {
        let mut filter_fields = HashSet::new();
        let mut point_filter_fields = HashSet::new();
        for filter in pattern.filters.iter().filter(|f| has_text(Some(f.field.as_str()))) {
            let name = normalize(&filter.field);
            if filter.filter_type.is_point_lookup() {
                point_filter_fields.insert(name.clone());
            }
            filter_fields.insert(name);
        }

        let sort_fields = pattern
            .sort_fields
            .iter()
            .filter(|s| has_text(Some(s.field.as_str())))
            .map(|s| normalize(&s.field))
            .collect();

        Self {
            pattern,
            filter_fields,
            point_filter_fields,
            sort_fields,
        }
    }

    /// Whether the pattern filters on the field, with any filter type.
    pub fn filters_on(&self, normalized: &str) -> bool {
        self.filter_fields.contains(normalized)
    }

    /// Whether the pattern has an equality or IN filter on the field.
    pub fn point_filters_on(&self, normalized: &str) -> bool {
        self.point_filter_fields.contains(normalized)
    }

    /// Whether the pattern orders by the field.
    pub fn sorts_on(&self, normalized: &str) -> bool {
        self.sort_fields.contains(normalized)
    }

    /// Normalized names of the pattern's sort fields.
    pub fn sort_field_names(&self) -> impl Iterator<Item = &str> {
        self.sort_fields.iter().map(String::as_str)
    }

    pub fn has_sort_fields(&self) -> bool {
        !self.sort_fields.is_empty()
    }

    /// A pattern is PK-qualified when it filters on any partition key field.
    pub fn is_pk_qualified(&self, partition_key: &HashSet<String>) -> bool {
        self.filter_fields.iter().any(|f| partition_key.contains(f))
    }
}

/// Read-only view of one entity for the duration of its pipeline run.
#[derive(Debug)]
pub struct EntityContext<'a> {
    pub entity: &'a EntityModelRequest,
    fields: IndexMap<String, &'a FieldMetadata>,
    pub patterns: Vec<PatternView<'a>>,
}

impl<'a> EntityContext<'a> {
    /// Index the entity's fields (first declaration wins per normalized
    /// name) and patterns.
    pub fn new(entity: &'a EntityModelRequest) -> Self {
        let mut fields = IndexMap::new();
        for field in entity.fields.iter().filter(|f| has_text(Some(f.name.as_str()))) {
            fields.entry(field.normalized_name()).or_insert(field);
        }

        let patterns = entity.access_patterns.iter().map(PatternView::new).collect();

        Self {
            entity,
            fields,
            patterns,
        }
    }

    /// Resolve a field reference by normalized name.
    pub fn field(&self, name: &str) -> Option<&'a FieldMetadata> {
        self.fields.get(&normalize(name)).copied()
    }

    /// Distinct named fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &'a FieldMetadata> + '_ {
        self.fields.values().copied()
    }

    pub fn constraints(&self) -> Option<&'a ConstraintSettings> {
        self.entity.constraints.as_ref()
    }
}

/// Normalized set of partition key field names.
pub fn partition_key_set(partition_key: &[String]) -> HashSet<String> {
    partition_key.iter().map(|f| normalize(f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyplan_core::FilterType;

    fn entity() -> EntityModelRequest {
        EntityModelRequest {
            entity_name: "accounts".to_string(),
            fields: vec![
                FieldMetadata::new("Account_ID"),
                FieldMetadata {
                    business_key: true,
                    ..FieldMetadata::new(" account_id ")
                },
                FieldMetadata::new("  "),
                FieldMetadata::new("status"),
            ],
            access_patterns: vec![AccessPattern::named("by account")
                .filter("ACCOUNT_ID", FilterType::Equality)
                .filter("created_at", FilterType::Range)
                .filter("", FilterType::Equality)
                .sort("Created_At", Some("DESC"))],
            ..Default::default()
        }
    }

    #[test]
    fn test_field_lookup_first_declaration_wins() {
        let entity = entity();
        let ctx = EntityContext::new(&entity);
        let field = ctx.field("account_id").unwrap();
        assert_eq!(field.name, "Account_ID");
        assert!(!field.business_key);
        assert_eq!(ctx.fields().count(), 2);
        assert!(ctx.field("missing").is_none());
    }

    #[test]
    fn test_pattern_view_sets_are_normalized() {
        let entity = entity();
        let ctx = EntityContext::new(&entity);
        let view = &ctx.patterns[0];
        assert!(view.filters_on("account_id"));
        assert!(view.filters_on("created_at"));
        assert!(!view.filters_on(""));
        assert!(view.point_filters_on("account_id"));
        assert!(!view.point_filters_on("created_at"));
        assert!(view.sorts_on("created_at"));
        assert!(view.has_sort_fields());
    }

    #[test]
    fn test_pk_qualification() {
        let entity = entity();
        let ctx = EntityContext::new(&entity);
        let pk = partition_key_set(&["Account_ID".to_string()]);
        assert!(ctx.patterns[0].is_pk_qualified(&pk));
        let other = partition_key_set(&["status".to_string()]);
        assert!(!ctx.patterns[0].is_pk_qualified(&other));
    }
}
