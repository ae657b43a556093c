//! Domain model for access-pattern-driven key design.
//!
//! Requests describe an entity (its fields, the queries run against it, and
//! workload constraints); responses carry the derived physical key layout
//! and the DDL that realizes it. Field names travel in camelCase on the
//! wire.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Normalize a field name for identity comparison (trimmed, lowercase).
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// True when the optional string holds non-whitespace text.
pub fn has_text(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

// =============================================================================
// LENIENT ENUMERATIONS
// =============================================================================

/// Generates the tolerant parsing surface shared by the request enums:
/// case-insensitive matching on the wire name, `Unknown` for anything else
/// (including `null`), and a `Display` that prints the wire name.
macro_rules! lenient_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Parse a wire value, falling back to `Unknown` instead of failing.
            pub fn parse_lenient(value: &str) -> Self {
                match value.trim().to_uppercase().as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown,
                }
            }

            /// Wire name of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown => "UNKNOWN",
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::parse_lenient(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Option::<String>::deserialize(deserializer)?;
                Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
            }
        }
    };
}

/// Approximate number of distinct values a field (or pattern) spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

lenient_enum!(Cardinality {
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});

/// How an access pattern constrains a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    /// `field = ?`
    Equality,
    /// `field > ?`, `field BETWEEN ? AND ?`
    Range,
    /// `field IN (?, ...)`
    In,
    #[default]
    Unknown,
}

lenient_enum!(FilterType {
    Equality => "EQUALITY",
    Range => "RANGE",
    In => "IN",
});

impl FilterType {
    /// Equality and IN filters pin a single partition or key prefix.
    pub fn is_point_lookup(&self) -> bool {
        matches!(self, FilterType::Equality | FilterType::In)
    }
}

/// Expected amount of data per partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionSizeExpectation {
    Small,
    Medium,
    Large,
    VeryLarge,
    #[default]
    Unknown,
}

lenient_enum!(PartitionSizeExpectation {
    Small => "SMALL",
    Medium => "MEDIUM",
    Large => "LARGE",
    VeryLarge => "VERY_LARGE",
});

/// Read/write balance of the workload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryVolume {
    ReadHeavy,
    WriteHeavy,
    Balanced,
    #[default]
    Unknown,
}

lenient_enum!(QueryVolume {
    ReadHeavy => "READ_HEAVY",
    WriteHeavy => "WRITE_HEAVY",
    Balanced => "BALANCED",
});

/// Why a field became a clustering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusteringKeyType {
    Equality,
    Range,
    Ordering,
}

impl std::fmt::Display for ClusteringKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equality => write!(f, "equality"),
            Self::Range => write!(f, "range"),
            Self::Ordering => write!(f, "ordering"),
        }
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// A column of the entity being modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMetadata {
    pub name: String,
    /// Free-text type, mapped to a column type during DDL generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub business_key: bool,
    pub mutable: bool,
    pub tenant_field: bool,
    pub time_field: bool,
    pub cardinality: Cardinality,
}

impl FieldMetadata {
    /// Create a field with the given name and otherwise default metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Identity of the field within its entity.
    pub fn normalized_name(&self) -> String {
        normalize(&self.name)
    }
}

/// A filter an access pattern applies to one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternField {
    /// References a [`FieldMetadata`] by normalized name.
    pub field: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PatternField {
    pub fn new(field: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            field: field.into(),
            filter_type,
            notes: None,
        }
    }
}

/// An `ORDER BY` requirement of an access pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SortField {
    pub field: String,
    /// `ASC` / `DESC`; blank means the per-field default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: Option<&str>) -> Self {
        Self {
            field: field.into(),
            direction: direction.map(str::to_string),
        }
    }
}

/// A query shape the table must serve.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub filters: Vec<PatternField>,
    pub sort_fields: Vec<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_frequency: Option<String>,
    pub cardinality: Cardinality,
}

impl AccessPattern {
    /// Create a named pattern with no filters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Append a filter.
    pub fn filter(mut self, field: impl Into<String>, filter_type: FilterType) -> Self {
        self.filters.push(PatternField::new(field, filter_type));
        self
    }

    /// Append a sort requirement.
    pub fn sort(mut self, field: impl Into<String>, direction: Option<&str>) -> Self {
        self.sort_fields.push(SortField::new(field, direction));
        self
    }

    /// Name used in warnings; `unnamed` when absent.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Patterns without filters are inert.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// Workload constraints that shape the key layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstraintSettings {
    pub partition_size_expectation: PartitionSizeExpectation,
    pub query_volume: QueryVolume,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_tenant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ordering_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_partition_size_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyspace: Option<String>,
}

impl ConstraintSettings {
    pub fn is_multi_tenant(&self) -> bool {
        self.multi_tenant.unwrap_or(false)
    }

    pub fn is_time_series(&self) -> bool {
        self.time_series.unwrap_or(false)
    }
}

/// One entity to model; the input unit of the modeler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityModelRequest {
    pub entity_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldMetadata>,
    pub access_patterns: Vec<AccessPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ConstraintSettings>,
}

/// A batch of entities modeled independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelingRequest {
    pub entities: Vec<EntityModelRequest>,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// A clustering key with the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringKeyRecommendation {
    pub field: String,
    /// `ASC` or `DESC` (explicit sort directions are kept as given, upper-cased).
    pub order: String,
    #[serde(rename = "type")]
    pub key_type: ClusteringKeyType,
    pub reason: String,
}

/// A filtered field the key layout cannot serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecommendation {
    pub field: String,
    pub reason: String,
    pub cardinality: Cardinality,
}

/// Recommended layout for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityModelResponse {
    pub entity_name: String,
    pub keyspace: String,
    pub table_name: String,
    pub partition_key: Vec<String>,
    pub clustering_keys: Vec<ClusteringKeyRecommendation>,
    pub indexes: Vec<IndexRecommendation>,
    pub warnings: Vec<String>,
    /// Ordered topic → explanation entries.
    #[schema(value_type = Object)]
    pub summary: IndexMap<String, String>,
    pub create_table_cql: String,
    pub index_cql: Vec<String>,
}

/// An entity rejected under the isolating batch policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityError {
    /// Position of the entity in the request.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub message: String,
}

/// Layouts for every modeled entity, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelingResponse {
    pub entities: Vec<EntityModelResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EntityError>,
}
