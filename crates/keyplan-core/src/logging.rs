//! Structured logging schema and field name constants for keyplan.
//!
//! Every span and event in the modeler uses these names, so log aggregation
//! can query by the same fields everywhere. Outcome fields are declared as
//! `tracing::field::Empty` and filled with `Span::record` once known.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request could not be served |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), batch completions |
//! | DEBUG | Decision points: chosen keys, skipped candidates, repairs |
//! | TRACE | Per-filter iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "modeler", "api"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "modeler"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "model_entity"
pub const OPERATION: &str = "op";

// ─── Subject fields ────────────────────────────────────────────────────────

/// Name of the entity being modeled.
pub const ENTITY: &str = "entity";

/// Display name of the access pattern behind a decision.
pub const PATTERN: &str = "pattern";

/// Field a decision applies to.
pub const FIELD: &str = "field";

/// Equality/IN occurrence count of a partition key candidate.
pub const FREQUENCY: &str = "frequency";

// ─── Batch fields ──────────────────────────────────────────────────────────

/// Number of entities in a modeling request.
pub const ENTITY_COUNT: &str = "entity_count";

/// Number of entities rejected by validation under the isolating policy.
pub const REJECTED_COUNT: &str = "rejected_count";

// ─── Entity outcome fields ─────────────────────────────────────────────────

/// Comma-joined partition key chosen for an entity.
pub const PARTITION_KEY: &str = "partition_key";

/// Number of clustering keys chosen for an entity.
pub const CLUSTERING_KEY_COUNT: &str = "clustering_key_count";

/// Number of secondary indexes recommended for an entity.
pub const INDEX_COUNT: &str = "index_count";

/// Number of warnings produced for an entity.
pub const WARNING_COUNT: &str = "warning_count";
