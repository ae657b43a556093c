//! Centralized default constants for keyplan.
//!
//! **This module is the single source of truth** for shared default values.
//! The modeler, the API server, and the CLI reference these constants
//! instead of defining their own magic numbers.

// =============================================================================
// MODELER
// =============================================================================

/// Keyspace used when neither the constraints nor the entity name one.
pub const KEYSPACE: &str = "odp_modeler";

/// Expected partition size (MB) above which bucketing is recommended.
pub const LARGE_PARTITION_MB: i64 = 100;

/// Seconds per day, used to turn retention days into a table TTL.
pub const SECONDS_PER_DAY: i64 = 86_400;

// =============================================================================
// DDL
// =============================================================================

/// Compaction strategy emitted on every generated table.
pub const COMPACTION_CLASS: &str = "SizeTieredCompactionStrategy";

/// `gc_grace_seconds` emitted on every generated table.
pub const GC_GRACE_SECONDS: i64 = 86_400;

/// Secondary index implementation used for index statements.
pub const INDEX_CLASS: &str = "StorageAttachedIndex";

/// Suffix appended to generated index names.
pub const INDEX_SUFFIX: &str = "sai_idx";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default CORS origin whitelist.
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum request body size in bytes (2 MiB).
pub const MAX_BODY_SIZE_BYTES: usize = 2 * 1024 * 1024;
