//! CQL generation for a resolved key layout.
//!
//! Every identifier written into a statement passes through
//! [`sanitize_identifier`]; free text (column and table comments) is
//! single-quote escaped.

use std::collections::HashSet;

use keyplan_core::{
    defaults, has_text, ClusteringKeyRecommendation, ConstraintSettings, EntityModelRequest,
    IndexRecommendation,
};
use once_cell::sync::Lazy;
use regex::Regex;

static INVALID_IDENTIFIER_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("identifier character class compiles"));
static REPEATED_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("underscore run pattern compiles"));

/// Resolved `<keyspace>.<table>` a layout is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub keyspace: String,
    pub table: String,
}

impl TableTarget {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }

    fn qualified(&self) -> String {
        format!("{}.{}", self.keyspace, self.table)
    }
}

/// Statements realizing one entity's layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDdl {
    pub create_table_cql: String,
    pub index_cql: Vec<String>,
}

/// Lowercase, map anything outside `[a-z0-9_]` to `_`, collapse runs of
/// `_`, and trim `_` from both ends. Blank input is returned unchanged.
pub fn sanitize_identifier(value: &str) -> String {
    if !has_text(Some(value)) {
        return value.to_string();
    }
    let lowered = value.to_lowercase();
    let replaced = INVALID_IDENTIFIER_CHARS.replace_all(&lowered, "_");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Map a free-text declared type to a column type by substring match.
pub fn map_to_cql_type(data_type: Option<&str>) -> &'static str {
    let Some(lower) = data_type.filter(|t| has_text(Some(*t))).map(str::to_lowercase) else {
        return "TEXT";
    };
    let has = |needle: &str| lower.contains(needle);

    if has("uuid") {
        "UUID"
    } else if has("bigint") || has("long") {
        "BIGINT"
    } else if has("int") {
        "INT"
    } else if has("double") || has("float") {
        "DOUBLE"
    } else if has("decimal") || has("numeric") {
        "DECIMAL"
    } else if has("bool") {
        "BOOLEAN"
    } else if has("timestamp") || has("date") || has("time") {
        "TIMESTAMP"
    } else if has("blob") || has("binary") {
        "BLOB"
    } else if has("list") {
        "LIST<TEXT>"
    } else if has("set") {
        "SET<TEXT>"
    } else if has("map") {
        "MAP<TEXT, TEXT>"
    } else {
        "TEXT"
    }
}

/// Build the `CREATE TABLE` statement and one storage-attached index
/// statement per recommendation.
pub fn generate_ddl(
    entity: &EntityModelRequest,
    target: &TableTarget,
    partition_key: &[String],
    clustering_keys: &[ClusteringKeyRecommendation],
    indexes: &[IndexRecommendation],
) -> GeneratedDdl {
    GeneratedDdl {
        create_table_cql: create_table(entity, target, partition_key, clustering_keys),
        index_cql: indexes
            .iter()
            .map(|index| create_index(target, index))
            .collect(),
    }
}

fn create_table(
    entity: &EntityModelRequest,
    target: &TableTarget,
    partition_key: &[String],
    clustering_keys: &[ClusteringKeyRecommendation],
) -> String {
    let mut seen = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for field in entity.fields.iter().filter(|f| has_text(Some(f.name.as_str()))) {
        let column = sanitize_identifier(&field.name);
        if !seen.insert(column.clone()) {
            continue;
        }
        let mut line = format!("    {} {}", column, map_to_cql_type(field.data_type.as_deref()));
        if let Some(description) = field.description.as_deref().filter(|d| has_text(Some(*d))) {
            line.push_str(&format!(" COMMENT '{}'", escape_quotes(description)));
        }
        lines.push(line);
    }
    lines.push(format!(
        "    PRIMARY KEY ({})",
        primary_key_clause(partition_key, clustering_keys)
    ));

    let mut cql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        target.qualified(),
        lines.join(",\n")
    );

    let options = table_options(entity, clustering_keys);
    if !options.is_empty() {
        cql.push_str(" WITH ");
        cql.push_str(&options.join(" AND "));
    }
    cql.push(';');
    cql
}

/// `pk` alone, `(pk1, pk2)` when composite, `(pk...), ck1, ck2` once any
/// clustering key exists.
fn primary_key_clause(
    partition_key: &[String],
    clustering_keys: &[ClusteringKeyRecommendation],
) -> String {
    let partition = partition_key
        .iter()
        .map(|f| sanitize_identifier(f))
        .collect::<Vec<_>>()
        .join(", ");

    if clustering_keys.is_empty() {
        return if partition_key.len() == 1 {
            partition
        } else {
            format!("({})", partition)
        };
    }

    let clustering = clustering_keys
        .iter()
        .map(|k| sanitize_identifier(&k.field))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({}), {}", partition, clustering)
}

fn table_options(
    entity: &EntityModelRequest,
    clustering_keys: &[ClusteringKeyRecommendation],
) -> Vec<String> {
    let mut options = Vec::new();

    if let Some(description) = entity.description.as_deref().filter(|d| has_text(Some(*d))) {
        options.push(format!("comment = '{}'", escape_quotes(description)));
    }

    if !clustering_keys.is_empty() {
        let order = clustering_keys
            .iter()
            .map(|k| format!("{} {}", sanitize_identifier(&k.field), order_direction(&k.order)))
            .collect::<Vec<_>>()
            .join(", ");
        options.push(format!("CLUSTERING ORDER BY ({})", order));
    }

    options.push(format!(
        "compaction = {{'class': '{}'}}",
        defaults::COMPACTION_CLASS
    ));
    options.push(format!("gc_grace_seconds = {}", defaults::GC_GRACE_SECONDS));

    if let Some(ttl) = entity.constraints.as_ref().and_then(default_ttl) {
        options.push(format!("default_time_to_live = {}", ttl));
    }

    options
}

fn create_index(target: &TableTarget, index: &IndexRecommendation) -> String {
    let name = sanitize_identifier(&format!(
        "{}_{}_{}",
        target.table,
        index.field,
        defaults::INDEX_SUFFIX
    ));
    format!(
        "CREATE CUSTOM INDEX IF NOT EXISTS {} ON {} ({}) USING '{}';",
        name,
        target.qualified(),
        sanitize_identifier(&index.field),
        defaults::INDEX_CLASS
    )
}

/// `ttlSeconds` wins when positive, else positive `retentionDays` in seconds.
fn default_ttl(constraints: &ConstraintSettings) -> Option<i64> {
    match (constraints.ttl_seconds, constraints.retention_days) {
        (Some(ttl), _) if ttl > 0 => Some(ttl),
        (_, Some(days)) if days > 0 => Some(days.saturating_mul(defaults::SECONDS_PER_DAY)),
        _ => None,
    }
}

fn order_direction(order: &str) -> &'static str {
    if order.trim().eq_ignore_ascii_case("DESC") {
        "DESC"
    } else {
        "ASC"
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\'', "''")
}
