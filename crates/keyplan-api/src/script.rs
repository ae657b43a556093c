//! Rendering of a modeling response as a runnable CQL script.

use keyplan_core::ModelingResponse;

/// Concatenate every entity's statements into one script.
///
/// Each entity contributes its warnings as `-- WARNING:` comment lines, then
/// its `CREATE TABLE` statement, then its index statements. Entities are
/// separated by a single blank line.
pub fn render_cql_script(response: &ModelingResponse) -> String {
    let blocks: Vec<String> = response
        .entities
        .iter()
        .map(|entity| {
            let mut lines: Vec<String> = entity
                .warnings
                .iter()
                .map(|w| format!("-- WARNING: {}", w))
                .collect();
            lines.push(entity.create_table_cql.clone());
            lines.extend(entity.index_cql.iter().cloned());
            lines.join("\n")
        })
        .collect();

    let mut script = blocks.join("\n\n");
    if !script.is_empty() {
        script.push('\n');
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyplan_core::EntityModelResponse;

    fn layout(table: &str, warnings: &[&str], indexes: &[&str]) -> EntityModelResponse {
        EntityModelResponse {
            entity_name: table.to_string(),
            table_name: table.to_string(),
            create_table_cql: format!("CREATE TABLE IF NOT EXISTS ks.{} (...);", table),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            index_cql: indexes.iter().map(|i| i.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_script_separates_entities_with_blank_line() {
        let response = ModelingResponse {
            entities: vec![
                layout("a", &["Consider bucketing."], &["CREATE CUSTOM INDEX a_x;"]),
                layout("b", &[], &[]),
            ],
            errors: vec![],
        };

        assert_eq!(
            render_cql_script(&response),
            "-- WARNING: Consider bucketing.\n\
             CREATE TABLE IF NOT EXISTS ks.a (...);\n\
             CREATE CUSTOM INDEX a_x;\n\
             \n\
             CREATE TABLE IF NOT EXISTS ks.b (...);\n"
        );
    }

    #[test]
    fn test_empty_response_renders_nothing() {
        assert_eq!(render_cql_script(&ModelingResponse::default()), "");
    }
}
