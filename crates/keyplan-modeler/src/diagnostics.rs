//! Warnings and summary notes produced alongside a key layout.

use indexmap::IndexMap;

/// Summary topic for the tenant isolation note.
pub const SUMMARY_MULTI_TENANT: &str = "Multi-tenant";
/// Summary topic for the partition key rationale.
pub const SUMMARY_PARTITION_KEY: &str = "Partition Key";
/// Summary topic for the clustering key sequence.
pub const SUMMARY_CLUSTERING_KEYS: &str = "Clustering Keys";
/// Summary topic listing indexed fields.
pub const SUMMARY_INDEXES: &str = "Indexes";

/// Ordered warnings plus topic → explanation notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub summary: IndexMap<String, String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a summary note; a repeated topic keeps its original position.
    pub fn note(&mut self, topic: &str, explanation: impl Into<String>) {
        self.summary.insert(topic.to_string(), explanation.into());
    }

    /// Append another step's diagnostics after this one's.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
        for (topic, explanation) in other.summary {
            self.summary.insert(topic, explanation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_preserves_order() {
        let mut first = Diagnostics::new();
        first.warn("a");
        first.note(SUMMARY_PARTITION_KEY, "pk");

        let mut second = Diagnostics::new();
        second.warn("b");
        second.note(SUMMARY_CLUSTERING_KEYS, "ck");

        first.absorb(second);
        assert_eq!(first.warnings, vec!["a", "b"]);
        let topics: Vec<&str> = first.summary.keys().map(String::as_str).collect();
        assert_eq!(topics, vec![SUMMARY_PARTITION_KEY, SUMMARY_CLUSTERING_KEYS]);
    }

    #[test]
    fn test_note_overwrites_in_place() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.note("x", "1");
        diagnostics.note("y", "2");
        diagnostics.note("x", "3");
        assert_eq!(diagnostics.summary.get_index(0), Some((&"x".to_string(), &"3".to_string())));
        assert_eq!(diagnostics.summary.len(), 2);
    }
}
