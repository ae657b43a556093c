//! # keyplan-modeler
//!
//! Derives a physical key layout for wide-column (partitioned, clustered)
//! tables from an entity's declared access patterns.
//!
//! The pipeline runs once per entity, leaves first:
//! - [`partition`]: partition key from equality/IN filter frequency
//! - [`clustering`]: ordered clustering keys honoring each pattern's
//!   sequential-prefix requirement, with conflict repair
//! - [`indexes`]: secondary-index candidates for filters the keys cannot serve
//! - [`ddl`]: `CREATE TABLE` and index statements for the resolved layout
//!
//! Warnings and summary notes accumulate in a [`Diagnostics`] side channel
//! through every step. [`Modeler`] runs the steps in order and handles
//! batches.
//!
//! ## Example
//!
//! ```
//! use keyplan_core::{
//!     AccessPattern, EntityModelRequest, FieldMetadata, FilterType, ModelerConfig,
//! };
//! use keyplan_modeler::Modeler;
//!
//! let entity = EntityModelRequest {
//!     entity_name: "Orders".to_string(),
//!     fields: vec![FieldMetadata::new("customer_id"), FieldMetadata::new("order_id")],
//!     access_patterns: vec![AccessPattern::named("orders by customer")
//!         .filter("customer_id", FilterType::Equality)],
//!     ..Default::default()
//! };
//!
//! let modeler = Modeler::new(ModelerConfig::default());
//! let layout = modeler.model_entity(&entity).unwrap();
//! assert_eq!(layout.partition_key, vec!["customer_id"]);
//! assert!(layout.create_table_cql.starts_with("CREATE TABLE IF NOT EXISTS odp_modeler.orders"));
//! ```

pub mod clustering;
pub mod context;
pub mod ddl;
pub mod diagnostics;
pub mod indexes;
pub mod key_list;
pub mod modeler;
pub mod partition;

pub use clustering::{select_clustering_keys, ClusteringKeySelection};
pub use context::{EntityContext, PatternView};
pub use ddl::{generate_ddl, map_to_cql_type, sanitize_identifier, GeneratedDdl, TableTarget};
pub use diagnostics::Diagnostics;
pub use indexes::{recommend_indexes, IndexAdvice};
pub use key_list::ClusteringKeyList;
pub use modeler::{validate_entity, Modeler};
pub use partition::{select_partition_key, PartitionKeySelection};
