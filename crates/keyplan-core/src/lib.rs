//! # keyplan-core
//!
//! Core types, configuration, and error handling for the keyplan schema
//! advisor.
//!
//! This crate provides the domain model shared by the modeler and the HTTP
//! boundary: entity fields, access patterns, workload constraints, and the
//! recommendation output that the modeler produces for each entity.

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types at crate root
pub use config::{BatchPolicy, ModelerConfig};
pub use error::{Error, Result};
pub use models::*;
