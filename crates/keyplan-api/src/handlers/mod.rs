//! HTTP handlers for keyplan-api.

pub mod health;
pub mod modeler;
