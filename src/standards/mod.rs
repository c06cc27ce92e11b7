//! Reference Standards
//!
//! - `parameter.rs` - typed parameter keys, sample domains, alias resolution
//! - `registry.rs` - StandardRegistry with the built-in MPOB tables and external loaders

pub mod parameter;
pub mod registry;

pub use parameter::{resolve_alias, Domain, ParameterKey};
pub use registry::{Standard, StandardRegistry, StandardRow};
