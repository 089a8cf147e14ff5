//! Tools domain module.
//!
//! Everything tool-related: the schema model and validator that gate
//! every invocation, the registry that owns tool identity and discovery
//! order, and the Auth0 tool definitions themselves.
//!
//! ## Architecture
//!
//! - `schema.rs` - parameter schema model (`ParamSchema`, `FieldSpec`)
//! - `validator.rs` - total validation with complete violation reporting
//! - `definition.rs` - `ToolDefinition` (metadata + async handler)
//! - `registry.rs` - ordered name -> definition registry
//! - `definitions/` - the Auth0 tools, grouped by subdomain
//!
//! ## Adding a New Tool
//!
//! 1. Define the tool in a file under `definitions/` (schema + handler)
//! 2. Export it from `definitions/mod.rs`
//! 3. Add it to `register_all`

pub mod definition;
pub mod definitions;
mod error;
pub mod registry;
pub mod schema;
pub mod validator;

pub use definition::{ToolDefinition, ToolMetadata};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use validator::{validate, ValidationError, Violation};
