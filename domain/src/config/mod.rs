//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod tool_catalog;
pub mod validation;

pub use tool_catalog::ToolCatalog;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
