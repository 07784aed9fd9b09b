//! Tool schema registry — the static catalogue of fleet operations.
//!
//! Provides:
//! - Declarative tool descriptors (name, argument shape, target operation)
//! - One shared validator interpreting the descriptor table
//! - The combined registry the orchestrator routes through

pub mod catalog;
pub mod schema;

// Re-exports for convenience
pub use catalog::ToolRegistry;
pub use schema::{ArgSpec, ArgType, Args, BackendKind, ToolDescriptor, ToolError, ToolOp};
