//! Built-in tools, their declarations, and the executor that dispatches them.

pub mod base;
pub mod executor;
pub mod filesystem;
pub mod registry;
pub mod shell;
pub mod spawn;
pub mod web;

pub use base::{optional_string, require_string, string_list, Tool};
pub use executor::{ToolExecutor, ToolSettings};
pub use registry::{ParamSpec, ParamType, ToolDeclaration, ToolKind, ToolRegistry};
