//! Tool Registry: the closed set of tools and their parameter contracts.
//!
//! The registry is pure data: it is built once from the executor's tools and
//! never changes afterwards. Dispatch lives in [`super::executor`].

use std::fmt;

use brainloop_core::types::ToolDefinition;
use serde_json::{json, Map, Value};

// ─────────────────────────────────────────────
// ToolKind
// ─────────────────────────────────────────────

/// Every tool the model can call. Names outside this set are rejected by
/// the executor's default branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ReadFile,
    WriteFile,
    ExecuteShell,
    WebSearch,
    ListFiles,
    SpawnSubAgent,
}

impl ToolKind {
    /// Declaration order sent to the model.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::ExecuteShell,
        ToolKind::WebSearch,
        ToolKind::ListFiles,
        ToolKind::SpawnSubAgent,
    ];

    /// Wire name used by the model.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::ExecuteShell => "execute_shell",
            ToolKind::WebSearch => "web_search",
            ToolKind::ListFiles => "list_files",
            ToolKind::SpawnSubAgent => "spawn_sub_agent",
        }
    }

    /// Look up a tool by wire name.
    pub fn from_name(name: &str) -> Option<ToolKind> {
        ToolKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────
// Parameter contracts
// ─────────────────────────────────────────────

/// JSON type of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    String,
    StringList,
}

/// One entry of a tool's parameter schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    /// A required string parameter.
    pub fn string(name: &'static str, description: &'static str) -> Self {
        ParamSpec {
            name,
            param_type: ParamType::String,
            description,
            required: true,
        }
    }

    /// A required list-of-strings parameter.
    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        ParamSpec {
            name,
            param_type: ParamType::StringList,
            description,
            required: true,
        }
    }

    fn schema(&self) -> Value {
        match self.param_type {
            ParamType::String => json!({
                "type": "string",
                "description": self.description,
            }),
            ParamType::StringList => json!({
                "type": "array",
                "items": { "type": "string" },
                "description": self.description,
            }),
        }
    }
}

/// Name, description and parameter contract of one tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolDeclaration {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolDeclaration {
    pub fn new(kind: ToolKind, description: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        ToolDeclaration {
            kind,
            name: kind.name(),
            description: description.into(),
            params,
        }
    }

    /// Names of the parameters marked required.
    pub fn required(&self) -> Vec<&'static str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect()
    }

    /// Function-calling definition sent to the model endpoint.
    pub fn to_definition(&self) -> ToolDefinition {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();

        ToolDefinition::new(
            self.name,
            self.description.clone(),
            json!({
                "type": "object",
                "properties": properties,
                "required": self.required(),
            }),
        )
    }
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Ordered, immutable list of tool declarations.
#[derive(Clone, Debug)]
pub struct ToolRegistry {
    declarations: Vec<ToolDeclaration>,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Freeze a set of declarations. Order is preserved.
    pub fn new(declarations: Vec<ToolDeclaration>) -> Self {
        let definitions = declarations.iter().map(ToolDeclaration::to_definition).collect();
        Self {
            declarations,
            definitions,
        }
    }

    /// All declarations, in the order they are offered to the model.
    pub fn list(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    /// Wire-format definitions, built once at construction.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Tool names, in declaration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.declarations.iter().map(|d| d.name).collect()
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&ToolDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Number of declared tools.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no tools are declared.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
