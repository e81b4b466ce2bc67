//! Tool system: trait, composed tool sets, and the Casper tools.
//!
//! Every tool implements the `Tool` trait. Tools are grouped into presets
//! (`presets`), and `compose::create_tools` merges presets, caller-supplied
//! tools and exclusions into the `ToolSet` an agent carries. The runner
//! dispatches model tool calls through `ToolSet::invoke`.

pub mod compose;
pub mod dex;
pub mod output;
pub mod presets;
pub mod schema;
pub mod staking;
pub mod transfer;
pub mod wallet;

pub use compose::{create_tools, ToolConfig};
pub use output::{Failure, ToolOutput};
pub use presets::{get_available_tools, Preset, Presets, ToolContext};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::provider::types::{ToolDefinition, ToolFunctionDef};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),
    #[error("Invalid arguments for '{tool}': {message}")]
    Validation { tool: String, message: String },
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

/// Trait that all agent tools must implement.
///
/// Each tool declares its name, description, JSON Schema parameters, and
/// an async `execute` method. Arguments are validated against
/// `parameters()` before `execute` is called.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name used in function calls (e.g., "checkBalance").
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Expected failures (bad recipient, unknown pool) belong in
    /// `ToolOutput::Failure`; `Err(ToolError::Execution)` is for the
    /// unexpected ones.
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Deserialize tool arguments into a typed struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::Validation {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// Turn a model-supplied `limit` into a count. Fractions truncate and
/// negative values count as zero.
pub(crate) fn count_from(limit: f64) -> usize {
    limit.max(0.0) as usize
}

/// A named set of tools, ordered by name.
///
/// Inserting a tool whose name is already present replaces the old one.
/// Cloning is cheap: tools are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, returning the one it replaced.
    pub fn insert(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        self.tools.insert(tool.name().to_string(), tool)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.insert(tool);
        self
    }

    /// Copy every tool from `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &ToolSet) {
        for (name, tool) in &other.tools {
            self.tools.insert(name.clone(), Arc::clone(tool));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Tool>)> {
        self.tools.iter().map(|(name, tool)| (name.as_str(), tool))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions in OpenAI function-calling format.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                def_type: "function".into(),
                function: ToolFunctionDef {
                    name: tool.name().into(),
                    description: tool.description().into(),
                    parameters: tool.parameters(),
                },
            })
            .collect()
    }

    /// Validate the arguments and run a tool.
    ///
    /// Unexpected execution errors are converted into a
    /// `ToolOutput::Failure` so the model always gets a result record.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            error!(tool = name, "Tool not found");
            return Err(ToolError::NotFound(name.to_string()));
        };

        if let Err(message) = schema::validate(&tool.parameters(), &args) {
            warn!(tool = name, error = %message, "Rejected tool arguments");
            return Err(ToolError::Validation {
                tool: name.to_string(),
                message,
            });
        }

        debug!(tool = name, "Executing tool");
        match tool.execute(args).await {
            Ok(output) => Ok(output),
            Err(ToolError::Execution(e)) => {
                warn!(tool = name, error = %e, "Tool failed");
                Ok(ToolOutput::failure(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.tools.keys()).finish()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut set = ToolSet::new();
        for tool in iter {
            set.insert(tool);
        }
        set
    }
}

/// `{}` schema shared by tools that take no arguments.
pub(crate) fn no_parameters() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the text back"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }
        async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
            let args: EchoArgs = parse_args(self.name(), args)?;
            Ok(ToolOutput::Custom(json!({"text": args.text})))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            no_parameters()
        }
        async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
            Err(anyhow::anyhow!("node unreachable").into())
        }
    }

    #[tokio::test]
    async fn test_insert_and_invoke() {
        let set = ToolSet::new().with(Arc::new(EchoTool));
        assert!(set.contains("echo"));
        assert_eq!(set.len(), 1);

        let out = set.invoke("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(out.to_json(), json!({"text": "hi", "success": true}));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let set = ToolSet::new();
        let err = set.invoke("nonexistent", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_execute() {
        let set = ToolSet::new().with(Arc::new(EchoTool));
        let err = set.invoke("echo", json!({"text": 3})).await.unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_execution_error_becomes_failure() {
        let set = ToolSet::new().with(Arc::new(BrokenTool));
        let out = set.invoke("broken", json!({})).await.unwrap();
        assert_eq!(out.to_json(), json!({"success": false, "error": "node unreachable"}));
    }

    #[test]
    fn test_definitions_are_ordered() {
        let set = ToolSet::new().with(Arc::new(EchoTool)).with(Arc::new(BrokenTool));
        let names: Vec<String> = set
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["broken", "echo"]);
        assert_eq!(format!("{:?}", set), r#"{"broken", "echo"}"#);
    }

    #[test]
    fn test_merge_last_wins() {
        let mut a = ToolSet::new().with(Arc::new(EchoTool));
        let replacement: Arc<dyn Tool> = Arc::new(EchoTool);
        let b = ToolSet::new().with(Arc::clone(&replacement));
        a.merge(&b);
        assert!(Arc::ptr_eq(a.get("echo").unwrap(), &replacement));
    }
}
