//! Tool composition: merge presets, add custom tools, drop exclusions.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::{Tool, ToolSet};

/// Declarative recipe for an agent's tool set.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Tool sets merged in order; a later set replaces same-named tools
    /// from an earlier one.
    pub include: Vec<ToolSet>,
    /// Caller-supplied tools, applied after `include` and winning over it.
    pub custom: ToolSet,
    /// Names removed last. Names not present are ignored.
    pub exclude: BTreeSet<String>,
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, set: ToolSet) -> Self {
        self.include.push(set);
        self
    }

    pub fn custom(mut self, tool: Arc<dyn Tool>) -> Self {
        self.custom.insert(tool);
        self
    }

    pub fn custom_set(mut self, set: ToolSet) -> Self {
        self.custom.merge(&set);
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.insert(name.into());
        self
    }
}

/// Build the final tool set from `config`.
pub fn create_tools(config: &ToolConfig) -> ToolSet {
    let mut tools = ToolSet::new();

    for (i, set) in config.include.iter().enumerate() {
        for name in set.names() {
            if tools.contains(name) {
                debug!(tool = name, include = i, "Included tool replaces earlier one");
            }
        }
        tools.merge(set);
    }

    for name in config.custom.names() {
        if tools.contains(name) {
            debug!(tool = name, "Custom tool overrides preset tool");
        }
    }
    tools.merge(&config.custom);

    for name in &config.exclude {
        if tools.remove(name).is_some() {
            debug!(tool = %name, "Excluded tool");
        }
    }

    debug!(count = tools.len(), "Composed tool set");
    tools
}
