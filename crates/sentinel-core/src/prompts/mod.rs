//! System prompt builder.
//!
//! Turns a [`PromptConfig`] into the final system prompt handed to the
//! model: pick the custom text or a base template, inject the agent's name
//! and description, then append any additional instructions.

pub mod templates;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use templates::{
    template_for, BaseTemplate, NamedTemplate, BASE_PROMPT, DEFI_PROMPT, DESCRIPTION_ANCHOR,
    MINIMAL_PROMPT, SENTINEL_ADDITIONS,
};

/// Heading that introduces free-text additions at the end of a prompt.
pub const ADDITIONS_HEADER: &str = "ADDITIONAL INSTRUCTIONS:";

/// Inputs to [`build_prompt`]. Every field is optional; empty strings are
/// treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    pub base: Option<BaseTemplate>,
    pub agent_name: Option<String>,
    pub agent_description: Option<String>,
    pub additions: Option<String>,
    /// Full prompt text that replaces the base template.
    pub custom: Option<String>,
}

impl PromptConfig {
    pub fn with_base(base: BaseTemplate) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }
}

/// Build the system prompt.
///
/// Name injection always prepends. The description rewrites the first
/// occurrence of [`DESCRIPTION_ANCHOR`] and is dropped when the anchor is
/// missing. Additions are appended last, after custom text as well.
pub fn build_prompt(config: &PromptConfig) -> String {
    let mut prompt = match non_empty(&config.custom) {
        Some(custom) => custom.to_string(),
        None => template_for(config.base.unwrap_or_default()).to_string(),
    };

    if let Some(name) = non_empty(&config.agent_name) {
        prompt = format!("Your name is {}.\n\n{}", name, prompt);
    }

    if let Some(description) = non_empty(&config.agent_description) {
        if prompt.contains(DESCRIPTION_ANCHOR) {
            prompt = prompt.replacen(DESCRIPTION_ANCHOR, &format!("You are {}", description), 1);
        } else {
            warn!(
                anchor = DESCRIPTION_ANCHOR,
                "Prompt has no description anchor, agent description dropped"
            );
        }
    }

    if let Some(additions) = non_empty(&config.additions) {
        prompt.push_str("\n\n");
        prompt.push_str(ADDITIONS_HEADER);
        prompt.push('\n');
        prompt.push_str(additions);
    }

    debug!(
        base = config.base.unwrap_or_default().as_str(),
        custom = config.custom.is_some(),
        len = prompt.len(),
        "Built system prompt"
    );
    prompt
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
