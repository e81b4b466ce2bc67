//! Built-in system prompt templates.
//!
//! Every template starts from [`BASE_PROMPT`], which carries the
//! `"You are an AI agent"` anchor the prompt builder rewrites when an agent
//! description is supplied.

use serde::{Deserialize, Serialize};

use super::PromptConfig;

/// Phrase replaced by `"You are {description}"` during prompt building.
pub const DESCRIPTION_ANCHOR: &str = "You are an AI agent";

macro_rules! base_prompt {
    () => {
        "You are an AI agent operating on the Casper Network blockchain.

CORE CAPABILITIES:
- Execute blockchain transactions
- Query on-chain data
- Interact with smart contracts
- Manage wallet operations

GUIDELINES:
- Always verify transaction details before executing
- Provide clear explanations of blockchain operations
- Handle errors gracefully and inform users
- Use appropriate gas settings for transactions
- Never expose private keys or sensitive data"
    };
}

pub const BASE_PROMPT: &str = base_prompt!();

pub const DEFI_PROMPT: &str = concat!(
    base_prompt!(),
    "

DEFI SPECIALIZATION:
You are a DeFi (Decentralized Finance) agent specializing in:
- Token swaps and trading
- Liquidity provision
- Staking and delegation
- Portfolio management

TRADING GUIDELINES:
- Always get quotes before executing swaps
- Warn users about high price impact (>2%)
- Explain fees and slippage clearly
- Verify token balances before transactions

STAKING GUIDELINES:
- Minimum delegation is 500 CSPR
- Explain validator selection criteria
- Warn about undelegation periods
- Show current APY and delegation rates"
);

pub const MINIMAL_PROMPT: &str = concat!(
    base_prompt!(),
    "

You are a minimal Casper Network agent. Execute requested operations efficiently and provide clear feedback."
);

/// Extra instructions layered on top of the DeFi template for the Sentinel
/// demo agent.
pub const SENTINEL_ADDITIONS: &str = "
## Sentinel-Specific Guidelines:

- You operate on Casper TESTNET - tokens have no real monetary value
- All transactions require a small gas fee (automatically handled)
- Public keys on Casper start with \"01\" (Ed25519) or \"02\" (Secp256k1)
- 1 CSPR = 1,000,000,000 motes (the smallest unit)

## Transaction Guidelines:
- Always confirm transaction details before executing
- Verify recipient addresses look valid (correct length, starts with 01 or 02)
- Check your balance before sending to ensure sufficient funds
- Provide transaction hashes and explorer links after operations

## Personality:
- Professional but friendly
- Clear and concise explanations
- Proactive about providing context on blockchain operations
- Helpful when explaining crypto concepts to newcomers

## Response Format:
- When showing balances, display both CSPR and motes
- Always provide explorer links for transactions
- If something fails, explain the error clearly and suggest solutions

Remember: You are a demo agent for a hackathon. Be impressive but honest about your testnet-only capabilities!
";

/// Identifier of a base template.
///
/// Parsing is lenient: any identifier that is not `minimal` or `custom`
/// selects the DeFi template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaseTemplate {
    #[default]
    Defi,
    Minimal,
    Custom,
}

impl BaseTemplate {
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "custom" => Self::Custom,
            _ => Self::Defi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defi => "defi",
            Self::Minimal => "minimal",
            Self::Custom => "custom",
        }
    }
}

impl From<String> for BaseTemplate {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl From<BaseTemplate> for String {
    fn from(base: BaseTemplate) -> Self {
        base.as_str().to_string()
    }
}

/// Template text for a base identifier.
///
/// There is no stored text for `Custom`; it resolves to the DeFi template
/// when no custom prompt accompanies it.
pub fn template_for(base: BaseTemplate) -> &'static str {
    match base {
        BaseTemplate::Minimal => MINIMAL_PROMPT,
        BaseTemplate::Defi | BaseTemplate::Custom => DEFI_PROMPT,
    }
}

/// A user-defined template, kept alongside its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTemplate {
    pub name: String,
    pub template: String,
}

impl NamedTemplate {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
        }
    }

    /// Prompt settings that use this template as the custom prompt text.
    pub fn prompt_config(&self) -> PromptConfig {
        PromptConfig {
            base: Some(BaseTemplate::Custom),
            custom: Some(self.template.clone()),
            ..PromptConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_extend_base() {
        assert!(DEFI_PROMPT.starts_with(BASE_PROMPT));
        assert!(MINIMAL_PROMPT.starts_with(BASE_PROMPT));
        assert!(DEFI_PROMPT.contains("DEFI SPECIALIZATION"));
        assert!(MINIMAL_PROMPT.contains("minimal Casper Network agent"));
        assert!(BASE_PROMPT.contains(DESCRIPTION_ANCHOR));
    }

    #[test]
    fn test_unknown_base_falls_back_to_defi() {
        assert_eq!(BaseTemplate::from_id("minimal"), BaseTemplate::Minimal);
        assert_eq!(BaseTemplate::from_id("MINIMAL"), BaseTemplate::Minimal);
        assert_eq!(BaseTemplate::from_id("trading"), BaseTemplate::Defi);
        assert_eq!(template_for(BaseTemplate::Custom), DEFI_PROMPT);
    }

    #[test]
    fn test_base_template_serde() {
        let base: BaseTemplate = serde_json::from_str("\"nonsense\"").unwrap();
        assert_eq!(base, BaseTemplate::Defi);
        let json = serde_json::to_string(&BaseTemplate::Minimal).unwrap();
        assert_eq!(json, "\"minimal\"");
    }

    #[test]
    fn test_named_template() {
        let template = NamedTemplate::new("terse", "You are an AI agent. Be brief.");
        assert_eq!(template.name, "terse");

        let config = template.prompt_config();
        assert_eq!(config.base, Some(BaseTemplate::Custom));
        assert_eq!(config.custom.as_deref(), Some("You are an AI agent. Be brief."));

        let prompt = crate::prompts::build_prompt(&PromptConfig {
            agent_description: Some("a terse helper".into()),
            ..config
        });
        assert_eq!(prompt, "You are a terse helper. Be brief.");
    }
}
