//! Agent factory.
//!
//! An [`Agent`] is the immutable bundle handed to a chat completion call:
//! a composed [`ToolSet`], the built system prompt and a network selector.
//! [`create_agent`] assembles one from an [`AgentConfig`]; [`AgentProfile`]
//! is the serializable form kept in the config file.

pub mod runner;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::casper::Explorer;
use crate::prompts::{build_prompt, BaseTemplate, PromptConfig, SENTINEL_ADDITIONS};
use crate::tools::{create_tools, Preset, Presets, ToolConfig, ToolSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn explorer(self) -> Explorer {
        match self {
            Network::Mainnet => Explorer::mainnet(),
            Network::Testnet => Explorer::testnet(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("unknown network '{}' (expected mainnet or testnet)", other)),
        }
    }
}

/// Everything needed to build an agent.
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub tools: ToolConfig,
    pub prompt: PromptConfig,
    /// Defaults to testnet.
    pub network: Option<Network>,
}

#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    description: String,
    tools: ToolSet,
    system_prompt: String,
    network: Network,
}

impl Agent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Compose tools, build the prompt and assemble the agent.
///
/// The agent's name and description are used in the prompt unless the
/// prompt config sets its own.
pub fn create_agent(config: AgentConfig) -> Agent {
    let tools = create_tools(&config.tools);

    let mut prompt = config.prompt;
    if is_blank(&prompt.agent_name) {
        prompt.agent_name = Some(config.name.clone());
    }
    if is_blank(&prompt.agent_description) {
        prompt.agent_description = Some(config.description.clone());
    }
    let system_prompt = build_prompt(&prompt);
    let network = config.network.unwrap_or_default();

    debug!(
        agent = %config.name,
        tools = tools.len(),
        network = %network,
        prompt_len = system_prompt.len(),
        "Created agent"
    );

    Agent {
        name: config.name,
        description: config.description,
        tools,
        system_prompt,
        network,
    }
}

/// Agent with every built-in tool and the DeFi prompt.
pub fn create_defi_agent(presets: &Presets, name: &str, additions: Option<&str>) -> Agent {
    create_agent(AgentConfig {
        name: name.to_string(),
        description: format!("{} - AI-powered DeFi agent on Casper", name),
        tools: ToolConfig::new().include(presets.defi()),
        prompt: PromptConfig {
            base: Some(BaseTemplate::Defi),
            agent_name: Some(name.to_string()),
            additions: additions.map(str::to_string),
            ..PromptConfig::default()
        },
        network: None,
    })
}

/// Agent limited to wallet and transfer tools.
pub fn create_minimal_agent(presets: &Presets, name: &str, additions: Option<&str>) -> Agent {
    create_agent(AgentConfig {
        name: name.to_string(),
        description: format!("{} - Casper wallet agent", name),
        tools: ToolConfig::new().include(presets.minimal()),
        prompt: PromptConfig {
            base: Some(BaseTemplate::Minimal),
            agent_name: Some(name.to_string()),
            additions: additions.map(str::to_string),
            ..PromptConfig::default()
        },
        network: None,
    })
}

/// Preset-based tool selection, as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileTools {
    pub include: Vec<Preset>,
    pub exclude: Vec<String>,
}

/// Serializable agent definition.
///
/// Custom tools can't be expressed in a file; callers that need them
/// add them to the [`AgentConfig`] returned by [`AgentProfile::into_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentProfile {
    pub name: String,
    pub description: String,
    pub tools: ProfileTools,
    pub prompt: PromptConfig,
    pub network: Option<Network>,
}

impl AgentProfile {
    /// The Sentinel demo agent: DeFi tools and prompt, testnet.
    pub fn sentinel() -> Self {
        Self {
            name: "Sentinel".into(),
            description: "an AI-powered DeFi agent operating on the Casper Network testnet".into(),
            tools: ProfileTools {
                include: vec![Preset::Defi],
                exclude: Vec::new(),
            },
            prompt: PromptConfig {
                base: Some(BaseTemplate::Defi),
                additions: Some(SENTINEL_ADDITIONS.to_string()),
                ..PromptConfig::default()
            },
            network: Some(Network::Testnet),
        }
    }

    pub fn into_config(self, presets: &Presets) -> AgentConfig {
        let include = self
            .tools
            .include
            .iter()
            .map(|preset| presets.group(*preset))
            .collect();

        AgentConfig {
            name: self.name,
            description: self.description,
            tools: ToolConfig {
                include,
                custom: ToolSet::new(),
                exclude: self.tools.exclude.into_iter().collect(),
            },
            prompt: self.prompt,
            network: self.network,
        }
    }
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::MINIMAL_PROMPT;

    #[test]
    fn test_create_agent_defaults() {
        let presets = Presets::demo();
        let agent = create_agent(AgentConfig {
            name: "X".into(),
            description: "Y".into(),
            tools: ToolConfig::new().include(presets.minimal()),
            prompt: PromptConfig::with_base(BaseTemplate::Minimal),
            network: None,
        });

        assert_eq!(agent.tools().names(), presets.minimal().names());
        assert_eq!(agent.network(), Network::Testnet);
        assert!(agent.system_prompt().starts_with("Your name is X.\n\n"));
        assert!(agent.system_prompt().contains("You are Y"));
        assert!(!agent.system_prompt().contains("You are an AI agent"));
    }

    #[test]
    fn test_explicit_prompt_identity_wins() {
        let agent = create_agent(AgentConfig {
            name: "Outer".into(),
            description: "outer description".into(),
            prompt: PromptConfig {
                agent_name: Some("Inner".into()),
                agent_description: Some("an inner agent".into()),
                ..PromptConfig::default()
            },
            ..AgentConfig::default()
        });
        assert!(agent.system_prompt().starts_with("Your name is Inner."));
        assert!(agent.system_prompt().contains("You are an inner agent"));
        assert_eq!(agent.name(), "Outer");
    }

    #[test]
    fn test_empty_tool_set_is_accepted() {
        let agent = create_agent(AgentConfig {
            name: "Empty".into(),
            ..AgentConfig::default()
        });
        assert!(agent.tools().is_empty());
    }

    #[test]
    fn test_convenience_factories() {
        let presets = Presets::demo();

        let defi = create_defi_agent(&presets, "Trader", Some("Prefer stablecoins."));
        assert_eq!(defi.tools().len(), 10);
        assert_eq!(defi.description(), "Trader - AI-powered DeFi agent on Casper");
        assert!(defi.system_prompt().contains("DEFI SPECIALIZATION"));
        assert!(defi.system_prompt().ends_with("ADDITIONAL INSTRUCTIONS:\nPrefer stablecoins."));

        let minimal = create_minimal_agent(&presets, "Wally", None);
        assert_eq!(minimal.tools().len(), 4);
        assert_eq!(minimal.description(), "Wally - Casper wallet agent");
        assert!(!minimal.system_prompt().contains("ADDITIONAL INSTRUCTIONS"));
    }

    #[test]
    fn test_sentinel_profile() {
        let presets = Presets::demo();
        let agent = create_agent(AgentProfile::sentinel().into_config(&presets));
        assert_eq!(agent.name(), "Sentinel");
        assert_eq!(agent.tools().len(), 10);
        assert!(agent.system_prompt().starts_with("Your name is Sentinel."));
        assert!(agent
            .system_prompt()
            .contains("You are an AI-powered DeFi agent operating on the Casper Network testnet"));
        assert!(agent.system_prompt().contains("Sentinel-Specific Guidelines"));
    }

    #[test]
    fn test_profile_from_json() {
        let profile: AgentProfile = serde_json::from_str(
            r#"{
                "name": "Stash",
                "description": "a cautious wallet",
                "tools": {"include": ["minimal", "staking"], "exclude": ["sendCSPR"]},
                "prompt": {"base": "minimal"},
                "network": "mainnet"
            }"#,
        )
        .unwrap();
        let agent = create_agent(profile.into_config(&Presets::demo()));
        assert_eq!(
            agent.tools().names(),
            vec!["checkBalance", "checkRecipientBalance", "getWalletAddress", "listValidators"]
        );
        assert_eq!(agent.network(), Network::Mainnet);
        let body = MINIMAL_PROMPT.replacen("You are an AI agent", "You are a cautious wallet", 1);
        assert!(agent.system_prompt().ends_with(&body));
        assert!(!agent.system_prompt().contains("DEFI SPECIALIZATION"));
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("devnet".parse::<Network>().is_err());
        assert_eq!(Network::Mainnet.explorer().account("01"), "https://cspr.live/account/01");
    }
}
