//! Configuration for sentinel.
//!
//! Loads typed configuration from `~/.sentinel/config.json`, then applies
//! `CASPER_*` environment overrides. Every section has defaults, so an
//! empty or missing file gives a working demo-mode setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent::runner::RunnerConfig;
use crate::agent::{AgentProfile, Network};
use crate::casper::client::RpcBackend;
use crate::casper::dex::{DexLatency, SimulatedDex};
use crate::casper::mock::DemoBackend;
use crate::casper::wallet::{Wallet, WalletHandle};
use crate::casper::{ChainBackend, DEFAULT_CHAIN_NAME, DEFAULT_NODE_URL, MAINNET_CHAIN_NAME};
use crate::tools::ToolContext;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub agents: AgentsConfig,
    pub casper: CasperConfig,
    pub dex: DexConfig,
    pub agent: AgentProfile,
}

impl Config {
    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Get the default config directory path.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sentinel")
    }

    /// Override Casper settings from `CASPER_NODE_URL`, `CASPER_CHAIN_NAME`
    /// and `CASPER_PRIVATE_KEY`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("CASPER_NODE_URL") {
            info!("Using Casper node URL from environment variable");
            self.casper.node_url = url;
        }
        if let Some(chain) = lookup("CASPER_CHAIN_NAME") {
            info!("Using Casper chain name from environment variable");
            self.casper.chain_name = chain;
        }
        if let Some(key) = lookup("CASPER_PRIVATE_KEY") {
            info!("Using Casper private key from environment variable");
            self.casper.private_key = Some(key);
        }
    }

    /// Write the default config template to disk.
    pub fn write_default_template() -> anyhow::Result<PathBuf> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = serde_json::json!({
            "providers": {
                "openrouter": {
                    "apiKey": "sk-or-v1-YOUR_KEY_HERE"
                }
            },
            "agents": {
                "defaults": {
                    "model": AgentDefaults::default().model
                }
            },
            "casper": {
                "network": "testnet",
                "nodeUrl": DEFAULT_NODE_URL,
                "chainName": DEFAULT_CHAIN_NAME
            }
        });

        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok(path)
    }

    /// Check the configuration, collecting every problem found.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.providers.find_active().is_none() {
            errors.push(
                "No LLM provider configured with a real API key. \
                 Edit config.json and replace the placeholder key."
                    .into(),
            );
        }

        let defaults = &self.agents.defaults;
        if defaults.model.is_empty() {
            errors.push("agents.defaults.model is empty. Specify a model name.".into());
        }
        if defaults.max_tool_iterations == 0 {
            errors.push("agents.defaults.maxToolIterations must be at least 1.".into());
        }
        if defaults.timeout_seconds == 0 {
            errors.push("agents.defaults.timeoutSeconds must be at least 1.".into());
        }

        let casper = &self.casper;
        if !(casper.node_url.starts_with("http://") || casper.node_url.starts_with("https://")) {
            errors.push(format!(
                "casper.nodeUrl '{}' is not an http(s) URL.",
                casper.node_url
            ));
        }
        if casper.chain_name.is_empty() {
            errors.push("casper.chainName is empty.".into());
        }
        if let Some(key) = casper.private_key() {
            if let Err(e) = Wallet::from_hex(key) {
                errors.push(format!("casper.privateKey is unusable: {}", e));
            }
        }

        if !(0.0..=1.0).contains(&self.dex.failure_rate) {
            errors.push("dex.failureRate must be between 0 and 1.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Switch the agent and explorer network. The node URL and chain name
    /// are left alone, so a mismatch with them is logged.
    pub fn set_network(&mut self, network: Network) {
        self.casper.network = network;
        self.agent.network = Some(network);
        if let Some(problem) = self.casper.network_mismatch() {
            warn!(%network, node = %self.casper.node_url, "{}", problem);
        }
    }

    /// Demo mode: no wallet key configured.
    pub fn is_demo(&self) -> bool {
        self.casper.private_key().is_none()
    }

    /// Chain backend for this configuration: the demo backend without a
    /// key, otherwise the node's JSON-RPC API.
    pub fn chain_backend(&self, client: reqwest::Client) -> Arc<dyn ChainBackend> {
        match self.casper.private_key() {
            None => {
                info!("No Casper private key configured, running in demo mode");
                Arc::new(DemoBackend::new())
            }
            Some(key) => {
                info!(node = %self.casper.node_url, chain = %self.casper.chain_name, "Using live Casper backend");
                Arc::new(RpcBackend::new(
                    client,
                    &self.casper.node_url,
                    &self.casper.chain_name,
                    Arc::new(WalletHandle::new(key)),
                ))
            }
        }
    }

    pub fn simulated_dex(&self) -> SimulatedDex {
        let latency = if self.dex.simulate_latency {
            DexLatency::default()
        } else {
            DexLatency::none()
        };
        SimulatedDex::new(latency, self.dex.failure_rate)
    }

    /// Everything the built-in tools need, built from this configuration.
    pub fn tool_context(&self, client: reqwest::Client) -> ToolContext {
        ToolContext::new(
            self.chain_backend(client),
            Arc::new(self.simulated_dex()),
            self.casper.network.explorer(),
        )
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let defaults = &self.agents.defaults;
        RunnerConfig {
            model: Some(defaults.model.clone()).filter(|m| !m.is_empty()),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            max_iterations: defaults.max_tool_iterations,
            timeout: Duration::from_secs(defaults.timeout_seconds),
        }
    }
}

// ── Provider Configuration ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEntry {
    pub api_key: String,
    pub api_base: Option<String>,
    /// Overrides `agents.defaults.model` for this provider.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openrouter: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub deepseek: Option<ProviderEntry>,
    pub groq: Option<ProviderEntry>,
    pub gemini: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub vllm: Option<ProviderEntry>,
}

impl ProvidersConfig {
    /// Find the first configured provider (has a non-empty, non-placeholder API key).
    pub fn find_active(&self) -> Option<(&'static str, &ProviderEntry)> {
        let candidates: [(&'static str, &Option<ProviderEntry>); 8] = [
            ("openrouter", &self.openrouter),
            ("anthropic", &self.anthropic),
            ("openai", &self.openai),
            ("deepseek", &self.deepseek),
            ("groq", &self.groq),
            ("gemini", &self.gemini),
            ("ollama", &self.ollama),
            ("vllm", &self.vllm),
        ];

        candidates.into_iter().find_map(|(name, entry)| {
            entry
                .as_ref()
                .filter(|e| !e.api_key.is_empty() && !e.api_key.contains("YOUR_"))
                .map(|e| (name, e))
        })
    }
}

// ── Agent Configuration ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_tool_iterations: u32,
    pub timeout_seconds: u64,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: "anthropic/claude-sonnet-4".into(),
            max_tokens: 4096,
            temperature: 0.7,
            max_tool_iterations: 10,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

// ── Casper Configuration ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CasperConfig {
    pub network: Network,
    pub node_url: String,
    pub chain_name: String,
    /// Hex Ed25519 private key. Unset means demo mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl CasperConfig {
    /// The configured key, if it is non-empty.
    pub fn private_key(&self) -> Option<&str> {
        self.private_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Describe a disagreement between `network` and the configured chain
    /// name, if there is one.
    pub fn network_mismatch(&self) -> Option<String> {
        let expected = match self.network {
            Network::Mainnet => MAINNET_CHAIN_NAME,
            Network::Testnet => DEFAULT_CHAIN_NAME,
        };
        let known = [MAINNET_CHAIN_NAME, DEFAULT_CHAIN_NAME];
        if known.contains(&self.chain_name.as_str()) && self.chain_name != expected {
            Some(format!(
                "Network is {} but casper.chainName is '{}'. Set casper.nodeUrl and \
                 casper.chainName for {} or explorer links will point at the wrong network",
                self.network, self.chain_name, self.network
            ))
        } else {
            None
        }
    }
}

impl Default for CasperConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            node_url: DEFAULT_NODE_URL.into(),
            chain_name: DEFAULT_CHAIN_NAME.into(),
            private_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DexConfig {
    pub simulate_latency: bool,
    pub failure_rate: f64,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            simulate_latency: true,
            failure_rate: 0.05,
        }
    }
}
