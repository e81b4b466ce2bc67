//! sentinel-core: building blocks for a conversational DeFi agent on the
//! Casper Network.
//!
//! - [`tools`]: Tool trait, composable tool sets, the built-in Casper
//!   wallet/transfer/DEX/staking tools and their presets
//! - [`prompts`]: System prompt templates and the prompt builder
//! - [`agent`]: Agent factory and the tool-calling runner
//! - [`casper`]: Chain backends (demo and JSON-RPC), wallet keys and the
//!   simulated DEX
//! - [`provider`]: LLM provider trait and OpenAI-compatible implementation
//! - [`config`]: Typed configuration loading from JSON
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use sentinel_core::agent::runner::AgentRunner;
//! use sentinel_core::agent::{create_agent, AgentProfile};
//! use sentinel_core::config::Config;
//! use sentinel_core::provider::openai::OpenAiProvider;
//! use sentinel_core::tools::Presets;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let client = reqwest::Client::new();
//!
//! // Demo mode unless a Casper private key is configured
//! let presets = Presets::new(config.tool_context(client.clone()));
//! let agent = create_agent(AgentProfile::sentinel().into_config(&presets));
//!
//! let (name, entry) = config.providers.find_active().expect("provider configured");
//! let provider = OpenAiProvider::new(
//!     name,
//!     &entry.api_key,
//!     entry.api_base.as_deref(),
//!     &config.agents.defaults.model,
//!     client,
//! );
//!
//! let runner = AgentRunner::new(agent, Arc::new(provider), config.runner_config());
//! let outcome = runner.run(&[], "What's my balance?").await?;
//! println!("{}", outcome.reply);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod casper;
pub mod config;
pub mod prompts;
pub mod provider;
pub mod tools;
