//! End-to-end composition behaviour: presets, composer, prompt builder and
//! agent factory working together in demo mode.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use sentinel_core::agent::{create_agent, AgentConfig, Network};
use sentinel_core::prompts::{build_prompt, BaseTemplate, PromptConfig, MINIMAL_PROMPT};
use sentinel_core::tools::{create_tools, Preset, Presets, Tool, ToolConfig, ToolError, ToolOutput, ToolSet};

/// Tool that answers with a fixed tag, so tests can tell which
/// implementation survived a merge.
struct Tagged {
    name: &'static str,
    tag: &'static str,
}

#[async_trait]
impl Tool for Tagged {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed tag."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::Custom(json!({ "tag": self.tag })))
    }
}

fn tagged(name: &'static str, tag: &'static str) -> Arc<dyn Tool> {
    Arc::new(Tagged { name, tag })
}

async fn tag_of(tools: &ToolSet, name: &str) -> Value {
    let output = tools.invoke(name, json!({})).await.unwrap();
    output.to_json()["tag"].clone()
}

#[tokio::test]
async fn later_include_wins() {
    let a = ToolSet::new().with(tagged("x", "A")).with(tagged("a_only", "A"));
    let b = ToolSet::new().with(tagged("x", "B"));

    let tools = create_tools(&ToolConfig::new().include(a).include(b));
    assert_eq!(tools.names(), vec!["a_only", "x"]);
    assert_eq!(tag_of(&tools, "x").await, "B");
}

#[tokio::test]
async fn custom_beats_include() {
    let presets = Presets::demo();
    let config = ToolConfig::new()
        .include(presets.wallet())
        .custom(tagged("checkBalance", "custom"));

    let tools = create_tools(&config);
    assert_eq!(tools.len(), presets.wallet().len());
    assert_eq!(tag_of(&tools, "checkBalance").await, "custom");
}

#[test]
fn excluding_an_absent_name_is_a_no_op() {
    let presets = Presets::demo();
    let plain = create_tools(&ToolConfig::new().include(presets.dex()));
    let excluded = create_tools(&ToolConfig::new().include(presets.dex()).exclude("sendCSPR"));
    assert_eq!(plain.names(), excluded.names());
}

#[test]
fn include_yields_exact_union() {
    let presets = Presets::demo();
    let wallet = presets.wallet();
    let transfer = presets.transfer();
    let tools = create_tools(&ToolConfig::new().include(wallet.clone()).include(transfer.clone()));

    let expected: BTreeSet<&str> = wallet.names().into_iter().chain(transfer.names()).collect();
    let actual: BTreeSet<&str> = tools.names().into_iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn preset_groups_match_their_names() {
    let presets = Presets::demo();
    for preset in Preset::ALL {
        let mut expected = preset.tool_names();
        expected.sort_unstable();
        assert_eq!(presets.group(preset).names(), expected, "preset {}", preset);
    }
}

#[test]
fn defi_prompt_without_additions() {
    let prompt = build_prompt(&PromptConfig::with_base(BaseTemplate::Defi));
    assert!(prompt.contains("DEFI SPECIALIZATION"));
    assert!(!prompt.contains("ADDITIONAL INSTRUCTIONS:"));
}

#[test]
fn name_first_additions_last() {
    let prompt = build_prompt(&PromptConfig {
        base: Some(BaseTemplate::Defi),
        agent_name: Some("Bob".into()),
        additions: Some("X".into()),
        ..PromptConfig::default()
    });
    let first_line = prompt.lines().next().unwrap();
    assert!(first_line.contains("Bob"));
    assert!(prompt.ends_with("ADDITIONAL INSTRUCTIONS:\nX"));
}

#[test]
fn description_replaces_anchor_once() {
    let prompt = build_prompt(&PromptConfig {
        base: Some(BaseTemplate::Defi),
        agent_description: Some("a test agent".into()),
        ..PromptConfig::default()
    });
    assert_eq!(prompt.matches("You are a test agent").count(), 1);
    assert!(!prompt.contains("You are an AI agent"));
}

#[test]
fn description_dropped_without_anchor() {
    let prompt = build_prompt(&PromptConfig {
        base: Some(BaseTemplate::Custom),
        custom: Some("Be brief.".into()),
        agent_description: Some("a test agent".into()),
        ..PromptConfig::default()
    });
    assert_eq!(prompt, "Be brief.");
}

#[test]
fn minimal_agent_end_to_end() {
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
    assert!(agent.system_prompt().contains('X'));

    let body = MINIMAL_PROMPT.replacen("You are an AI agent", "You are Y", 1);
    assert!(agent.system_prompt().ends_with(&body));
}

#[tokio::test]
async fn demo_agent_tools_run_offline() {
    let presets = Presets::demo();
    let agent = create_agent(AgentConfig {
        name: "Demo".into(),
        tools: ToolConfig::new().include(presets.defi()),
        ..AgentConfig::default()
    });

    let balance = agent.tools().invoke("checkBalance", json!({})).await.unwrap();
    assert!(balance.is_success());

    let quote = agent
        .tools()
        .invoke(
            "getSwapQuote",
            json!({"tokenIn": "CSPR", "tokenOut": "USDC", "amountIn": "100"}),
        )
        .await
        .unwrap();
    let quote = quote.to_json();
    assert_eq!(quote["success"], true);
    assert_eq!(quote["route"], "CSPR → USDC");

    let missing = agent
        .tools()
        .invoke(
            "getDexPoolInfo",
            json!({"tokenA": "WETH", "tokenB": "USDT"}),
        )
        .await
        .unwrap();
    assert!(!missing.is_success());
    assert_eq!(missing.to_json()["error"], "No pool found for WETH/USDT pair");
}
