//! Agent runner: drives a chat model with an [`Agent`]'s prompt and tools.
//!
//! One `run` call:
//! 1. Sends system prompt + history + the new user message, with the
//!    agent's tool definitions
//! 2. If the model requests tool calls, executes them concurrently and feeds
//!    the results back
//! 3. Repeats until the model answers with text or the iteration cap is hit
//!
//! The whole run is bounded by a timeout.

use anyhow::Context;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Agent;
use crate::provider::types::{ChatMessage, ToolCallRequest};
use crate::provider::LlmProvider;

const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool iterations. Please review the actions taken above.";

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_iterations: u32,
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: 0.7,
            max_iterations: 10,
            timeout: Duration::from_secs(60),
        }
    }
}

/// One executed tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Text sent back to the model.
    pub result: String,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reply: String,
    /// Messages added by this run (user turn onwards), ready to append to
    /// the caller's history.
    pub messages: Vec<ChatMessage>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: u32,
    pub total_tokens: u32,
}

pub struct AgentRunner {
    agent: Agent,
    provider: Arc<dyn LlmProvider>,
    config: RunnerConfig,
}

impl AgentRunner {
    pub fn new(agent: Agent, provider: Arc<dyn LlmProvider>, config: RunnerConfig) -> Self {
        Self {
            agent,
            provider,
            config,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Answer `user_message` given the prior conversation.
    pub async fn run(&self, history: &[ChatMessage], user_message: &str) -> anyhow::Result<RunOutcome> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.run_inner(history, user_message))
            .await
            .with_context(|| format!("Agent run timed out after {}s", timeout.as_secs_f32()))?
    }

    async fn run_inner(&self, history: &[ChatMessage], user_message: &str) -> anyhow::Result<RunOutcome> {
        info!(agent = self.agent.name(), "Processing user message");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.agent.system_prompt()));
        messages.extend_from_slice(history);
        let first_new = messages.len();
        messages.push(ChatMessage::user(user_message));

        let tool_defs = self.agent.tools().definitions();
        let mut records = Vec::new();
        let mut total_tokens = 0;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            debug!(iteration = iterations, messages = messages.len(), "Calling LLM");

            let response = self
                .provider
                .chat(
                    &messages,
                    &tool_defs,
                    self.config.model.as_deref(),
                    self.config.max_tokens,
                    self.config.temperature,
                )
                .await?;
            total_tokens += response.usage.total_tokens;

            if !response.has_tool_calls() {
                let reply = response.content.unwrap_or_default();
                messages.push(ChatMessage::assistant(&reply));
                info!(iterations, tokens = total_tokens, tool_calls = records.len(), "Response complete");
                return Ok(RunOutcome {
                    reply,
                    messages: messages.split_off(first_new),
                    tool_calls: records,
                    iterations,
                    total_tokens,
                });
            }

            messages.push(ChatMessage::assistant_tool_calls(
                response.content.as_deref(),
                &response.tool_calls,
            ));

            let results = join_all(response.tool_calls.iter().map(|call| self.execute_call(call))).await;
            for record in results {
                messages.push(ChatMessage::tool_result(&record.id, &record.name, &record.result));
                records.push(record);
            }
        }

        warn!(iterations, "Hit max tool iterations, forcing stop");
        messages.push(ChatMessage::assistant(MAX_ITERATIONS_REPLY));
        Ok(RunOutcome {
            reply: MAX_ITERATIONS_REPLY.into(),
            messages: messages.split_off(first_new),
            tool_calls: records,
            iterations,
            total_tokens,
        })
    }

    async fn execute_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        debug!(tool = %call.name, id = %call.id, "Executing tool call");

        let (result, success) = match self
            .agent
            .tools()
            .invoke(&call.name, call.arguments.clone())
            .await
        {
            Ok(output) => (output.to_json().to_string(), output.is_success()),
            Err(e) => (format!("Error: {}", e), false),
        };

        debug!(tool = %call.name, success, result_len = result.len(), "Tool call complete");

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::create_minimal_agent;
    use crate::provider::types::{LlmResponse, ToolDefinition, Usage};
    use crate::tools::Presets;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records what it was sent.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<LlmResponse>>,
        seen: Mutex<Vec<(Vec<ChatMessage>, usize)>>,
        delay: Duration,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<LlmResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            tools: &[ToolDefinition],
            _model: Option<&str>,
            _max_tokens: u32,
            _temperature: f32,
        ) -> anyhow::Result<LlmResponse> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.seen.lock().unwrap().push((messages.to_vec(), tools.len()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }

        fn default_model(&self) -> &str {
            "scripted"
        }
    }

    fn text(content: &str) -> LlmResponse {
        LlmResponse {
            content: Some(content.into()),
            finish_reason: "stop".into(),
            usage: Usage {
                total_tokens: 7,
                ..Usage::default()
            },
            ..LlmResponse::default()
        }
    }

    fn calls(calls: &[(&str, &str, Value)]) -> LlmResponse {
        LlmResponse {
            tool_calls: calls
                .iter()
                .map(|(id, name, args)| ToolCallRequest {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: args.clone(),
                })
                .collect(),
            finish_reason: "tool_calls".into(),
            ..LlmResponse::default()
        }
    }

    fn agent() -> Agent {
        create_minimal_agent(&Presets::demo(), "Wally", None)
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("Hello!")]));
        let runner = AgentRunner::new(agent(), provider.clone(), RunnerConfig::default());

        let outcome = runner.run(&[], "hi").await.unwrap();
        assert_eq!(outcome.reply, "Hello!");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.total_tokens, 7);
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[0].role, "user");

        let seen = provider.seen.lock().unwrap();
        let (sent, tool_count) = &seen[0];
        assert_eq!(sent[0].role, "system");
        assert!(sent[0].content_as_str().unwrap().starts_with("Your name is Wally."));
        assert_eq!(*tool_count, 4);
    }

    #[tokio::test]
    async fn test_tool_calls_feed_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            calls(&[
                ("c1", "checkBalance", json!({})),
                ("c2", "sendCSPR", json!({"recipientPublicKey": "03bad", "amountCSPR": 1})),
                ("c3", "swapTokens", json!({"tokenIn": "CSPR", "tokenOut": "USDC", "amountIn": "1"})),
                ("c4", "sendCSPR", json!({"recipientPublicKey": "01ab"})),
            ]),
            text("Done."),
        ]));
        let runner = AgentRunner::new(agent(), provider.clone(), RunnerConfig::default());

        let history = vec![ChatMessage::user("earlier"), ChatMessage::assistant("ok")];
        let outcome = runner.run(&history, "check things").await.unwrap();
        assert_eq!(outcome.reply, "Done.");
        assert_eq!(outcome.iterations, 2);

        let records = &outcome.tool_calls;
        assert_eq!(records.len(), 4);
        assert!(records[0].success);
        assert!(records[0].result.contains("\"balanceCSPR\""));
        // Domain failure: rendered result with success=false.
        assert!(!records[1].success);
        assert!(records[1].result.contains("Invalid public key format"));
        // Not part of the minimal tool set.
        assert_eq!(records[2].result, "Error: Tool 'swapTokens' not found");
        // Schema violation.
        assert!(records[3].result.starts_with("Error: Invalid arguments for 'sendCSPR'"));

        // user, assistant(tool calls), 4 tool results, final assistant
        assert_eq!(outcome.messages.len(), 7);
        let seen = provider.seen.lock().unwrap();
        let (second_request, _) = &seen[1];
        assert_eq!(second_request.len(), 1 + history.len() + 6);
        assert_eq!(second_request.last().unwrap().tool_call_id.as_deref(), Some("c4"));
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            calls(&[("c1", "getWalletAddress", json!({}))]),
            calls(&[("c2", "getWalletAddress", json!({}))]),
        ]));
        let config = RunnerConfig {
            max_iterations: 2,
            ..RunnerConfig::default()
        };
        let runner = AgentRunner::new(agent(), provider, config);
        let outcome = runner.run(&[], "loop").await.unwrap();
        assert_eq!(outcome.reply, MAX_ITERATIONS_REPLY);
        assert_eq!(outcome.tool_calls.len(), 2);
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut provider = ScriptedProvider::new(vec![text("too late")]);
        provider.delay = Duration::from_secs(5);
        let config = RunnerConfig {
            timeout: Duration::from_millis(50),
            ..RunnerConfig::default()
        };
        let runner = AgentRunner::new(agent(), Arc::new(provider), config);
        let err = runner.run(&[], "hi").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
