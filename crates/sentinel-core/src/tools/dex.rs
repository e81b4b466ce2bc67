//! DEX tools backed by the simulated exchange.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::output::{
    Failure, PoolDetails, PoolList, PoolSummary, Swap, SwapQuote, TokenBalanceSummary,
    TokenBalances,
};
use super::{count_from, no_parameters, parse_args, Tool, ToolContext, ToolError, ToolOutput};
use crate::casper::dex::{supported_tokens, SwapError};

fn token_pair_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "tokenA": {
                "type": "string",
                "description": "First token symbol (e.g., CSPR, USDC, USDT, WETH)"
            },
            "tokenB": {
                "type": "string",
                "description": "Second token symbol (e.g., CSPR, USDC, USDT, WETH)"
            }
        },
        "required": ["tokenA", "tokenB"]
    })
}

fn swap_properties() -> serde_json::Map<String, Value> {
    let props = json!({
        "tokenIn": {
            "type": "string",
            "description": "Symbol of token to sell (e.g., CSPR, USDC)"
        },
        "tokenOut": {
            "type": "string",
            "description": "Symbol of token to buy (e.g., USDC, CSPR)"
        },
        "amountIn": {
            "type": "string",
            "description": "Amount of input token to swap (e.g., '100' for 100 tokens)"
        }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn swap_failure(err: SwapError) -> ToolOutput {
    ToolOutput::failure(err.to_string())
}

/// `listDexPools`
pub struct ListDexPoolsTool {
    ctx: ToolContext,
}

impl ListDexPoolsTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct ListPoolsArgs {
    #[serde(default)]
    limit: Option<f64>,
}

#[async_trait]
impl Tool for ListDexPoolsTool {
    fn name(&self) -> &str {
        "listDexPools"
    }

    fn description(&self) -> &str {
        "List all available trading pools on the DEX. Shows token pairs, liquidity, fees, and 24h volume."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "number",
                    "minimum": 0,
                    "description": "Maximum number of pools to return (optional)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let ListPoolsArgs { limit } = parse_args(self.name(), args)?;
        let pools = self.ctx.dex.list_pools(limit.map(count_from)).await;

        let pools: Vec<PoolSummary> = pools
            .into_iter()
            .map(|p| PoolSummary {
                id: p.id.into(),
                pair: p.pair(),
                token_x: p.token_x.symbol.into(),
                token_y: p.token_y.symbol.into(),
                fee_tier: p.fee_tier.into(),
                liquidity: p.liquidity_usd.into(),
                volume_24h: p.volume_24h.into(),
                tvl: p.tvl.into(),
                price: p.price_usd.into(),
                is_active: p.is_active,
            })
            .collect();

        Ok(ToolOutput::PoolList(PoolList {
            pool_count: pools.len(),
            pools,
            note: "Simulated DEX data for demo.".into(),
        }))
    }
}

/// `getDexPoolInfo`
pub struct GetDexPoolInfoTool {
    ctx: ToolContext,
}

impl GetDexPoolInfoTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolInfoArgs {
    token_a: String,
    token_b: String,
}

#[async_trait]
impl Tool for GetDexPoolInfoTool {
    fn name(&self) -> &str {
        "getDexPoolInfo"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific trading pool by token pair."
    }

    fn parameters(&self) -> Value {
        token_pair_schema()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let PoolInfoArgs { token_a, token_b } = parse_args(self.name(), args)?;

        let Some(pool) = self.ctx.dex.pool_info(&token_a, &token_b).await else {
            let tokens = supported_tokens()
                .into_iter()
                .map(|t| t.symbol.to_string())
                .collect();
            return Ok(ToolOutput::Failure(
                Failure::new(format!("No pool found for {}/{} pair", token_a, token_b))
                    .with_supported_tokens(tokens)
                    .with_hint("Try one of the supported token pairs like CSPR/USDC or CSPR/USDT"),
            ));
        };

        Ok(ToolOutput::PoolDetails(PoolDetails {
            pair: pool.pair(),
            token_x: pool.token_x.symbol.into(),
            token_y: pool.token_y.symbol.into(),
            fee_tier: pool.fee_tier.into(),
            price: pool.price_usd.into(),
            liquidity: pool.liquidity_usd.into(),
            tvl: pool.tvl.into(),
            volume_24h: pool.volume_24h.into(),
        }))
    }
}

/// `getTokenBalances`: every token the agent wallet holds on the DEX.
pub struct GetTokenBalancesTool {
    ctx: ToolContext,
}

impl GetTokenBalancesTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetTokenBalancesTool {
    fn name(&self) -> &str {
        "getTokenBalances"
    }

    fn description(&self) -> &str {
        "Get all token balances for the wallet. Shows balances for CSPR, USDC, USDT, WETH, and other tokens."
    }

    fn parameters(&self) -> Value {
        no_parameters()
    }

    async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
        let wallet = self
            .ctx
            .chain
            .wallet_info()
            .await
            .map_err(anyhow::Error::from)?;
        let balances = self.ctx.dex.token_balances(&wallet.public_key).await;

        let total: f64 = balances
            .iter()
            .filter_map(|b| b.value_usd.trim_start_matches('$').replace(',', "").parse::<f64>().ok())
            .sum();

        let balances: Vec<TokenBalanceSummary> = balances
            .into_iter()
            .map(|b| TokenBalanceSummary {
                symbol: b.symbol.into(),
                name: b.name.into(),
                balance_formatted: b.balance_formatted,
                value_usd: b.value_usd,
            })
            .collect();

        Ok(ToolOutput::TokenBalances(TokenBalances {
            token_count: balances.len(),
            total_value_usd: format!("${:.2}", total),
            balances,
            note: "Simulated balances for demo.".into(),
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteArgs {
    token_in: String,
    token_out: String,
    amount_in: String,
}

/// `getSwapQuote`: preview a swap without executing it.
pub struct GetSwapQuoteTool {
    ctx: ToolContext,
}

impl GetSwapQuoteTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetSwapQuoteTool {
    fn name(&self) -> &str {
        "getSwapQuote"
    }

    fn description(&self) -> &str {
        "Get a quote for swapping tokens. Shows expected output, price impact, and fees before executing."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": swap_properties(),
            "required": ["tokenIn", "tokenOut", "amountIn"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let QuoteArgs {
            token_in,
            token_out,
            amount_in,
        } = parse_args(self.name(), args)?;

        let quote = match self.ctx.dex.quote(&token_in, &token_out, &amount_in).await {
            Ok(quote) => quote,
            Err(e) => return Ok(swap_failure(e)),
        };

        Ok(ToolOutput::SwapQuote(SwapQuote {
            token_in: quote.token_in,
            token_out: quote.token_out,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            price_impact: quote.price_impact,
            fee: quote.fee,
            minimum_received: quote.minimum_received,
            route: quote.route.join(" → "),
            note: "Quote preview. Execute swapTokens to complete the trade.".into(),
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapArgs {
    token_in: String,
    token_out: String,
    amount_in: String,
    #[serde(default = "default_slippage")]
    slippage_percent: f64,
}

fn default_slippage() -> f64 {
    1.0
}

/// `swapTokens`
pub struct SwapTokensTool {
    ctx: ToolContext,
}

impl SwapTokensTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SwapTokensTool {
    fn name(&self) -> &str {
        "swapTokens"
    }

    fn description(&self) -> &str {
        "Execute a token swap on the DEX. Swaps one token for another."
    }

    fn parameters(&self) -> Value {
        let mut props = swap_properties();
        props.insert(
            "slippagePercent".into(),
            json!({
                "type": "number",
                "default": 1,
                "description": "Maximum slippage tolerance in percent (default 1%)"
            }),
        );
        json!({
            "type": "object",
            "properties": props,
            "required": ["tokenIn", "tokenOut", "amountIn"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let SwapArgs {
            token_in,
            token_out,
            amount_in,
            slippage_percent,
        } = parse_args(self.name(), args)?;

        let fill = match self
            .ctx
            .dex
            .execute_swap(&token_in, &token_out, &amount_in, slippage_percent)
            .await
        {
            Ok(fill) => fill,
            Err(e) => return Ok(swap_failure(e)),
        };

        Ok(ToolOutput::Swap(Swap {
            message: format!(
                "Swapped {} {} for {} {}",
                amount_in, token_in, fill.amount_out, token_out
            ),
            explorer_url: self.ctx.explorer.deploy(&fill.transaction_hash),
            transaction_hash: fill.transaction_hash,
            token_in: fill.token_in,
            token_out: fill.token_out,
            amount_in: fill.amount_in,
            amount_out: fill.amount_out,
            price_impact: fill.price_impact,
            note: "Simulated swap for demo.".into(),
        }))
    }
}
