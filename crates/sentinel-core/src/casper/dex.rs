//! Simulated DEX.
//!
//! A fixed book of pools with fee-adjusted pricing, per-wallet token
//! balances and swaps that occasionally fail. Calls sleep for a short,
//! realistic delay unless latency is disabled.

use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::mock::simulated_hash;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub contract_hash: &'static str,
    pub decimals: u8,
}

const CSPR: TokenInfo = TokenInfo { symbol: "CSPR", name: "Casper", contract_hash: "native", decimals: 9 };
const USDC: TokenInfo = TokenInfo { symbol: "USDC", name: "USD Coin", contract_hash: "hash-usdc", decimals: 6 };
const USDT: TokenInfo = TokenInfo { symbol: "USDT", name: "Tether USD", contract_hash: "hash-usdt", decimals: 6 };
const WETH: TokenInfo = TokenInfo { symbol: "WETH", name: "Wrapped Ether", contract_hash: "hash-weth", decimals: 18 };

#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub id: &'static str,
    pub token_x: TokenInfo,
    pub token_y: TokenInfo,
    pub fee_tier: &'static str,
    pub fee_percent: f64,
    /// Raw liquidity in base units of token X.
    pub liquidity: f64,
    pub liquidity_usd: &'static str,
    /// Units of token Y per unit of token X.
    pub price: f64,
    pub price_usd: &'static str,
    pub volume_24h: &'static str,
    pub tvl: &'static str,
    pub is_active: bool,
}

impl Pool {
    pub fn pair(&self) -> String {
        format!("{}/{}", self.token_x.symbol, self.token_y.symbol)
    }

    fn matches(&self, a: &str, b: &str) -> bool {
        let (x, y) = (self.token_x.symbol, self.token_y.symbol);
        (x.eq_ignore_ascii_case(a) && y.eq_ignore_ascii_case(b))
            || (x.eq_ignore_ascii_case(b) && y.eq_ignore_ascii_case(a))
    }
}

fn pools() -> Vec<Pool> {
    vec![
        Pool {
            id: "cspr-usdc-0.3",
            token_x: CSPR,
            token_y: USDC,
            fee_tier: "0.3%",
            fee_percent: 0.3,
            liquidity: 2_500_000_000_000_000.0,
            liquidity_usd: "$125,000",
            price: 0.05,
            price_usd: "$0.05",
            volume_24h: "$45,230",
            tvl: "$125,000",
            is_active: true,
        },
        Pool {
            id: "cspr-usdt-0.3",
            token_x: CSPR,
            token_y: USDT,
            fee_tier: "0.3%",
            fee_percent: 0.3,
            liquidity: 1_800_000_000_000_000.0,
            liquidity_usd: "$90,000",
            price: 0.05,
            price_usd: "$0.05",
            volume_24h: "$32,100",
            tvl: "$90,000",
            is_active: true,
        },
        Pool {
            id: "usdc-usdt-0.05",
            token_x: USDC,
            token_y: USDT,
            fee_tier: "0.05%",
            fee_percent: 0.05,
            liquidity: 5_000_000_000_000.0,
            liquidity_usd: "$500,000",
            price: 1.0001,
            price_usd: "$1.00",
            volume_24h: "$120,500",
            tvl: "$500,000",
            is_active: true,
        },
        Pool {
            id: "cspr-weth-0.3",
            token_x: CSPR,
            token_y: WETH,
            fee_tier: "0.3%",
            fee_percent: 0.3,
            liquidity: 800_000_000_000_000.0,
            liquidity_usd: "$40,000",
            price: 0.000025,
            price_usd: "$0.05",
            volume_24h: "$8,750",
            tvl: "$40,000",
            is_active: true,
        },
    ]
}

pub fn supported_tokens() -> Vec<TokenInfo> {
    vec![CSPR, USDC, USDT, WETH]
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    pub symbol: &'static str,
    pub name: &'static str,
    pub contract_hash: &'static str,
    pub decimals: u8,
    /// Raw balance in base units.
    pub balance: String,
    pub balance_formatted: String,
    pub value_usd: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub price_impact: String,
    pub fee: String,
    pub route: Vec<String>,
    pub minimum_received: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapFill {
    pub transaction_hash: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub price_impact: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SwapError {
    #[error("No pool found for {token_in}/{token_out} pair")]
    NoPool { token_in: String, token_out: String },
    #[error("Invalid amount: '{0}' is not a positive number")]
    InvalidAmount(String),
    #[error("Transaction failed: Slippage tolerance exceeded")]
    SlippageExceeded,
}

/// Per-call delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DexLatency {
    pub list_pools: Duration,
    pub pool_info: Duration,
    pub balances: Duration,
    pub quote: Duration,
    pub swap: Duration,
}

impl DexLatency {
    pub fn none() -> Self {
        Self {
            list_pools: Duration::ZERO,
            pool_info: Duration::ZERO,
            balances: Duration::ZERO,
            quote: Duration::ZERO,
            swap: Duration::ZERO,
        }
    }
}

impl Default for DexLatency {
    fn default() -> Self {
        Self {
            list_pools: Duration::from_millis(500),
            pool_info: Duration::from_millis(300),
            balances: Duration::from_millis(400),
            quote: Duration::from_millis(300),
            swap: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedDex {
    latency: DexLatency,
    failure_rate: f64,
}

impl Default for SimulatedDex {
    fn default() -> Self {
        Self::new(DexLatency::default(), 0.05)
    }
}

impl SimulatedDex {
    pub fn new(latency: DexLatency, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// No delays and no random failures.
    pub fn instant() -> Self {
        Self::new(DexLatency::none(), 0.0)
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub async fn list_pools(&self, limit: Option<usize>) -> Vec<Pool> {
        self.pause(self.latency.list_pools).await;
        let active = pools().into_iter().filter(|p| p.is_active);
        match limit {
            Some(n) if n > 0 => active.take(n).collect(),
            _ => active.collect(),
        }
    }

    /// Find the pool for a pair, in either token order.
    pub async fn pool_info(&self, token_a: &str, token_b: &str) -> Option<Pool> {
        self.pause(self.latency.pool_info).await;
        find_pool(token_a, token_b)
    }

    /// Simulated balances, seeded from the last four hex digits of the key.
    pub async fn token_balances(&self, public_key: &str) -> Vec<TokenBalance> {
        self.pause(self.latency.balances).await;
        simulated_balances(public_key)
    }

    pub async fn quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
    ) -> Result<SwapQuote, SwapError> {
        self.pause(self.latency.quote).await;
        compute_quote(token_in, token_out, amount_in)
    }

    pub async fn execute_swap(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        slippage_percent: f64,
    ) -> Result<SwapFill, SwapError> {
        self.pause(self.latency.swap).await;
        let quote = compute_quote(token_in, token_out, amount_in)?;

        let transaction_hash = simulated_hash("simulated");
        if self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate) {
            debug!(token_in, token_out, slippage_percent, "Simulated swap failure");
            return Err(SwapError::SlippageExceeded);
        }

        debug!(token_in, token_out, amount_in, tx = %transaction_hash, "Simulated swap filled");
        Ok(SwapFill {
            transaction_hash,
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in: amount_in.to_string(),
            amount_out: quote.amount_out,
            price_impact: quote.price_impact,
        })
    }
}

fn find_pool(token_a: &str, token_b: &str) -> Option<Pool> {
    pools().into_iter().find(|p| p.matches(token_a, token_b))
}

fn compute_quote(token_in: &str, token_out: &str, amount_in: &str) -> Result<SwapQuote, SwapError> {
    let pool = find_pool(token_in, token_out).ok_or_else(|| SwapError::NoPool {
        token_in: token_in.to_string(),
        token_out: token_out.to_string(),
    })?;

    let amount: f64 = amount_in
        .trim()
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite() && *a > 0.0)
        .ok_or_else(|| SwapError::InvalidAmount(amount_in.to_string()))?;

    let gross_out = if pool.token_x.symbol.eq_ignore_ascii_case(token_in) {
        amount * pool.price
    } else {
        amount / pool.price
    };
    let fee = gross_out * (pool.fee_percent / 100.0);
    let amount_out = gross_out - fee;
    let price_impact = ((amount / pool.liquidity) * 100.0).min(10.0);
    let minimum_received = amount_out * 0.99;

    Ok(SwapQuote {
        token_in: token_in.to_string(),
        token_out: token_out.to_string(),
        amount_in: amount_in.to_string(),
        amount_out: format!("{:.6}", amount_out),
        price_impact: format!("{:.2}%", price_impact),
        fee: format!("{:.6} {}", fee, token_out),
        route: vec![token_in.to_string(), token_out.to_string()],
        minimum_received: format!("{:.6}", minimum_received),
    })
}

fn simulated_balances(public_key: &str) -> Vec<TokenBalance> {
    let tail_start = public_key.len().saturating_sub(4);
    let seed = public_key
        .get(tail_start..)
        .and_then(|tail| u64::from_str_radix(tail, 16).ok())
        .filter(|s| *s != 0)
        .unwrap_or(1234) as f64;

    let cspr = (seed * 1000.0 + 500.0) / 1000.0;
    let usdc = seed * 50.0 + 100.0;
    let usdt = seed * 30.0 + 50.0;

    vec![
        TokenBalance {
            symbol: CSPR.symbol,
            name: CSPR.name,
            contract_hash: CSPR.contract_hash,
            decimals: CSPR.decimals,
            balance: format!("{:.0}", ((seed * 1000.0 + 500.0) * 1e9).floor()),
            balance_formatted: format!("{:.2} CSPR", cspr),
            value_usd: format!("${:.2}", cspr * 0.05),
        },
        TokenBalance {
            symbol: USDC.symbol,
            name: USDC.name,
            contract_hash: USDC.contract_hash,
            decimals: USDC.decimals,
            balance: format!("{:.0}", (usdc * 1e6).floor()),
            balance_formatted: format!("{:.2} USDC", usdc),
            value_usd: format!("${:.2}", usdc),
        },
        TokenBalance {
            symbol: USDT.symbol,
            name: USDT.name,
            contract_hash: USDT.contract_hash,
            decimals: USDT.decimals,
            balance: format!("{:.0}", (usdt * 1e6).floor()),
            balance_formatted: format!("{:.2} USDT", usdt),
            value_usd: format!("${:.2}", usdt),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_pools_with_limit() {
        let dex = SimulatedDex::instant();
        assert_eq!(dex.list_pools(None).await.len(), 4);
        assert_eq!(dex.list_pools(Some(2)).await.len(), 2);
        assert_eq!(dex.list_pools(Some(0)).await.len(), 4);
    }

    #[tokio::test]
    async fn test_pool_lookup_either_order() {
        let dex = SimulatedDex::instant();
        let pool = dex.pool_info("usdc", "cspr").await.unwrap();
        assert_eq!(pool.pair(), "CSPR/USDC");
        assert!(dex.pool_info("WETH", "USDC").await.is_none());
    }

    #[test]
    fn test_quote_applies_fee() {
        let quote = compute_quote("CSPR", "USDC", "100").unwrap();
        // 100 * 0.05 = 5, minus 0.3% fee
        assert_eq!(quote.amount_out, "4.985000");
        assert_eq!(quote.fee, "0.015000 USDC");
        assert_eq!(quote.minimum_received, "4.935150");
        assert_eq!(quote.price_impact, "0.00%");
        assert_eq!(quote.route, vec!["CSPR", "USDC"]);
    }

    #[test]
    fn test_quote_reverse_direction() {
        let quote = compute_quote("USDC", "CSPR", "5").unwrap();
        // 5 / 0.05 = 100, minus 0.3% fee
        assert_eq!(quote.amount_out, "99.700000");
    }

    #[test]
    fn test_quote_errors() {
        assert_eq!(
            compute_quote("CSPR", "DOGE", "1").unwrap_err().to_string(),
            "No pool found for CSPR/DOGE pair"
        );
        assert!(matches!(
            compute_quote("CSPR", "USDC", "lots"),
            Err(SwapError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_price_impact_is_capped() {
        let quote = compute_quote("USDC", "USDT", "1000000000000").unwrap();
        assert_eq!(quote.price_impact, "10.00%");
    }

    #[test]
    fn test_simulated_balances_seed() {
        let balances = simulated_balances("01ab0002");
        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].balance_formatted, "2.50 CSPR");
        assert_eq!(balances[1].balance_formatted, "200.00 USDC");
        assert_eq!(balances[2].balance_formatted, "110.00 USDT");

        let fallback = simulated_balances("xyz");
        assert_eq!(fallback[1].balance_formatted, "61800.00 USDC");
    }

    #[tokio::test]
    async fn test_swap_always_fails_at_full_failure_rate() {
        let dex = SimulatedDex::new(DexLatency::none(), 1.0);
        let err = dex.execute_swap("CSPR", "USDC", "10", 1.0).await.unwrap_err();
        assert_eq!(err, SwapError::SlippageExceeded);
    }

    #[tokio::test]
    async fn test_swap_fills() {
        let dex = SimulatedDex::instant();
        let fill = dex.execute_swap("CSPR", "USDC", "100", 1.0).await.unwrap();
        assert_eq!(fill.amount_out, "4.985000");
        assert!(fill.transaction_hash.starts_with("simulated-"));
    }
}
