//! Structured tool results.
//!
//! Each tool returns one [`ToolOutput`] variant. The model sees
//! [`ToolOutput::to_json`]: the record's camelCase fields plus a `success`
//! flag.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    pub public_key: String,
    pub account_hash: String,
    pub faucet_url: String,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub public_key: String,
    pub balance_motes: String,
    #[serde(rename = "balanceCSPR")]
    pub balance_cspr: String,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Balance of an arbitrary account. A failed lookup still produces a
/// record, with `exists: false` and an explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientBalance {
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_motes: Option<String>,
    #[serde(rename = "balanceCSPR", skip_serializing_if = "Option::is_none")]
    pub balance_cspr: Option<String>,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub message: String,
    pub transaction_hash: String,
    pub explorer_url: String,
    pub recipient: String,
    #[serde(rename = "amountCSPR")]
    pub amount_cspr: f64,
    pub amount_motes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    pub id: String,
    pub pair: String,
    pub token_x: String,
    pub token_y: String,
    pub fee_tier: String,
    pub liquidity: String,
    #[serde(rename = "volume24h")]
    pub volume_24h: String,
    pub tvl: String,
    pub price: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolList {
    pub pool_count: usize,
    pub pools: Vec<PoolSummary>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDetails {
    pub pair: String,
    pub token_x: String,
    pub token_y: String,
    pub fee_tier: String,
    pub price: String,
    pub liquidity: String,
    pub tvl: String,
    #[serde(rename = "volume24h")]
    pub volume_24h: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceSummary {
    pub symbol: String,
    pub name: String,
    pub balance_formatted: String,
    #[serde(rename = "valueUSD")]
    pub value_usd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    pub token_count: usize,
    #[serde(rename = "totalValueUSD")]
    pub total_value_usd: String,
    pub balances: Vec<TokenBalanceSummary>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub price_impact: String,
    pub fee: String,
    pub minimum_received: String,
    /// Hops joined with an arrow, e.g. `CSPR → USDC`.
    pub route: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    pub message: String,
    pub transaction_hash: String,
    pub explorer_url: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub price_impact: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSummary {
    pub public_key: String,
    pub delegation_rate: String,
    pub total_stake: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validators {
    pub validators: Vec<ValidatorSummary>,
    pub note: String,
}

/// Domain failure reported back to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            supported_tokens: None,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_supported_tokens(mut self, tokens: Vec<String>) -> Self {
        self.supported_tokens = Some(tokens);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    WalletAddress(WalletAddress),
    Balance(Balance),
    RecipientBalance(RecipientBalance),
    Transfer(Transfer),
    PoolList(PoolList),
    PoolDetails(PoolDetails),
    TokenBalances(TokenBalances),
    SwapQuote(SwapQuote),
    Swap(Swap),
    Validators(Validators),
    Failure(Failure),
    /// Free-form result from a caller-supplied tool.
    Custom(Value),
}

impl ToolOutput {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(Failure::new(error))
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Failure(_) => false,
            Self::Custom(value) => value.get("success").and_then(Value::as_bool).unwrap_or(true),
            _ => true,
        }
    }

    /// Render the result as the JSON object handed back to the model.
    pub fn to_json(&self) -> Value {
        let success = self.is_success();
        let mut value = serde_json::to_value(self)
            .unwrap_or_else(|e| json!({ "error": format!("unserializable tool output: {}", e) }));

        if !value.is_object() {
            return json!({ "success": success, "result": value });
        }
        if let Some(map) = value.as_object_mut() {
            map.entry("success").or_insert(Value::Bool(success));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_json() {
        let out = ToolOutput::Failure(
            Failure::new("No pool found for CSPR/DOGE pair")
                .with_supported_tokens(vec!["CSPR".into(), "USDC".into()])
                .with_hint("Try CSPR/USDC"),
        );
        assert!(!out.is_success());
        assert_eq!(
            out.to_json(),
            json!({
                "success": false,
                "error": "No pool found for CSPR/DOGE pair",
                "supportedTokens": ["CSPR", "USDC"],
                "hint": "Try CSPR/USDC"
            })
        );
    }

    #[test]
    fn test_record_uses_wire_names() {
        let out = ToolOutput::Balance(Balance {
            public_key: "01ab".into(),
            balance_motes: "1000000000".into(),
            balance_cspr: "1.0000".into(),
            explorer_url: "https://testnet.cspr.live/account/01ab".into(),
            note: None,
        });
        let json = out.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["balanceCSPR"], "1.0000");
        assert_eq!(json["balanceMotes"], "1000000000");
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_custom_output() {
        let out = ToolOutput::Custom(json!({"answer": 42}));
        assert!(out.is_success());
        assert_eq!(out.to_json(), json!({"answer": 42, "success": true}));

        let scalar = ToolOutput::Custom(json!("done"));
        assert_eq!(scalar.to_json(), json!({"success": true, "result": "done"}));

        let failed = ToolOutput::Custom(json!({"success": false}));
        assert!(!failed.is_success());
    }
}
