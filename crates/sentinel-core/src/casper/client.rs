//! Live Casper backend over the node's JSON-RPC API.
//!
//! ## Architecture
//!
//! [`CasperRpc`] handles the JSON-RPC 2.0 envelope:
//! - HTTP client reuse (one `reqwest::Client` per backend)
//! - HTTP status and `error` object checks
//! - Consistent error mapping into [`ChainError`]
//!
//! [`RpcBackend`] maps the read-only calls the tools need onto it. Building
//! and signing native transfer deploys is not implemented here, so live
//! transfers report [`ChainError::Unsupported`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::wallet::WalletHandle;
use super::{
    AccountBalance, ChainBackend, ChainError, ChainMode, TransferReceipt, TransferRequest,
    ValidatorInfo, WalletInfo,
};

/// Thin JSON-RPC client for a Casper node.
pub struct CasperRpc {
    client: Client,
    node_url: String,
}

impl CasperRpc {
    pub fn new(client: Client, node_url: &str) -> Self {
        Self {
            client,
            node_url: node_url.to_string(),
        }
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// Execute a JSON-RPC call and return its `result` member.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!(method, node = %self.node_url, "Casper RPC call");

        let resp = self
            .client
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ChainError::Network(format!(
                "node returned HTTP {}",
                resp.status()
            )));
        }

        let mut data: Value = resp
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        if let Some(err) = data.get("error") {
            let msg = err["message"].as_str().unwrap_or("unknown RPC error");
            return Err(ChainError::Rpc(msg.to_string()));
        }

        match data.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(ChainError::Decode("response has no result".into())),
        }
    }

    /// Balance of the main purse owned by `public_key`, in motes.
    pub async fn query_balance(&self, public_key: &str) -> Result<String, ChainError> {
        let result = self
            .call(
                "query_balance",
                json!({ "purse_identifier": { "main_purse_under_public_key": public_key } }),
            )
            .await?;
        parse_balance(&result)
    }

    /// Account hash (`account-hash-…`) for `public_key`.
    pub async fn account_hash(&self, public_key: &str) -> Result<String, ChainError> {
        let result = self
            .call("state_get_account_info", json!({ "public_key": public_key }))
            .await?;
        result["account"]["account_hash"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode("account info has no account_hash".into()))
    }

    /// Current validator bids from the auction contract.
    pub async fn auction_bids(&self, limit: usize) -> Result<Vec<ValidatorInfo>, ChainError> {
        let result = self.call("state_get_auction_info", json!([])).await?;
        Ok(parse_bids(&result, limit))
    }
}

fn parse_balance(result: &Value) -> Result<String, ChainError> {
    match &result["balance"] {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ChainError::Decode("balance missing from query_balance result".into())),
    }
}

/// Extract validator entries, skipping malformed bids.
fn parse_bids(result: &Value, limit: usize) -> Vec<ValidatorInfo> {
    let Some(bids) = result["auction_state"]["bids"].as_array() else {
        return Vec::new();
    };

    bids.iter()
        .filter_map(|entry| {
            let public_key = entry["public_key"].as_str()?;
            let bid = &entry["bid"];
            Some(ValidatorInfo {
                public_key: public_key.to_string(),
                delegation_rate: bid["delegation_rate"].as_u64().unwrap_or(0).min(100) as u8,
                total_stake_motes: bid["staked_amount"].as_str().unwrap_or("0").to_string(),
                is_active: !bid["inactive"].as_bool().unwrap_or(false),
            })
        })
        .take(limit)
        .collect()
}

/// [`ChainBackend`] backed by a Casper node and the configured wallet key.
pub struct RpcBackend {
    rpc: CasperRpc,
    wallet: Arc<WalletHandle>,
    chain_name: String,
}

impl RpcBackend {
    pub fn new(client: Client, node_url: &str, chain_name: &str, wallet: Arc<WalletHandle>) -> Self {
        Self {
            rpc: CasperRpc::new(client, node_url),
            wallet,
            chain_name: chain_name.to_string(),
        }
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }
}

#[async_trait]
impl ChainBackend for RpcBackend {
    fn mode(&self) -> ChainMode {
        ChainMode::Live
    }

    async fn wallet_info(&self) -> Result<WalletInfo, ChainError> {
        let public_key = self.wallet.get().await?.public_key_hex();
        let account_hash = self.rpc.account_hash(&public_key).await?;
        Ok(WalletInfo {
            public_key,
            account_hash,
        })
    }

    async fn account_balance(&self, public_key: &str) -> Result<AccountBalance, ChainError> {
        let motes = self.rpc.query_balance(public_key).await?;
        Ok(AccountBalance::from_motes(&motes))
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, ChainError> {
        debug!(
            recipient = %request.recipient_public_key,
            motes = %request.amount_motes,
            chain = %self.chain_name,
            "Live transfer requested"
        );
        Err(ChainError::Unsupported(format!(
            "Native transfers on {} need a signed deploy, which this node client does not build. \
             Submit the transfer from a Casper wallet instead.",
            self.chain_name
        )))
    }

    async fn validators(&self, limit: usize) -> Result<Vec<ValidatorInfo>, ChainError> {
        self.rpc.auction_bids(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance(&json!({"balance": "42"})).unwrap(), "42");
        assert_eq!(parse_balance(&json!({"balance": 7})).unwrap(), "7");
        assert!(parse_balance(&json!({})).is_err());
    }

    #[test]
    fn test_parse_bids_skips_malformed_and_limits() {
        let result = json!({
            "auction_state": {
                "bids": [
                    {"public_key": "01aa", "bid": {"delegation_rate": 10, "staked_amount": "500", "inactive": false}},
                    {"bid": {"delegation_rate": 3}},
                    {"public_key": "02bb", "bid": {"delegation_rate": 5, "staked_amount": "900", "inactive": true}},
                    {"public_key": "01cc", "bid": {}}
                ]
            }
        });
        let bids = parse_bids(&result, 2);
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].public_key, "01aa");
        assert!(bids[0].is_active);
        assert_eq!(bids[1].public_key, "02bb");
        assert!(!bids[1].is_active);

        assert!(parse_bids(&json!({}), 10).is_empty());
    }

    #[tokio::test]
    async fn test_live_transfer_is_unsupported() {
        let backend = RpcBackend::new(
            Client::new(),
            "http://127.0.0.1:1/rpc",
            "casper-test",
            Arc::new(WalletHandle::new("00")),
        );
        let err = backend
            .transfer(&TransferRequest {
                recipient_public_key: "01ab".into(),
                amount_motes: "1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Unsupported(_)));
        assert_eq!(backend.mode(), ChainMode::Live);
    }
}
