//! Wallet tools: address, own balance, and any account's balance.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::output::{Balance, RecipientBalance, WalletAddress};
use super::{no_parameters, parse_args, Tool, ToolContext, ToolError, ToolOutput};
use crate::casper::FAUCET_URL;

const DEMO_WALLET_NOTE: &str = "Demo mode - using simulated wallet";
const DEMO_BALANCE_NOTE: &str = "Demo mode - simulated balance";

/// `getWalletAddress`: the agent wallet's public key and account hash.
pub struct GetWalletAddressTool {
    ctx: ToolContext,
}

impl GetWalletAddressTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetWalletAddressTool {
    fn name(&self) -> &str {
        "getWalletAddress"
    }

    fn description(&self) -> &str {
        "Get the public key and account hash of the wallet. Use this when users ask for wallet address or want to receive funds."
    }

    fn parameters(&self) -> Value {
        no_parameters()
    }

    async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
        let info = self
            .ctx
            .chain
            .wallet_info()
            .await
            .map_err(anyhow::Error::from)?;

        Ok(ToolOutput::WalletAddress(WalletAddress {
            explorer_url: self.ctx.explorer.account(&info.public_key),
            public_key: info.public_key,
            account_hash: info.account_hash,
            faucet_url: FAUCET_URL.into(),
            note: self.ctx.chain.is_demo().then(|| DEMO_WALLET_NOTE.into()),
        }))
    }
}

/// `checkBalance`: CSPR balance of the agent wallet.
pub struct CheckBalanceTool {
    ctx: ToolContext,
}

impl CheckBalanceTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CheckBalanceTool {
    fn name(&self) -> &str {
        "checkBalance"
    }

    fn description(&self) -> &str {
        "Check the current CSPR balance of the wallet. Use this to see how much CSPR is available."
    }

    fn parameters(&self) -> Value {
        no_parameters()
    }

    async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolError> {
        let chain = &self.ctx.chain;
        let info = chain.wallet_info().await.map_err(anyhow::Error::from)?;
        let balance = chain
            .account_balance(&info.public_key)
            .await
            .map_err(anyhow::Error::from)?;

        Ok(ToolOutput::Balance(Balance {
            explorer_url: self.ctx.explorer.account(&info.public_key),
            public_key: info.public_key,
            balance_motes: balance.balance_motes,
            balance_cspr: balance.balance_cspr,
            note: chain.is_demo().then(|| DEMO_BALANCE_NOTE.into()),
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipientArgs {
    public_key: String,
}

/// `checkRecipientBalance`: balance of any account, used to check a
/// recipient exists before sending.
pub struct CheckRecipientBalanceTool {
    ctx: ToolContext,
}

impl CheckRecipientBalanceTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CheckRecipientBalanceTool {
    fn name(&self) -> &str {
        "checkRecipientBalance"
    }

    fn description(&self) -> &str {
        "Check the balance of any Casper wallet by public key. Use this to verify an address exists before sending."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "publicKey": {
                    "type": "string",
                    "description": "The public key to check (hex string)"
                }
            },
            "required": ["publicKey"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let RecipientArgs { public_key } = parse_args(self.name(), args)?;
        let chain = &self.ctx.chain;

        match chain.account_balance(&public_key).await {
            Ok(balance) => {
                // Every demo account "exists"; live accounts exist once funded.
                let exists = chain.is_demo() || balance.balance_motes != "0";
                Ok(ToolOutput::RecipientBalance(RecipientBalance {
                    explorer_url: Some(self.ctx.explorer.account(&public_key)),
                    public_key,
                    balance_motes: Some(balance.balance_motes),
                    balance_cspr: Some(balance.balance_cspr),
                    exists,
                    error: None,
                    note: chain.is_demo().then(|| DEMO_BALANCE_NOTE.into()),
                }))
            }
            Err(e) => {
                debug!(public_key = %public_key, error = %e, "Recipient balance lookup failed");
                Ok(ToolOutput::RecipientBalance(RecipientBalance {
                    public_key,
                    balance_motes: None,
                    balance_cspr: None,
                    exists: false,
                    explorer_url: None,
                    error: Some(
                        "Could not find account. It may not exist yet or the public key is invalid."
                            .into(),
                    ),
                    note: None,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casper::mock::{DemoBackend, MOCK_ACCOUNT_HASH, MOCK_PUBLIC_KEY};
    use crate::casper::{
        AccountBalance, ChainBackend, ChainError, ChainMode, TransferReceipt, TransferRequest,
        ValidatorInfo, WalletInfo,
    };
    use std::sync::Arc;

    /// Live-mode backend with canned balances.
    struct FixedBackend {
        balance: Option<&'static str>,
    }

    #[async_trait]
    impl ChainBackend for FixedBackend {
        fn mode(&self) -> ChainMode {
            ChainMode::Live
        }
        async fn wallet_info(&self) -> Result<WalletInfo, ChainError> {
            Ok(WalletInfo {
                public_key: "01ff".into(),
                account_hash: "account-hash-ff".into(),
            })
        }
        async fn account_balance(&self, _public_key: &str) -> Result<AccountBalance, ChainError> {
            self.balance
                .map(AccountBalance::from_motes)
                .ok_or_else(|| ChainError::Rpc("ValueNotFound".into()))
        }
        async fn transfer(&self, _request: &TransferRequest) -> Result<TransferReceipt, ChainError> {
            Err(ChainError::Unsupported("no".into()))
        }
        async fn validators(&self, _limit: usize) -> Result<Vec<ValidatorInfo>, ChainError> {
            Ok(Vec::new())
        }
    }

    fn live_ctx(balance: Option<&'static str>) -> ToolContext {
        ToolContext::with_chain(Arc::new(FixedBackend { balance }))
    }

    #[tokio::test]
    async fn test_wallet_address_demo() {
        let tool = GetWalletAddressTool::new(ToolContext::with_chain(Arc::new(DemoBackend::new())));
        let json = tool.execute(json!({})).await.unwrap().to_json();
        assert_eq!(json["publicKey"], MOCK_PUBLIC_KEY);
        assert_eq!(json["accountHash"], MOCK_ACCOUNT_HASH);
        assert_eq!(json["faucetUrl"], FAUCET_URL);
        assert_eq!(
            json["explorerUrl"],
            format!("https://testnet.cspr.live/account/{}", MOCK_PUBLIC_KEY)
        );
        assert_eq!(json["note"], DEMO_WALLET_NOTE);
    }

    #[tokio::test]
    async fn test_check_balance_live() {
        let tool = CheckBalanceTool::new(live_ctx(Some("12500000000")));
        let json = tool.execute(json!({})).await.unwrap().to_json();
        assert_eq!(json["balanceCSPR"], "12.5000");
        assert_eq!(json["publicKey"], "01ff");
        assert!(json.get("note").is_none());
    }

    #[tokio::test]
    async fn test_recipient_zero_balance_does_not_exist() {
        let tool = CheckRecipientBalanceTool::new(live_ctx(Some("0")));
        let json = tool.execute(json!({"publicKey": "01aa"})).await.unwrap().to_json();
        assert_eq!(json["exists"], false);
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_recipient_lookup_failure() {
        let tool = CheckRecipientBalanceTool::new(live_ctx(None));
        let json = tool.execute(json!({"publicKey": "01aa"})).await.unwrap().to_json();
        assert_eq!(json["exists"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Could not find account"));
    }
}
