//! Casper Network access layer.
//!
//! Tools never talk to the network directly. They go through a
//! [`ChainBackend`], which is either the [`mock::DemoBackend`] (no key
//! configured) or the [`client::RpcBackend`] talking JSON-RPC to a node.
//! The simulated DEX lives in [`dex`].

pub mod client;
pub mod dex;
pub mod mock;
pub mod wallet;

use async_trait::async_trait;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// 1 CSPR = 1,000,000,000 motes.
pub const MOTES_PER_CSPR: u64 = 1_000_000_000;

/// Gas reserved on top of a native transfer amount.
pub const TRANSFER_GAS_CSPR: f64 = 0.1;

/// Smallest amount the auction contract accepts for a delegation.
pub const MIN_DELEGATION_CSPR: u64 = 500;

pub const DEFAULT_NODE_URL: &str = "https://rpc.testnet.casperlabs.io/rpc";
pub const DEFAULT_CHAIN_NAME: &str = "casper-test";
pub const MAINNET_CHAIN_NAME: &str = "casper";
pub const FAUCET_URL: &str = "https://testnet.cspr.live/tools/faucet";

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("network error talking to Casper node: {0}")]
    Network(String),
    #[error("Casper RPC error: {0}")]
    Rpc(String),
    #[error("failed to decode Casper RPC response: {0}")]
    Decode(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("{0}")]
    Unsupported(String),
}

/// Whether the backend returns simulated or on-chain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainMode {
    Demo,
    Live,
}

/// Public identity of the agent's wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub public_key: String,
    pub account_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub balance_motes: String,
    pub balance_cspr: String,
}

impl AccountBalance {
    pub fn from_motes(motes: &str) -> Self {
        Self {
            balance_motes: motes.to_string(),
            balance_cspr: motes_to_cspr(motes),
        }
    }

    pub fn zero() -> Self {
        Self::from_motes("0")
    }

    pub fn cspr(&self) -> f64 {
        Decimal::from_str(&self.balance_cspr)
            .ok()
            .and_then(|d| d.to_f64())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient_public_key: String,
    pub amount_motes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub public_key: String,
    pub delegation_rate: u8,
    pub total_stake_motes: String,
    pub is_active: bool,
}

/// Blockchain operations the tools depend on.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    fn mode(&self) -> ChainMode;

    fn is_demo(&self) -> bool {
        self.mode() == ChainMode::Demo
    }

    async fn wallet_info(&self) -> Result<WalletInfo, ChainError>;

    async fn account_balance(&self, public_key: &str) -> Result<AccountBalance, ChainError>;

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, ChainError>;

    async fn validators(&self, limit: usize) -> Result<Vec<ValidatorInfo>, ChainError>;
}

/// Block explorer links for the selected network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    base_url: String,
}

impl Explorer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self::new("https://testnet.cspr.live")
    }

    pub fn mainnet() -> Self {
        Self::new("https://cspr.live")
    }

    pub fn account(&self, public_key: &str) -> String {
        format!("{}/account/{}", self.base_url, public_key)
    }

    pub fn deploy(&self, hash: &str) -> String {
        format!("{}/deploy/{}", self.base_url, hash)
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::testnet()
    }
}

/// Convert motes to a CSPR string with four decimals.
///
/// Unparsable input renders as `0.0000`.
pub fn motes_to_cspr(motes: &str) -> String {
    let motes = Decimal::from_str(motes.trim()).unwrap_or(Decimal::ZERO);
    let cspr = (motes / Decimal::from(MOTES_PER_CSPR)).round_dp(4);
    format!("{:.4}", cspr)
}

/// Convert a CSPR amount to motes, rounding down to a whole mote.
///
/// Returns `None` when the amount is not finite or the mote value does not
/// fit in a `Decimal`.
pub fn cspr_to_motes(cspr: f64) -> Option<String> {
    let amount = Decimal::from_f64(cspr)?;
    let motes = amount.checked_mul(Decimal::from(MOTES_PER_CSPR))?;
    Some(motes.floor().normalize().to_string())
}

/// Casper public keys carry a one-byte algorithm tag: `01` (Ed25519) or
/// `02` (Secp256k1).
pub fn is_valid_public_key_prefix(public_key: &str) -> bool {
    public_key.starts_with("01") || public_key.starts_with("02")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motes_to_cspr() {
        assert_eq!(motes_to_cspr("1000000000"), "1.0000");
        assert_eq!(motes_to_cspr("2547823400000"), "2547.8234");
        assert_eq!(motes_to_cspr("15000000000000000"), "15000000.0000");
        assert_eq!(motes_to_cspr("0"), "0.0000");
        assert_eq!(motes_to_cspr("garbage"), "0.0000");
    }

    #[test]
    fn test_cspr_to_motes() {
        assert_eq!(cspr_to_motes(10.0).as_deref(), Some("10000000000"));
        assert_eq!(cspr_to_motes(2.5).as_deref(), Some("2500000000"));
        assert_eq!(cspr_to_motes(0.0000000019).as_deref(), Some("1"));
    }

    #[test]
    fn test_cspr_to_motes_out_of_range() {
        assert_eq!(cspr_to_motes(1e20), None);
        assert_eq!(cspr_to_motes(1e30), None);
        assert_eq!(cspr_to_motes(f64::NAN), None);
        assert_eq!(cspr_to_motes(f64::INFINITY), None);
    }

    #[test]
    fn test_public_key_prefix() {
        assert!(is_valid_public_key_prefix("01abcdef"));
        assert!(is_valid_public_key_prefix("02abcdef"));
        assert!(!is_valid_public_key_prefix("03abcdef"));
        assert!(!is_valid_public_key_prefix(""));
    }

    #[test]
    fn test_explorer_links() {
        let explorer = Explorer::testnet();
        assert_eq!(explorer.account("01ab"), "https://testnet.cspr.live/account/01ab");
        assert_eq!(Explorer::new("https://cspr.live/").deploy("ff"), "https://cspr.live/deploy/ff");
    }

    #[test]
    fn test_account_balance_cspr() {
        let balance = AccountBalance::from_motes("1500000000");
        assert_eq!(balance.balance_cspr, "1.5000");
        assert!((balance.cspr() - 1.5).abs() < f64::EPSILON);
    }
}
