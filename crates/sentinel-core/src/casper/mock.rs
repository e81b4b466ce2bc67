//! Demo backend used when no wallet key is configured.
//!
//! Returns a fixed wallet, a balance that drifts a few CSPR between calls,
//! a fixed validator set and fake transfer receipts.

use async_trait::async_trait;
use rand::Rng;

use super::{
    cspr_to_motes, AccountBalance, ChainBackend, ChainError, ChainMode, TransferReceipt,
    TransferRequest, ValidatorInfo, WalletInfo,
};

pub const MOCK_PUBLIC_KEY: &str =
    "01a1b2c3d4e5f6789012345678901234567890123456789012345678901234abcd";
pub const MOCK_ACCOUNT_HASH: &str =
    "account-hash-0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

const MOCK_BASE_BALANCE_CSPR: f64 = 2547.8234;

/// Maximum drift either side of the base balance.
const MOCK_BALANCE_JITTER_CSPR: f64 = 5.0;

/// (public key, delegation rate %, total stake in motes)
const MOCK_VALIDATORS: &[(&str, u8, &str)] = &[
    ("01def456789abc0123456789abc0123456789abc0123456789abc0123456789abc", 10, "15000000000000000"),
    ("02abc789def0123456789def0123456789def0123456789def0123456789def012", 8, "12500000000000000"),
    ("01789abc0123456789abc0123456789abc0123456789abc0123456789abc01234", 12, "9800000000000000"),
    ("020123456789def0123456789def0123456789def0123456789def0123456789de", 5, "8200000000000000"),
    ("01456789abc0123456789abc0123456789abc0123456789abc0123456789abc012", 15, "6500000000000000"),
];

pub fn mock_wallet() -> WalletInfo {
    WalletInfo {
        public_key: MOCK_PUBLIC_KEY.into(),
        account_hash: MOCK_ACCOUNT_HASH.into(),
    }
}

/// The demo wallet's balance, jittered by up to ±5 CSPR.
pub fn mock_balance() -> AccountBalance {
    let variation = rand::thread_rng().gen_range(-MOCK_BALANCE_JITTER_CSPR..MOCK_BALANCE_JITTER_CSPR);
    let motes = cspr_to_motes(MOCK_BASE_BALANCE_CSPR + variation).unwrap_or_else(|| "0".into());
    AccountBalance::from_motes(&motes)
}

/// Balance reported for arbitrary accounts in demo mode (0–1000 CSPR).
pub fn mock_recipient_balance() -> AccountBalance {
    let cspr: f64 = rand::thread_rng().gen_range(0.0..1000.0);
    AccountBalance::from_motes(&cspr_to_motes(cspr).unwrap_or_else(|| "0".into()))
}

pub fn mock_validators() -> Vec<ValidatorInfo> {
    MOCK_VALIDATORS
        .iter()
        .map(|(public_key, rate, stake)| ValidatorInfo {
            public_key: (*public_key).into(),
            delegation_rate: *rate,
            total_stake_motes: (*stake).into(),
            is_active: true,
        })
        .collect()
}

/// `{prefix}-{hex millis}-{8 random hex}`, the shape used for every simulated hash.
pub fn simulated_hash(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}-{:x}-{:08x}", prefix, millis, suffix)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoBackend;

impl DemoBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainBackend for DemoBackend {
    fn mode(&self) -> ChainMode {
        ChainMode::Demo
    }

    async fn wallet_info(&self) -> Result<WalletInfo, ChainError> {
        Ok(mock_wallet())
    }

    async fn account_balance(&self, public_key: &str) -> Result<AccountBalance, ChainError> {
        if public_key == MOCK_PUBLIC_KEY {
            Ok(mock_balance())
        } else {
            Ok(mock_recipient_balance())
        }
    }

    async fn transfer(&self, _request: &TransferRequest) -> Result<TransferReceipt, ChainError> {
        Ok(TransferReceipt {
            transaction_hash: simulated_hash("demo-tx"),
        })
    }

    async fn validators(&self, limit: usize) -> Result<Vec<ValidatorInfo>, ChainError> {
        Ok(mock_validators().into_iter().take(limit).collect())
    }
}
