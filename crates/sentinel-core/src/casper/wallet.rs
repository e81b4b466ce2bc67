//! Agent wallet: an Ed25519 key loaded from configuration.
//!
//! [`WalletHandle`] owns the lazily-initialised wallet. The first caller
//! parses the key; concurrent first callers wait on the same
//! initialisation and everyone afterwards gets the cached wallet.

use ed25519_dalek::SigningKey;
use tokio::sync::OnceCell;
use tracing::info;

use super::ChainError;

/// Algorithm tag Casper prepends to Ed25519 public keys.
const ED25519_TAG: &str = "01";

/// Length of an Ed25519 secret key.
const SECRET_KEY_LEN: usize = 32;

pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Parse a 32-byte private key given as hex (an optional `0x` prefix is
    /// accepted).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainError> {
        let trimmed = private_key_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed)
            .map_err(|e| ChainError::InvalidKey(format!("private key is not valid hex: {}", e)))?;
        let secret: [u8; SECRET_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            ChainError::InvalidKey(format!(
                "expected a {}-byte Ed25519 private key, got {} bytes",
                SECRET_KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Public key in Casper hex form (`01` + 32-byte Ed25519 key).
    pub fn public_key_hex(&self) -> String {
        format!(
            "{}{}",
            ED25519_TAG,
            hex::encode(self.signing_key.verifying_key().to_bytes())
        )
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Lazily initialised, process-wide wallet.
pub struct WalletHandle {
    private_key: String,
    cell: OnceCell<Wallet>,
}

impl WalletHandle {
    pub fn new(private_key: &str) -> Self {
        Self {
            private_key: private_key.to_string(),
            cell: OnceCell::new(),
        }
    }

    /// Get the wallet, parsing the key on first use.
    pub async fn get(&self) -> Result<&Wallet, ChainError> {
        self.cell
            .get_or_try_init(|| async {
                let wallet = Wallet::from_hex(&self.private_key)?;
                info!(public_key = %wallet.public_key_hex(), "Wallet loaded from configuration");
                Ok(wallet)
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
