//! `sendCSPR`: native CSPR transfer from the agent wallet.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::output::Transfer;
use super::{parse_args, Tool, ToolContext, ToolError, ToolOutput};
use crate::casper::{
    cspr_to_motes, is_valid_public_key_prefix, ChainError, TransferRequest, TRANSFER_GAS_CSPR,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendArgs {
    recipient_public_key: String,
    #[serde(rename = "amountCSPR")]
    amount_cspr: f64,
}

pub struct SendCsprTool {
    ctx: ToolContext,
}

impl SendCsprTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SendCsprTool {
    fn name(&self) -> &str {
        "sendCSPR"
    }

    fn description(&self) -> &str {
        "Send CSPR tokens to another wallet address. Requires the recipient's public key and amount in CSPR."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "recipientPublicKey": {
                    "type": "string",
                    "description": "The recipient's public key (hex string starting with 01 or 02)"
                },
                "amountCSPR": {
                    "type": "number",
                    "exclusiveMinimum": 0,
                    "description": "Amount of CSPR to send (e.g., 10 for 10 CSPR)"
                }
            },
            "required": ["recipientPublicKey", "amountCSPR"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let SendArgs {
            recipient_public_key,
            amount_cspr,
        } = parse_args(self.name(), args)?;

        if !is_valid_public_key_prefix(&recipient_public_key) {
            return Ok(ToolOutput::failure(
                "Invalid public key format. Must start with 01 (Ed25519) or 02 (Secp256k1)",
            ));
        }

        let Some(amount_motes) = cspr_to_motes(amount_cspr) else {
            return Ok(ToolOutput::failure(format!(
                "Amount too large: {} CSPR cannot be expressed in motes",
                amount_cspr
            )));
        };

        let chain = &self.ctx.chain;
        let demo = chain.is_demo();

        if !demo {
            let wallet = chain.wallet_info().await.map_err(anyhow::Error::from)?;
            let balance = chain
                .account_balance(&wallet.public_key)
                .await
                .map_err(anyhow::Error::from)?;
            let available = balance.cspr();
            let needed = amount_cspr + TRANSFER_GAS_CSPR;
            if available < needed {
                return Ok(ToolOutput::failure(format!(
                    "Insufficient balance. Have {} CSPR, need {} CSPR (including gas)",
                    available, needed
                )));
            }
        }

        let request = TransferRequest {
            recipient_public_key: recipient_public_key.clone(),
            amount_motes: amount_motes.clone(),
        };

        let receipt = match chain.transfer(&request).await {
            Ok(receipt) => receipt,
            Err(ChainError::Unsupported(msg)) => return Ok(ToolOutput::failure(msg)),
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };

        info!(
            recipient = %recipient_public_key,
            motes = %amount_motes,
            tx = %receipt.transaction_hash,
            demo,
            "CSPR transfer submitted"
        );

        let (message, note) = if demo {
            (
                format!("Successfully sent {} CSPR (Demo)", amount_cspr),
                Some("Demo mode - simulated transfer".to_string()),
            )
        } else {
            (format!("Successfully sent {} CSPR", amount_cspr), None)
        };

        Ok(ToolOutput::Transfer(Transfer {
            message,
            explorer_url: self.ctx.explorer.deploy(&receipt.transaction_hash),
            transaction_hash: receipt.transaction_hash,
            recipient: recipient_public_key,
            amount_cspr,
            amount_motes,
            note,
        }))
    }
}
