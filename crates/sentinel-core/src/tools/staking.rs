//! `listValidators`: validator set for staking decisions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::output::{ValidatorSummary, Validators};
use super::{count_from, parse_args, Tool, ToolContext, ToolError, ToolOutput};
use crate::casper::{motes_to_cspr, MIN_DELEGATION_CSPR};

const DEFAULT_LIMIT: usize = 5;

#[derive(Deserialize)]
struct ListValidatorsArgs {
    #[serde(default = "default_limit")]
    limit: f64,
}

fn default_limit() -> f64 {
    DEFAULT_LIMIT as f64
}

pub struct ListValidatorsTool {
    ctx: ToolContext,
}

impl ListValidatorsTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListValidatorsTool {
    fn name(&self) -> &str {
        "listValidators"
    }

    fn description(&self) -> &str {
        "Get a list of active validators on the Casper Network. Useful for staking information."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "number",
                    "minimum": 0,
                    "default": DEFAULT_LIMIT,
                    "description": "Number of validators to return (default 5)"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let ListValidatorsArgs { limit } = parse_args(self.name(), args)?;
        let chain = &self.ctx.chain;
        let validators = chain.validators(count_from(limit)).await.map_err(anyhow::Error::from)?;

        let validators = validators
            .into_iter()
            .map(|v| ValidatorSummary {
                public_key: v.public_key,
                delegation_rate: format!("{}%", v.delegation_rate),
                total_stake: format!("{} CSPR", motes_to_cspr(&v.total_stake_motes)),
                status: if v.is_active { "Active" } else { "Inactive" }.into(),
            })
            .collect();

        let note = if chain.is_demo() {
            format!(
                "Demo mode - simulated validators. Minimum delegation is {} CSPR.",
                MIN_DELEGATION_CSPR
            )
        } else {
            format!(
                "Minimum delegation is {} CSPR. Staking rewards are distributed every Era (~2 hours).",
                MIN_DELEGATION_CSPR
            )
        };

        Ok(ToolOutput::Validators(Validators { validators, note }))
    }
}
