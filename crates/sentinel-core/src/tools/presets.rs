//! Built-in tool groups.
//!
//! Four base groups (wallet, transfer, dex, staking) and two derived ones:
//! `defi` is the union of all four, `minimal` is wallet + transfer.
//! Derived groups share the base groups' tool instances.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::dex::{
    GetDexPoolInfoTool, GetSwapQuoteTool, GetTokenBalancesTool, ListDexPoolsTool, SwapTokensTool,
};
use super::staking::ListValidatorsTool;
use super::transfer::SendCsprTool;
use super::wallet::{CheckBalanceTool, CheckRecipientBalanceTool, GetWalletAddressTool};
use super::{Tool, ToolSet};
use crate::casper::dex::SimulatedDex;
use crate::casper::mock::DemoBackend;
use crate::casper::{ChainBackend, Explorer};

const WALLET_TOOLS: &[&str] = &["getWalletAddress", "checkBalance", "checkRecipientBalance"];
const TRANSFER_TOOLS: &[&str] = &["sendCSPR"];
const DEX_TOOLS: &[&str] = &[
    "listDexPools",
    "getDexPoolInfo",
    "getTokenBalances",
    "getSwapQuote",
    "swapTokens",
];
const STAKING_TOOLS: &[&str] = &["listValidators"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Wallet,
    Transfer,
    Dex,
    Staking,
    Defi,
    Minimal,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Wallet,
        Preset::Transfer,
        Preset::Dex,
        Preset::Staking,
        Preset::Defi,
        Preset::Minimal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Wallet => "wallet",
            Preset::Transfer => "transfer",
            Preset::Dex => "dex",
            Preset::Staking => "staking",
            Preset::Defi => "defi",
            Preset::Minimal => "minimal",
        }
    }

    /// Base groups this preset is built from. A base group is its own
    /// single component.
    pub fn components(self) -> &'static [Preset] {
        match self {
            Preset::Wallet => &[Preset::Wallet],
            Preset::Transfer => &[Preset::Transfer],
            Preset::Dex => &[Preset::Dex],
            Preset::Staking => &[Preset::Staking],
            Preset::Defi => &[Preset::Wallet, Preset::Transfer, Preset::Dex, Preset::Staking],
            Preset::Minimal => &[Preset::Wallet, Preset::Transfer],
        }
    }

    /// Tool names in this preset, in group order.
    pub fn tool_names(self) -> Vec<&'static str> {
        self.components()
            .iter()
            .flat_map(|c| {
                let names: &[&str] = match c {
                    Preset::Wallet => WALLET_TOOLS,
                    Preset::Transfer => TRANSFER_TOOLS,
                    Preset::Dex => DEX_TOOLS,
                    Preset::Staking => STAKING_TOOLS,
                    Preset::Defi | Preset::Minimal => &[],
                };
                names
            })
            .copied()
            .collect()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Preset::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown preset '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Everything a tool needs from the outside world.
#[derive(Clone)]
pub struct ToolContext {
    pub chain: Arc<dyn ChainBackend>,
    pub dex: Arc<SimulatedDex>,
    pub explorer: Explorer,
}

impl ToolContext {
    pub fn new(chain: Arc<dyn ChainBackend>, dex: Arc<SimulatedDex>, explorer: Explorer) -> Self {
        Self {
            chain,
            dex,
            explorer,
        }
    }

    /// `chain` with an instant DEX and testnet explorer links.
    pub fn with_chain(chain: Arc<dyn ChainBackend>) -> Self {
        Self::new(chain, Arc::new(SimulatedDex::instant()), Explorer::testnet())
    }

    /// Fully simulated context: demo wallet, instant DEX.
    pub fn demo() -> Self {
        Self::with_chain(Arc::new(DemoBackend::new()))
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("mode", &self.chain.mode())
            .field("explorer", &self.explorer)
            .finish_non_exhaustive()
    }
}

/// The built-in groups, instantiated once against a [`ToolContext`].
#[derive(Debug, Clone)]
pub struct Presets {
    wallet: ToolSet,
    transfer: ToolSet,
    dex: ToolSet,
    staking: ToolSet,
}

impl Presets {
    pub fn new(ctx: ToolContext) -> Self {
        let wallet: Vec<Arc<dyn Tool>> = vec![
            Arc::new(GetWalletAddressTool::new(ctx.clone())),
            Arc::new(CheckBalanceTool::new(ctx.clone())),
            Arc::new(CheckRecipientBalanceTool::new(ctx.clone())),
        ];
        let transfer: Vec<Arc<dyn Tool>> = vec![Arc::new(SendCsprTool::new(ctx.clone()))];
        let dex: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ListDexPoolsTool::new(ctx.clone())),
            Arc::new(GetDexPoolInfoTool::new(ctx.clone())),
            Arc::new(GetTokenBalancesTool::new(ctx.clone())),
            Arc::new(GetSwapQuoteTool::new(ctx.clone())),
            Arc::new(SwapTokensTool::new(ctx.clone())),
        ];
        let staking: Vec<Arc<dyn Tool>> = vec![Arc::new(ListValidatorsTool::new(ctx))];

        Self {
            wallet: wallet.into_iter().collect(),
            transfer: transfer.into_iter().collect(),
            dex: dex.into_iter().collect(),
            staking: staking.into_iter().collect(),
        }
    }

    /// Presets over the fully simulated [`ToolContext::demo`].
    pub fn demo() -> Self {
        Self::new(ToolContext::demo())
    }

    /// The tool set for `preset`.
    pub fn group(&self, preset: Preset) -> ToolSet {
        let mut set = ToolSet::new();
        for component in preset.components() {
            let base = match component {
                Preset::Wallet => &self.wallet,
                Preset::Transfer => &self.transfer,
                Preset::Dex => &self.dex,
                Preset::Staking => &self.staking,
                Preset::Defi | Preset::Minimal => continue,
            };
            set.merge(base);
        }
        set
    }

    pub fn wallet(&self) -> ToolSet {
        self.group(Preset::Wallet)
    }

    pub fn transfer(&self) -> ToolSet {
        self.group(Preset::Transfer)
    }

    pub fn dex(&self) -> ToolSet {
        self.group(Preset::Dex)
    }

    pub fn staking(&self) -> ToolSet {
        self.group(Preset::Staking)
    }

    pub fn defi(&self) -> ToolSet {
        self.group(Preset::Defi)
    }

    pub fn minimal(&self) -> ToolSet {
        self.group(Preset::Minimal)
    }
}

/// Names of every built-in tool (the `defi` group).
pub fn get_available_tools() -> Vec<&'static str> {
    Preset::Defi.tool_names()
}
