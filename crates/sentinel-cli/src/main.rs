//! sentinel CLI: chat with the Casper DeFi agent and inspect its setup.
//!
//! Usage:
//!   sentinel chat      Start an interactive chat session
//!   sentinel tools     List tools and preset membership
//!   sentinel prompt    Print a built system prompt
//!   sentinel wallet    Show the agent wallet and balance
//!   sentinel onboard   Create a default configuration
//!   sentinel status    Show current configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sentinel_core::agent::runner::AgentRunner;
use sentinel_core::agent::{create_agent, Network};
use sentinel_core::casper::mock::{mock_balance, mock_wallet};
use sentinel_core::casper::{AccountBalance, ChainBackend, WalletInfo, FAUCET_URL};
use sentinel_core::config::Config;
use sentinel_core::prompts::{build_prompt, BaseTemplate, NamedTemplate, PromptConfig};
use sentinel_core::provider::openai::OpenAiProvider;
use sentinel_core::provider::types::ChatMessage;
use sentinel_core::tools::{get_available_tools, Preset, Presets};

#[derive(Parser)]
#[command(
    name = "sentinel",
    version,
    about = "A conversational DeFi agent for the Casper Network",
    long_about = "sentinel: chat with an AI agent that manages a Casper wallet, \
                  swaps on a simulated DEX and browses validators.\n\n\
                  Runs in demo mode until a Casper private key is configured."
)]
struct Cli {
    /// Config file to use instead of ~/.sentinel/config.json
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Session label shown in the header
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,

        /// Tool presets to include (overrides the configured agent profile)
        #[arg(short, long = "preset")]
        presets: Vec<Preset>,

        /// Tool names to leave out
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Network to operate on (mainnet or testnet)
        #[arg(short, long)]
        network: Option<Network>,
    },

    /// List available tools, or the members of one preset
    Tools {
        #[arg(short, long)]
        preset: Option<Preset>,
    },

    /// Print the system prompt built from the given options
    Prompt {
        /// Base template: defi, minimal or custom
        #[arg(short, long, default_value = "defi")]
        base: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        additions: Option<String>,

        /// File whose contents replace the base template
        #[arg(short, long)]
        template_file: Option<PathBuf>,
    },

    /// Show the agent wallet address and balance
    Wallet,

    /// Create or reset the default configuration
    Onboard,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Chat {
            session,
            model,
            presets,
            exclude,
            network,
        }) => {
            cmd_chat(
                config_path,
                &session,
                model.as_deref(),
                presets,
                exclude,
                network,
            )
            .await?
        }
        Some(Commands::Tools { preset }) => cmd_tools(preset),
        Some(Commands::Prompt {
            base,
            name,
            description,
            additions,
            template_file,
        }) => cmd_prompt(&base, name, description, additions, template_file.as_deref())?,
        Some(Commands::Wallet) => cmd_wallet(config_path).await?,
        Some(Commands::Onboard) => cmd_onboard()?,
        Some(Commands::Status) => cmd_status(config_path)?,
        None => cmd_chat(config_path, "default", None, Vec::new(), Vec::new(), None).await?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if let Err(errors) = config.validate() {
        eprintln!("\n  \x1b[31m❌ Configuration errors:\x1b[0m");
        for e in &errors {
            eprintln!("     • {}", e);
        }
        eprintln!();
        anyhow::bail!("Fix the above {} error(s) in config.json", errors.len());
    }
    Ok(())
}

// ── Chat Command ────────────────────────────────────────────────────

async fn cmd_chat(
    config_path: Option<&Path>,
    session: &str,
    model_override: Option<&str>,
    presets: Vec<Preset>,
    exclude: Vec<String>,
    network: Option<Network>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(network) = network {
        config.set_network(network);
    }
    validate_config(&config)?;

    let Some((provider_name, entry)) = config.providers.find_active() else {
        anyhow::bail!(
            "No LLM provider configured with a real API key. \
             Run `sentinel onboard` first, then edit config.json"
        );
    };

    let model = model_override
        .or(entry.model.as_deref())
        .unwrap_or(&config.agents.defaults.model)
        .to_string();

    let client = reqwest::Client::new();
    let provider = OpenAiProvider::new(
        provider_name,
        &entry.api_key,
        entry.api_base.as_deref(),
        &model,
        client.clone(),
    );

    let mut profile = config.agent.clone();
    if !presets.is_empty() {
        profile.tools.include = presets;
    }
    profile.tools.exclude.extend(exclude);

    let tool_presets = Presets::new(config.tool_context(client));
    let agent = create_agent(profile.into_config(&tool_presets));

    let mut runner_config = config.runner_config();
    runner_config.model = Some(model.clone());
    let runner = AgentRunner::new(agent, Arc::new(provider), runner_config);

    println!();
    println!("  🛡️  sentinel v{}", env!("CARGO_PKG_VERSION"));
    println!("  Provider: {} | Model: {}", provider_name, model);
    println!(
        "  Agent: {} | Tools: {} | Network: {}{}",
        runner.agent().name(),
        runner.agent().tools().len(),
        runner.agent().network(),
        if config.is_demo() { " (demo mode)" } else { "" }
    );
    println!("  Session: {}", session);
    println!();
    println!("  Type your message, or /quit to exit.");
    println!("  ─────────────────────────────────────");
    println!();

    let mut history: Vec<ChatMessage> = Vec::new();
    let stdin = io::stdin();
    loop {
        print!("  \x1b[36m>\x1b[0m ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" | "/q" => {
                println!("  Goodbye! 👋");
                break;
            }
            "/clear" => {
                history.clear();
                println!("  Session cleared.");
                continue;
            }
            "/tools" => {
                println!("  {}", runner.agent().tools().names().join(", "));
                continue;
            }
            _ => {}
        }

        println!();
        match runner.run(&history, input).await {
            Ok(outcome) => {
                for call in &outcome.tool_calls {
                    let mark = if call.success { "✓" } else { "✗" };
                    println!("  \x1b[2m{} {}\x1b[0m", mark, call.name);
                }
                println!("  \x1b[32m{}\x1b[0m\n", outcome.reply);
                history.extend(outcome.messages);
            }
            Err(e) => {
                eprintln!("  \x1b[31mError: {}\x1b[0m\n", e);
            }
        }
    }

    Ok(())
}

// ── Tools Command ───────────────────────────────────────────────────

fn cmd_tools(preset: Option<Preset>) {
    let presets = Presets::demo();

    println!();
    match preset {
        Some(preset) => {
            println!("  Preset '{}':", preset);
            for (name, tool) in presets.group(preset).iter() {
                println!("  • {:<24} {}", name, tool.description());
            }
        }
        None => {
            println!("  Available tools: {}", get_available_tools().join(", "));
            println!();
            for preset in Preset::ALL {
                println!("  {:<8} {}", preset.as_str(), presets.group(preset).names().join(", "));
            }
        }
    }
    println!();
}

// ── Prompt Command ──────────────────────────────────────────────────

fn cmd_prompt(
    base: &str,
    name: Option<String>,
    description: Option<String>,
    additions: Option<String>,
    template_file: Option<&Path>,
) -> Result<()> {
    let base_config = match template_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let label = path.file_stem().and_then(|s| s.to_str()).unwrap_or("custom");
            let template = NamedTemplate::new(label, &text);
            tracing::debug!(template = %template.name, "Using custom prompt template");
            template.prompt_config()
        }
        None => PromptConfig::with_base(BaseTemplate::from_id(base)),
    };

    let prompt = build_prompt(&PromptConfig {
        agent_name: name,
        agent_description: description,
        additions,
        ..base_config
    });
    println!("{}", prompt);
    Ok(())
}

// ── Wallet Command ──────────────────────────────────────────────────

async fn cmd_wallet(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let ctx = config.tool_context(reqwest::Client::new());

    let (wallet, balance, demo) = match lookup_wallet(ctx.chain.as_ref()).await {
        Ok((wallet, balance)) => (wallet, balance, ctx.chain.is_demo()),
        Err(e) => {
            tracing::warn!(error = %e, "Wallet lookup failed, showing demo wallet");
            (mock_wallet(), mock_balance(), true)
        }
    };

    println!();
    println!("  Public key:   {}", wallet.public_key);
    println!("  Account hash: {}", wallet.account_hash);
    println!("  Balance:      {} CSPR", balance.balance_cspr);
    println!("  Network:      {}", config.casper.network);
    println!("  Explorer:     {}", ctx.explorer.account(&wallet.public_key));
    if demo {
        println!();
        println!("  Demo mode: set casper.privateKey (or CASPER_PRIVATE_KEY) to use a real wallet.");
    } else if balance.balance_motes == "0" {
        println!();
        println!("  Fund this account from the faucet: {}", FAUCET_URL);
    }
    println!();
    Ok(())
}

async fn lookup_wallet(chain: &dyn ChainBackend) -> Result<(WalletInfo, AccountBalance)> {
    let wallet = chain.wallet_info().await?;
    let balance = chain.account_balance(&wallet.public_key).await?;
    Ok((wallet, balance))
}

// ── Onboard Command ─────────────────────────────────────────────────

fn cmd_onboard() -> Result<()> {
    let path = Config::write_default_template()?;
    println!();
    println!("  ✅ Configuration created at:");
    println!("     {}", path.display());
    println!();
    println!("  Next steps:");
    println!("  1. Edit the config file and add your API key");
    println!("  2. Optionally set casper.privateKey to leave demo mode");
    println!("  3. Run `sentinel chat` to start chatting");
    println!();
    Ok(())
}

// ── Status Command ──────────────────────────────────────────────────

fn cmd_status(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.map_or_else(Config::default_path, Path::to_path_buf);

    println!();
    println!("  🛡️  sentinel status");
    println!("  ─────────────────────────────────────");

    if path.exists() {
        println!("  Config:    {}", path.display());
    } else {
        println!("  Config:    ❌ Not found (run `sentinel onboard`)");
        return Ok(());
    }

    let config = load_config(config_path)?;

    match config.providers.find_active() {
        Some((name, _)) => println!("  Provider:  ✅ {} configured", name),
        None => println!("  Provider:  ❌ No provider configured"),
    }
    println!("  Model:     {}", config.agents.defaults.model);
    println!(
        "  Casper:    {} via {} ({})",
        config.casper.network, config.casper.node_url, config.casper.chain_name
    );
    if let Some(problem) = config.casper.network_mismatch() {
        println!("  Warning:   {}", problem);
    }
    println!(
        "  Wallet:    {}",
        if config.is_demo() { "demo mode" } else { "private key configured" }
    );

    let includes: Vec<&str> = config.agent.tools.include.iter().map(|p| p.as_str()).collect();
    println!("  Agent:     {} [{}]", config.agent.name, includes.join(", "));

    if let Err(errors) = config.validate() {
        println!("  Problems:");
        for e in errors {
            println!("     • {}", e);
        }
    }

    println!();
    Ok(())
}
