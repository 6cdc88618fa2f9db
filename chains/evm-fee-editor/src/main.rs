mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::EditorAppConfig;
use dotenv::dotenv;
use fee_logic::{
    setup_logger, ApprovalReview, CommitAdapter, EditorMetrics, EditorMode, FeeEditorInputs,
    FeeTier, GasFeeSession, LogConfig, PersonalMessage, StaticEngine, TokenMetadata,
    TransactionDraft, WalletEngine,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Gas fee editor for a pending EVM transaction", long_about = None)]
struct Args {
    #[arg(short, long, env = "FEE_EDITOR_CONFIG", default_value = "fee-editor.toml")]
    config: String,

    #[arg(long, env = "FEE_EDITOR_LOG_DIR", default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the tier selector and current warnings
    Tiers,
    /// Commit a tier quote
    Basic {
        #[arg(short, long)]
        tier: Option<FeeTier>,
    },
    /// Commit a typed gas limit and gas price (gwei)
    Advanced {
        #[arg(long)]
        gas_limit: Option<String>,
        #[arg(long)]
        gas_price: Option<String>,
    },
    /// Review the transaction as an ERC-20 approval
    Approve {
        /// Custom spend limit in token units
        #[arg(long)]
        custom: Option<String>,
    },
    /// Decode a personal_sign payload
    Message {
        #[arg(long)]
        data: String,
    },
}

fn open_session(
    app: &EditorAppConfig,
    engine: &StaticEngine,
    tx: &TransactionDraft,
    metrics: &EditorMetrics,
) -> Result<GasFeeSession> {
    let editor_config = app.editor_config();
    let mut inputs = FeeEditorInputs::gather(engine, tx, &editor_config);
    if let Some(minimum) = app.minimum_gas_limit() {
        inputs = inputs.with_minimum_gas_limit(minimum);
    }
    if let Some(minimum) = app.minimum_gas_price()? {
        inputs = inputs.with_minimum_gas_price(minimum);
    }
    if let Some(tier) = app.selected_tier() {
        inputs = inputs.with_gas_speed_selected(tier);
    }
    if let Some(message) = &app.gas_error {
        inputs = inputs.with_gas_error(message.clone());
    }

    metrics.record_session_opened();
    Ok(GasFeeSession::open(inputs, editor_config))
}

fn commit(
    mut session: GasFeeSession,
    adapter: &mut CommitAdapter<TransactionDraft>,
) -> Result<serde_json::Value> {
    let update = session.commit(adapter)?;
    Ok(json!({
        "update": update,
        "analytics": adapter.last_analytics(),
        "message": session.primary_message(),
        "warnings": session.warnings().iter().collect::<Vec<_>>(),
    }))
}

fn run(args: Args) -> Result<()> {
    info!("Loading config from: {}", args.config);
    let app = EditorAppConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;
    info!(
        "Configuration loaded for {} (chain ID {})",
        app.network.name, app.network.chain_id
    );

    let engine = app.to_engine()?;
    let mut tx = app.to_transaction()?;
    let metrics = Arc::new(EditorMetrics::new());

    let output = match args.command {
        Command::Tiers => {
            let session = open_session(&app, &engine, &tx, &metrics)?;
            json!({
                "mode": session.mode(),
                "only_advanced": session.only_advanced(),
                "tiers": session.tier_options(),
                "warnings": session.warnings().iter().collect::<Vec<_>>(),
                "message": session.primary_message(),
            })
        }
        Command::Basic { tier } => {
            let mut session = open_session(&app, &engine, &tx, &metrics)?;
            if session.mode() != EditorMode::Basic {
                anyhow::bail!(
                    "Tier selection is not available on {}",
                    engine.network_name()
                );
            }
            if let Some(tier) = tier {
                session.select_tier(tier)?;
            }
            let mut adapter = CommitAdapter::for_engine(tx.clone(), &engine, "Confirm")
                .with_metrics(metrics.clone());
            let mut output = commit(session, &mut adapter)?;
            output["transaction"] = serde_json::to_value(adapter.into_sink())?;
            output
        }
        Command::Advanced {
            gas_limit,
            gas_price,
        } => {
            let mut session = open_session(&app, &engine, &tx, &metrics)?;
            if session.mode() == EditorMode::Basic {
                session.toggle_mode();
            }
            if let Some(limit) = gas_limit {
                session.set_gas_limit(&limit)?;
            }
            if let Some(price) = gas_price {
                session.set_gas_price(&price)?;
            }
            let mut adapter = CommitAdapter::for_engine(tx.clone(), &engine, "Confirm")
                .with_metrics(metrics.clone());
            let mut output = commit(session, &mut adapter)?;
            output["transaction"] = serde_json::to_value(adapter.into_sink())?;
            output
        }
        Command::Approve { custom } => {
            let token = tx.to.context("Approval needs a token contract in transaction.to")?;
            let metadata = engine
                .token_metadata(&token)
                .unwrap_or_else(TokenMetadata::fallback);
            let review = ApprovalReview::new(&tx, metadata)?;

            let mut editor = review.spend_limit_editor();
            if let Some(value) = custom {
                editor.select_custom();
                editor.set_custom_value(value);
            }
            editor.apply_to(&mut tx)?;
            json!({
                "review": review,
                "allowance": editor.allowance(),
                "data": tx.data,
            })
        }
        Command::Message { data } => {
            let message = PersonalMessage::new("cli", data);
            json!({ "lines": message.lines() })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    info!("Editor metrics: {}", metrics.to_json()?);
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let _guard = setup_logger(&LogConfig::default().with_directory(&args.log_dir))?;

    if let Err(e) = run(args) {
        error!("FAILED: {:#}", e);
        return Err(e);
    }
    Ok(())
}
