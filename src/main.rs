//! Binance Accounts - Main Entry Point
//!
//! Command-line client that runs one operation across every configured
//! Binance account and prints the per-account results as JSON.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use binance_accounts::account::{AccountRegistry, AccountSelector};
use binance_accounts::actions::{
    ActionContext, BalanceQuery, CancelRequest, MarginQuery, NewOrder, OrderQuery, TradeQuery,
};
use binance_accounts::common::types::Side;
use binance_accounts::config::{load_config, load_keys};
use binance_accounts::dispatch::{to_pretty_json, DispatchMode, Dispatcher};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(name = "binance-cli", author, version, about = "Binance CLI", long_about = None)]
struct Args {
    /// Account name; every account when omitted
    #[arg(long, global = true)]
    name: Option<String>,

    /// File path of api keys
    #[arg(long, global = true, default_value = "keys.json")]
    keyfile: String,

    /// Show debug info
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file (JSON or TOML)
    #[arg(short = 'f', long = "configfile", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List account balances
    ListBalance {
        /// List balances with asset BTC, BNB ...
        #[arg(long, env = "BINANCE_ASSETS", value_delimiter = ',')]
        assets: Vec<String>,
        /// Show total balance
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        total: bool,
    },
    /// List latest price for a symbol or symbols
    ListPrice {
        /// Filter with symbol
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// List open orders
    ListOrder {
        /// List orders with symbol
        #[arg(short, long)]
        symbol: Option<String>,
        /// List all account orders
        #[arg(long)]
        all: bool,
        /// Limit num of orders
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Create order
    CreateOrder {
        /// Symbol name: BNBBTC
        #[arg(short, long)]
        symbol: String,
        /// Side type: SELL or BUY
        #[arg(long)]
        side: Side,
        /// Quantity of symbol: 20.120 or 50%
        #[arg(long)]
        quantity: String,
        /// Price of symbol
        #[arg(long)]
        price: Decimal,
        /// For test only, will not actually create order
        #[arg(long)]
        test: bool,
    },
    /// Cancel open orders
    CancelOrder {
        /// Cancel open orders with symbol
        #[arg(short, long)]
        symbol: String,
        /// Cancel open order with order id
        #[arg(long = "order-id", visible_alias = "id")]
        order_id: Option<i64>,
    },
    /// List symbols info
    ListSymbol {
        /// Symbol name
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// List trades
    ListTrade {
        /// Symbol name
        #[arg(short, long)]
        symbol: String,
        /// Limit num of trades
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List margin account balances
    ListMarginBalance {
        /// List balances with asset BTC, BNB ...
        #[arg(long, env = "BINANCE_ASSETS", value_delimiter = ',')]
        assets: Vec<String>,
        /// Show total balance
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        total: bool,
        /// Only show borrowed assets (false: only assets without borrowing)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        borrowed: Option<bool>,
    },
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_pretty_json(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(args.config.as_deref()).context("failed to load config")?;

    // Initialize logging; stdout carries the JSON output
    let level_name = match (&args.log_level, args.debug) {
        (_, true) => "debug".to_string(),
        (Some(level), false) => level.clone(),
        (None, false) => config.settings.log_level.clone(),
    };
    let level = match level_name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let keys = load_keys(&args.keyfile)
        .with_context(|| format!("failed to load keys from {}", args.keyfile))?;
    let registry = AccountRegistry::from_keys(&keys, &config.settings)?;
    let dispatcher = Dispatcher::new(Arc::new(registry))
        .with_mode(DispatchMode::from_parallel(config.settings.parallel));
    let ctx = ActionContext::new(dispatcher, config.locked_balances());
    let selector = AccountSelector::from_name(args.name.clone());
    debug!(?selector, command = ?args.command, "running command");

    match args.command {
        Command::ListBalance { assets, total } => {
            let assets = if assets.is_empty() {
                config.settings.default_assets.clone()
            } else {
                assets
            };
            print(&ctx.list_balances(&selector, BalanceQuery { assets, total }).await?)
        }
        Command::ListPrice { symbol } => print(&ctx.list_prices(symbol).await?),
        Command::ListOrder { symbol, all, limit } => print(
            &ctx.list_orders(&selector, OrderQuery { symbol, all, limit })
                .await?,
        ),
        Command::CreateOrder {
            symbol,
            side,
            quantity,
            price,
            test,
        } => print(
            &ctx.create_order(
                &selector,
                NewOrder {
                    symbol,
                    side,
                    quantity,
                    price,
                    test,
                },
            )
            .await?,
        ),
        Command::CancelOrder { symbol, order_id } => print(
            &ctx.cancel_orders(&selector, CancelRequest { symbol, order_id })
                .await?,
        ),
        Command::ListSymbol { symbol } => print(&ctx.list_symbols(symbol).await?),
        Command::ListTrade { symbol, limit } => {
            print(&ctx.list_trades(&selector, TradeQuery { symbol, limit }).await?)
        }
        Command::ListMarginBalance {
            assets,
            total,
            borrowed,
        } => print(
            &ctx.list_margin_balances(
                &selector,
                MarginQuery {
                    assets,
                    total,
                    borrowed,
                },
            )
            .await?,
        ),
    }
}
