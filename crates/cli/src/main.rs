mod commands;
mod config;

use anyhow::Result;
use bybot_brokers_bybit::BybitClient;
use bybot_core::{Environment, Side, SpotOrder, SpotSymbol};
use bybot_risk::BalanceGuard;
use clap::{Parser, Subcommand, ValueEnum};
use commands::OutputFormat;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "bybot")]
#[command(about = "Bybit spot tooling: check the wallet balance and place spot orders")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Path to a TOML config file
    #[arg(short, long, env = "BYBOT_CONFIG")]
    config: Option<PathBuf>,

    /// API key
    #[arg(long, env = "BYBIT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API secret
    #[arg(long, env = "BYBIT_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// Exit with status 1 when an exchange request fails
    #[arg(long)]
    strict: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the spot wallet balance (default)
    Balance,

    /// Place a spot order after checking it against the wallet
    Order {
        /// Spot symbol (e.g. "ETHUSDT")
        #[arg(short, long)]
        symbol: String,

        #[arg(long, value_enum)]
        side: SideArg,

        /// Base quantity; quote amount to spend for market buys
        #[arg(short, long)]
        qty: Decimal,

        #[arg(long = "type", value_enum, default_value = "market")]
        order_type: OrderTypeArg,

        /// Limit price
        #[arg(short, long)]
        price: Option<Decimal>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderTypeArg {
    Market,
    Limit,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = config::Settings::load(cli.config.as_deref())?;
    let credentials = config::credentials(cli.api_key, cli.api_secret)?;

    let environment = settings.exchange.environment();
    if environment == Environment::Mainnet {
        tracing::warn!("Using Bybit mainnet; requests affect a live account");
    }
    let client = BybitClient::new(settings.exchange.client_config())?.with_auth(credentials);
    tracing::debug!(
        base_url = %client.config().base_url,
        environment = ?environment,
        "Exchange client ready"
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut stdout = std::io::stdout().lock();

    let code = match cli.command.unwrap_or(Commands::Balance) {
        Commands::Balance => {
            let outcome = commands::print_balance(&client, &mut stdout, format).await?;
            outcome.exit_code(cli.strict)
        }
        Commands::Order {
            symbol,
            side,
            qty,
            order_type,
            price,
        } => {
            let symbol = SpotSymbol::parse(&symbol)
                .ok_or_else(|| anyhow::anyhow!("Unrecognised spot symbol: {}", symbol))?;
            let side = match side {
                SideArg::Buy => Side::Buy,
                SideArg::Sell => Side::Sell,
            };
            let order = match order_type {
                OrderTypeArg::Market => SpotOrder::market(symbol, side, qty),
                OrderTypeArg::Limit => {
                    let price = price
                        .ok_or_else(|| anyhow::anyhow!("--price is required for limit orders"))?;
                    SpotOrder::limit(symbol, side, qty, price)
                }
            };

            let guard = BalanceGuard::new(settings.limits);
            let outcome =
                commands::place_order(&client, &guard, order, &mut stdout, format).await?;
            // A failed order is never silent
            outcome.exit_code(true)
        }
    };

    Ok(ExitCode::from(code))
}
