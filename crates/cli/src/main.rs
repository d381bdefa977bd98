//! Main entry point for the webphone CLI
//!
//! `webphone phone` runs an interactive session against the call state
//! controller; `webphone token` mints an SDK access token.

mod config;
mod offline;
mod render;
mod repl;
mod token;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use webphone_client_core::{ControllerBuilder, SimulatedConnector};

use crate::config::ConfigArgs;
use crate::offline::OfflineBackend;
use crate::repl::Session;
use crate::token::TokenMinter;

#[derive(Parser, Debug)]
#[command(name = "webphone", author, version, about = "WebRTC phone client", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive phone session
    Phone(PhoneArgs),
    /// Mint an SDK access token
    Token(TokenArgs),
}

#[derive(Args, Debug)]
struct PhoneArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Serve tokens and call ids locally instead of calling the backend
    #[arg(long)]
    offline: bool,

    #[command(flatten)]
    account: AccountArgs,
}

#[derive(Args, Debug)]
struct TokenArgs {
    #[command(flatten)]
    account: AccountArgs,

    /// Token lifetime in hours
    #[arg(long, default_value_t = token::DEFAULT_TTL_HOURS)]
    ttl_hours: i64,

    /// Print the decoded claims after the token
    #[arg(long)]
    decode: bool,
}

/// Account credentials used to sign tokens
#[derive(Args, Debug, Clone)]
struct AccountArgs {
    /// Account auth ID (token issuer)
    #[arg(long, env = "PLIVO_AUTH_ID", default_value = "")]
    auth_id: String,

    /// Account auth token (signing secret)
    #[arg(long, env = "PLIVO_AUTH_TOKEN", default_value = "", hide_env_values = true)]
    auth_token: String,

    /// Endpoint username (token subject)
    #[arg(long, env = "PLIVO_ENDPOINT_USERNAME", default_value = "")]
    username: String,

    /// Application ID
    #[arg(long, env = "PLIVO_APP_ID")]
    app_id: Option<String>,
}

impl AccountArgs {
    fn minter(&self) -> Result<TokenMinter> {
        for (name, value) in [
            ("auth id", &self.auth_id),
            ("auth token", &self.auth_token),
            ("endpoint username", &self.username),
        ] {
            if value.is_empty() {
                anyhow::bail!("Missing {} (see --help for the matching flag and environment variable)", name);
            }
        }
        Ok(TokenMinter::new(self.auth_id.clone(), &self.auth_token).with_app_id(self.app_id.clone()))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "webphone=debug,webphone_client_core=debug"
    } else {
        "webphone=info,webphone_client_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_phone(args: PhoneArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let connector = SimulatedConnector::new();
    let mut builder = ControllerBuilder::new().config(config).connector(connector.clone());

    if args.offline {
        info!("Offline mode, tokens are minted locally");
        builder = builder.backend(OfflineBackend::new(args.account.minter()?, args.account.username.clone()));
    }

    let controller = builder.build().context("Failed to build controller")?;
    info!(
        token_url = %controller.config().token_url,
        prepare_call_url = %controller.config().prepare_call_url,
        "Controller configured"
    );
    controller.initialize()?;

    Session::new(controller, connector).run().await
}

fn run_token(args: TokenArgs) -> Result<()> {
    let minter = args
        .account
        .minter()?
        .with_ttl(chrono::Duration::hours(args.ttl_hours));
    let token = minter.mint(&args.account.username)?;
    println!("{}", token);

    if args.decode {
        let claims = minter.verify(&token)?;
        println!("{}", serde_json::to_string_pretty(&claims)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Phone(args) => run_phone(args).await,
        Command::Token(args) => run_token(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
