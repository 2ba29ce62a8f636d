/*
[INPUT]:  CLI arguments, YAML configuration file, PHANTOM_CONNECT_* environment
[OUTPUT]: Connect deeplinks, wallet redirects and handshake reports on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use phantom_connect_cli::cli::{self, DecodeReport};
use phantom_connect_cli::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "phantom-connect-cli", version, about = "Phantom wallet deeplink connect tool")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Validate the configuration and exit
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a keypair and print the connect deeplink
    Connect,
    /// Complete the handshake from the wallet's redirect URL
    Decode {
        #[arg(long, value_name = "URL")]
        url: String,
    },
    /// Answer a connect deeplink with a simulated wallet
    SimulateWallet {
        #[arg(long, value_name = "URL")]
        url: String,
        #[arg(long)]
        reject: bool,
    },
    /// Write a starter configuration file
    InitConfig {
        #[arg(long, value_name = "PATH", default_value = "phantom.yaml")]
        output: PathBuf,
        #[arg(long, value_name = "URL")]
        app_url: String,
        #[arg(long, value_name = "URL")]
        redirect_link: String,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(dry_run = args.dry_run, "starting phantom-connect-cli");

    if args.dry_run {
        let path = args
            .config_path
            .as_deref()
            .context("--dry-run requires --config")?;
        load_config(path)?;
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let Some(command) = args.command else {
        bail!("no subcommand given; see --help");
    };

    match command {
        Command::Connect => {
            let config = load_config(required_config(&args.config_path)?)?;
            let url = cli::run_connect(&config).await?;
            info!(url = %url, "open the deeplink in Phantom, then run decode with the redirect URL");
        }
        Command::Decode { url } => {
            let config = load_config(required_config(&args.config_path)?)?;
            if let DecodeReport::Abandoned { error } = cli::run_decode(&config, &url)? {
                bail!("handshake abandoned: {error}");
            }
        }
        Command::SimulateWallet { url, reject } => {
            cli::run_simulate_wallet(&url, reject)?;
        }
        Command::InitConfig {
            output,
            app_url,
            redirect_link,
            force,
        } => {
            cli::run_init(&output, &app_url, &redirect_link, force)?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn required_config(path: &Option<PathBuf>) -> Result<&Path> {
    path.as_deref().context("this command requires --config")
}

fn load_config(path: &Path) -> Result<CliConfig> {
    let config = CliConfig::load(path).context("load config")?;
    info!(
        app_url = %config.app_url,
        cluster = %config.cluster,
        "configuration loaded"
    );
    Ok(config)
}
