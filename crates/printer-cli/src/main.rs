use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::api;
use domain::TransportDescriptor;
use infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Printer to talk to: tcp://host[:port], bt://<mac|device>, sim://, or host[:port]
    #[arg(long)]
    target: Option<String>,

    /// Override the connect timeout
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Override the response window
    #[arg(long)]
    read_window_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the status flags (and head temperature) as JSON
    Status,
    /// Read an SGD setting
    Get { name: String },
    /// Change an SGD setting
    Set { name: String, value: String },
    /// Run an SGD action
    Do {
        name: String,
        #[arg(default_value = "")]
        value: String,
    },
    /// Send a file of raw command bytes (a ZPL or CPCL label)
    Send { file: PathBuf },
    /// Print model, serial number, firmware and language as JSON
    Info,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,printer_cli=debug,application=debug".into()),
        ))
        // stdout carries command output
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Use the in-repo config when run from the workspace root
fn resolve_config_dir(requested: &str) -> String {
    let dev_dir = "crates/printer-cli/config";
    let exists = |dir: &str| std::path::Path::new(dir).exists();
    if requested == "config" && !exists(requested) && exists(dev_dir) {
        dev_dir.to_string()
    } else {
        requested.to_string()
    }
}

async fn run() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let config_dir = resolve_config_dir(&args.config_dir);
    debug!("📂 Config directory: {}", config_dir);
    let mut config = AppConfig::load(&config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir))?;

    // CLI flags win over configuration
    if let Some(ms) = args.connect_timeout_ms {
        config.timeouts.connect_ms = ms;
    }
    if let Some(ms) = args.read_window_ms {
        config.timeouts.read_window_ms = ms;
    }
    let descriptor: TransportDescriptor = match &args.target {
        Some(target) => target.parse()?,
        None => config
            .target
            .clone()
            .ok_or_else(|| anyhow!("No printer target: pass --target or set [target] in the config"))?,
    };

    info!(printer = %descriptor, "🔌 Connecting to printer...");
    let started = Instant::now();
    let connection = api::connect(&descriptor, &config).await?;
    info!(elapsed = ?started.elapsed(), "✅ Connected");

    let outcome = execute(&args.command, &connection, &config).await;
    api::disconnect(&connection).await;
    outcome
}

async fn execute(
    command: &Command,
    connection: &std::sync::Arc<application::Connection>,
    config: &AppConfig,
) -> Result<()> {
    match command {
        Command::Status => {
            let printer = api::open_printer(connection, config).await?;
            let report = printer.status_report().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Get { name } => {
            let value = api::get_setting(connection, name, config).await?;
            println!("{}", value);
        }
        Command::Set { name, value } => {
            api::set_setting(connection, name, value).await?;
            info!(setting = %name, value = %value, "Setting sent (printers do not acknowledge)");
        }
        Command::Do { name, value } => {
            api::do_action(connection, name, value).await?;
            info!(command = %name, "Action sent");
        }
        Command::Send { file } => {
            let bytes = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            api::send_raw(connection, &bytes).await?;
            info!(bytes = bytes.len(), file = %file.display(), "🖨️ Sent to printer");
        }
        Command::Info => {
            let printer = api::open_printer(connection, config).await?;
            let info = api::printer_info(&printer).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run()) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
