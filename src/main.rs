use std::path::PathBuf;

use clap::Parser;
use swerve_zenoh_runtime::config::SwerveConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Swerve base runtime: chassis commands in, module setpoints out
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON robot config; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the control loop rate
    #[arg(long)]
    loop_hz: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            match SwerveConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => SwerveConfig::default(),
    };

    if let Some(loop_hz) = args.loop_hz {
        config.loop_hz = loop_hz;
        if let Err(e) = config.validate() {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = swerve_zenoh_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
