use clap::Parser;
use fitbuddy::{Config, Server, Store};
use tracing::info;

/// FitnessBuddy demo backend
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Interface to bind, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Listening port, overrides the config file and PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let mut config = config.apply_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting FitnessBuddy backend");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = Server::bind(&config, Store::seeded()).await?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
