use anyhow::{Context, Result};
use clap::Parser;
use signer_daemon::App;
use std::path::PathBuf;

/// Signer daemon: polls the ledger for new epochs, signs their digest,
/// and votes them back.
#[derive(Parser)]
struct Opts {
    /// Path to a JSON config file.
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let config = reward_config::load(&opts.config).context("loading signer config")?;

    let app = App::new(config).await.context("initializing signer app")?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(true);
    });

    app.run(shutdown_rx).await;
    Ok(())
}
