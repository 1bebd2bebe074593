use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uploader_daemon::EVMUploader;

/// Uploader daemon: posts finalized reward roots on-chain and follows
/// each posting through inclusion, confirmation, and fee-bump retries.
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
    let config: reward_config::UploaderConfig =
        reward_config::load(&opts.config).context("loading uploader config")?;

    let fetch_interval = Duration::from_secs(config.fetch_interval_secs);
    let check_interval = Duration::from_secs(config.check_interval_secs);
    let check_offset = Duration::from_secs(config.check_loop_offset_secs);

    let app = Arc::new(EVMUploader::new(config).await.context("initializing uploader app")?);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(true);
    });

    let fetch_app = app.clone();
    let fetch_shutdown = shutdown_rx.clone();
    let fetch_loop = tokio::spawn(async move {
        uploader_daemon::run_cron("fetch_pending_rewards", fetch_interval, Duration::ZERO, fetch_shutdown, || {
            let app = fetch_app.clone();
            async move {
                if let Err(e) = app.fetch_pending_rewards().await {
                    tracing::warn!(error = %e, "fetch_pending_rewards tick failed");
                }
            }
        })
        .await;
    });

    let check_app = app.clone();
    let check_shutdown = shutdown_rx.clone();
    let check_loop = tokio::spawn(async move {
        uploader_daemon::run_cron("check_reward_posting_status", check_interval, check_offset, check_shutdown, || {
            let app = check_app.clone();
            async move {
                if let Err(e) = app.check_reward_posting_status().await {
                    tracing::warn!(error = %e, "check_reward_posting_status tick failed");
                }
            }
        })
        .await;
    });

    let _ = tokio::join!(fetch_loop, check_loop);
    Ok(())
}
