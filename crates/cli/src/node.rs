//! Node startup: identity, ledger, status sources and the HTTP listener.

use anyhow::{bail, Context};
use channel::{api, ChannelAcceptor, Dispatcher, TracingEvents};
use corelib::{CoordinatorConfig, FileLedger, FsStatus, Identity};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    // Only apply defaults if RUST_LOG is not set
    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        if let Ok(directive) = level.parse() {
            filter = filter.add_directive(directive);
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub async fn run(config: CoordinatorConfig) -> anyhow::Result<()> {
    config.validate()?;
    tracing::info!(version = %config.version, "karai coordinator starting");

    if !config.coordinator {
        tracing::info!("coordinator mode disabled, skipping webserver deployment");
        return Ok(());
    }
    if config.https {
        bail!("--https is not supported: terminate TLS in front of the coordinator");
    }

    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.api_port)))
        .await
        .with_context(|| format!("failed to bind api port {}", config.api_port))?;
    let acceptor = build_acceptor(&config).await?;

    if config.show_ip {
        tracing::info!(addr = %listener.local_addr()?, "listening");
    }
    tracing::info!(api_port = config.api_port, p2p_port = config.p2p_port, "coordinator API ready");

    api::serve(listener, acceptor, shutdown_signal()).await?;
    tracing::info!("coordinator stopped");
    Ok(())
}

/// Wire identity, ledger and status sources into a channel acceptor.
pub async fn build_acceptor(config: &CoordinatorConfig) -> anyhow::Result<ChannelAcceptor> {
    let key_path = config.identity_key_path();
    let identity = tokio::task::spawn_blocking(move || Identity::load_or_generate(key_path))
        .await
        .context("identity loader panicked")?
        .context("failed to load coordinator identity")?;
    tracing::info!(public_key = %hex::encode(&identity.public_key()[..4]), "coordinator identity loaded");

    let ledger = FileLedger::open(config.attestation_dir())
        .await
        .context("failed to open attestation ledger")?;

    let dispatcher = Dispatcher::new(
        Arc::new(identity),
        Arc::new(ledger),
        Arc::new(FsStatus::from_config(config)),
        Arc::new(TracingEvents),
    );
    Ok(ChannelAcceptor::new(dispatcher, config.read_timeout))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {}
                    _ = sigterm.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}
