use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use waypoint_server::api::{AppState, router};
use waypoint_server::config::WaypointConfig;
use waypoint_server::secret_factory::create_secret_store;

/// Waypoint request router.
#[derive(Parser, Debug)]
#[command(name = "waypoint-server", about = "HTTP listener for the Waypoint request router")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "waypoint.toml")]
    config: PathBuf,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = WaypointConfig::load(&cli.config)?;
    waypoint_server::telemetry::init(config.api.debug);

    let secrets = create_secret_store(&config.secrets, &config.api.region).await?;
    info!(backend = %config.secrets.backend, "secret store ready");

    let dispatcher = waypoint_server::build_dispatcher(&config, secrets)?;
    info!(
        base_path = %dispatcher.base_path(),
        endpoints = dispatcher.endpoints().len(),
        secret_id = ?config.api.secret_id(),
        "dispatcher ready"
    );

    let app = router(AppState::new(dispatcher));

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "waypoint-server listening");

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(());
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .into_future(),
    );

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    // Stop accepting connections, then give in-flight calls a bounded window.
    let _ = stop_tx.send(());
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => result??,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, in-flight calls dropped"
        ),
    }

    info!("waypoint-server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
