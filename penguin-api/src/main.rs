use anyhow::Context;
use penguin_api::{config, observability, server};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load Config
    let config_path = config::config_path();
    let config = config::AppConfig::from_file(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    // 2. Init logging and metrics
    observability::init_tracing(&config.logging.level)?;
    let metrics = observability::install_recorder()?;

    // 3. Load the artifact. No socket is bound unless this succeeds.
    info!(path = %config.artifact.path.display(), "Loading artifact");
    let state = server::build_state(&config, metrics).map_err(|err| {
        error!(error = %err, "Failed to load artifact, refusing to start");
        err
    })?;

    // 4. Create Router
    let app = server::routes::create_router(state);

    // 5. Bind & Serve
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        "Server listening on http://{}:{}",
        config.server.host, config.server.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
