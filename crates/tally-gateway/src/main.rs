//! tally gateway
//!
//! - Counter API: `/data`, `/update/:key/:value`
//! - Static front-end from `server.static_dir`
//! - Counters initialized before the listener binds; any startup failure
//!   exits non-zero
//! - Graceful shutdown on Ctrl-C / SIGTERM

use tracing_subscriber::{fmt, EnvFilter};

use tally_core::error::{Result, TallyError};
use tally_gateway::{app_state::AppState, config, router, store};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "tally-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    tracing::info!(
        backend = cfg.store.backend.as_str(),
        static_dir = %cfg.server.static_dir,
        "config loaded"
    );

    let store = store::connect(&cfg.store).await?;
    let listen = cfg.server.listen_addr();
    let (state, app) = router::init_app(cfg, store).await?;

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| TallyError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "tally-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| TallyError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    state.set_draining();
    tracing::info!("signal received, starting graceful shutdown");
}
