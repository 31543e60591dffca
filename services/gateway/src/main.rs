use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tvl_gateway::config::Config;
use tvl_gateway::router::create_router;
use tvl_gateway::service::MarketService;
use tvl_gateway::state::AppState;
use tvl_gateway::store::SqliteMarketStore;
use tvl_gateway::telemetry;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load();
    telemetry::init_tracing(config.app_env);

    tracing::info!(app_env = %config.app_env, "Starting TVL gateway service");

    let store = SqliteMarketStore::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    tracing::info!(database = %config.database_path.display(), "Database connected");

    let service = MarketService::new(Arc::new(store), config.aggregation_strategy);
    tracing::info!(strategy = ?service.strategy(), "Aggregation strategy selected");

    let app = create_router(AppState::new(service));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
