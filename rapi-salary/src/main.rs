use rapi_salary::{
    artifacts::ArtifactStore,
    config::AppConfig,
    linear_backend::LinearBackend,
    server::{build_router, serve, AppState},
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rapi_salary=info,axum=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    // === env config ===
    let config = AppConfig::from_env()?;
    info!(
        schema = %config.schema,
        scope = ?config.scope,
        policy = ?config.policy,
        model = %config.artifacts.model.display(),
        scaler = %config.artifacts.scaler.display(),
        "starting"
    );

    // === artifacts: no request is served without both ===
    let store = ArtifactStore::new(config.artifacts.clone());
    let artifacts = store.get().await.inspect_err(|e| {
        error!(error = %e, "cannot load model artifacts, shutting down");
    })?;
    artifacts
        .check_schema(config.schema, config.scope)
        .inspect_err(|e| error!(error = %e, "artifacts do not fit the configured schema"))?;
    for problem in artifacts.dimension_warnings(config.schema, config.scope) {
        warn!(%problem, "predictions will fail until the artifacts are replaced");
    }

    let backend = LinearBackend::new(artifacts, config.schema, config.scope, config.policy)?;
    let app = build_router(AppState {
        model: Arc::new(backend),
    });

    // === serve ===
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");

    serve(listener, app, shutdown_signal()).await?;
    info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown");
}
