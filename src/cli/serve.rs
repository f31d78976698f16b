use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config::BenchConfig;
use crate::errors::BenchError;
use tracing::info;

pub async fn handle_serve(args: ServeArgs, mut config: BenchConfig) -> Result<(), BenchError> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = args.db {
        config.storage.path = db;
    }

    info!(
        host = %config.server.host,
        port = config.server.port,
        db = %config.storage.path,
        on_failure = %config.storage.on_failure,
        "Starting API server"
    );

    let state = api::create_app_state(&config)?;
    let app = api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| BenchError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
