//! Serve command - run the nodeflow API server.

use super::standard_engine;
use anyhow::Result;
use nodeflow_engine::api::{ApiServer, ServerConfig};
use nodeflow_engine::engine::EngineConfig;

/// Run the serve command until Ctrl+C.
pub async fn run(host: &str, port: u16) -> Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..ServerConfig::from_env()
    };
    let engine = standard_engine(EngineConfig::from_env());
    tracing::info!(host = %host, port = %port, node_types = engine.registry().len(), "Starting nodeflow API server");

    let server = ApiServer::new(config, engine);
    let listener = server.bind().await?;

    println!("Starting nodeflow API server...");
    println!();
    println!("Server: http://{host}:{port}");
    println!();
    println!("Endpoints:");
    println!("  GET  /api/v1/health            - Health check");
    println!("  GET  /api/v1/status            - Uptime and evaluation counters");
    println!("  GET  /api/v1/node-types        - Registered computations");
    println!("  POST /api/v1/run-flow          - Evaluate a workflow (JSON or YAML body)");
    println!("  POST /api/v1/validate          - Validate a workflow");
    println!("  GET  /api/v1/evaluations       - Recent evaluations");
    println!("  GET  /api/v1/evaluations/{{id}}  - One evaluation");
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    server.serve(listener).await?;
    println!("Server stopped.");
    Ok(())
}
