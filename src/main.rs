//! PostgreSQL MCP Server
//!
//! Serves schema introspection and read-only query tools over stdio.
//! Connection credentials come from `DB_*` environment variables (a `.env`
//! file is honored) or an optional TOML config file.

use postgres_mcp::{config::ConnectionConfig, logging, PostgresMcpServer};
use rmcp::ServiceExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing("postgres_mcp")?;

    tracing::info!("Starting postgres-mcp MCP Server");

    let config = ConnectionConfig::load();
    let server = PostgresMcpServer::new(config);
    let db = server.database();

    // One connect attempt at startup. A failure is reported and the server
    // keeps running; operations answer with a connection error until an
    // operator restarts with working credentials.
    if !db.lock().await.connect().await {
        tracing::warn!("Starting without an active database connection");
    }

    let service = match server.serve(rmcp::transport::stdio()).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            db.lock().await.disconnect();
            std::process::exit(1);
        }
    };

    tracing::info!("Server running, waiting for requests...");

    let outcome = service.waiting().await;

    db.lock().await.disconnect();
    tracing::info!("Server shutting down");

    outcome?;
    Ok(())
}
