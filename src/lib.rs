//! PostgreSQL MCP Library
//!
//! Schema introspection and read-only query tools for a PostgreSQL
//! database, exposed as MCP tools.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use postgres_mcp::{ConnectionConfig, PostgresMcpServer};
//!
//! let server = PostgresMcpServer::new(ConnectionConfig::load());
//! // Serve via stdio with rmcp's ServiceExt
//! ```

pub mod config;
pub mod db;
pub mod logging;
pub mod query;
pub mod result;
pub mod rows;
pub mod server;

// Re-export main types
pub use config::ConnectionConfig;
pub use db::Database;
pub use server::PostgresMcpServer;

// Re-export parameter types for direct API usage
pub use server::{
    DescribeTableParams, ExecuteQueryParams, ListRelationshipsParams, ListTablesParams,
};
