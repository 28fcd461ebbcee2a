//! PostgreSQL MCP Server implementation

use crate::config::ConnectionConfig;
use crate::db::Database;
use crate::query::{self, DEFAULT_SCHEMA};
use crate::result::respond;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for list_tables tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTablesParams {
    /// Schema to list tables from (default: "public")
    pub schema: Option<String>,
}

/// Parameters for describe_table tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DescribeTableParams {
    /// Name of the table to describe
    pub table: String,
    /// Schema the table lives in (default: "public")
    pub schema: Option<String>,
}

/// Parameters for list_relationships tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListRelationshipsParams {
    /// Schema to inspect (default: "public")
    pub schema: Option<String>,
    /// Optional source table to filter by; all tables in the schema when
    /// omitted
    pub table: Option<String>,
}

/// Parameters for execute_query tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteQueryParams {
    /// SQL to execute; only SELECT statements are accepted
    pub query: String,
    /// Optional positional parameters, referenced as $1..$n in the query
    pub params: Option<Vec<Value>>,
}

// ============================================================================
// Server Implementation
// ============================================================================

/// PostgreSQL introspection and read-only query MCP server
#[derive(Clone)]
pub struct PostgresMcpServer {
    db: Arc<Mutex<Database>>,
    tool_router: ToolRouter<Self>,
}

impl PostgresMcpServer {
    /// Create a server around a disconnected connection manager.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(Database::new(config))),
            tool_router: Self::tool_router(),
        }
    }

    /// Shared handle to the connection manager, used for the startup connect
    /// and the shutdown disconnect.
    pub fn database(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }
}

#[tool_router]
impl PostgresMcpServer {
    /// List all tables in a schema
    #[tool(
        description = "List all tables in the specified schema (default: public), ordered by table name."
    )]
    async fn list_tables(
        &self,
        Parameters(params): Parameters<ListTablesParams>,
    ) -> Result<CallToolResult, McpError> {
        let schema = params.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let db = self.db.lock().await;
        respond(query::list_tables(&db, schema).await)
    }

    /// Describe the columns of one table
    #[tool(
        description = "Get the column definitions for a specific table: name, data type, nullability, and default expression, in declaration order."
    )]
    async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTableParams>,
    ) -> Result<CallToolResult, McpError> {
        let schema = params.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let db = self.db.lock().await;
        respond(query::describe_table(&db, schema, &params.table).await)
    }

    /// List foreign-key relationships
    #[tool(
        description = "Get foreign key relationships for a specific table, or for all tables in the schema when no table is given."
    )]
    async fn list_relationships(
        &self,
        Parameters(params): Parameters<ListRelationshipsParams>,
    ) -> Result<CallToolResult, McpError> {
        let schema = params.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let db = self.db.lock().await;
        respond(query::list_relationships(&db, schema, params.table.as_deref()).await)
    }

    /// Execute an arbitrary read-only query
    #[tool(
        description = "Execute a SQL query with optional positional parameters ($1..$n). Only SELECT statements are allowed. Returns column names and rows as JSON."
    )]
    async fn execute_query(
        &self,
        Parameters(params): Parameters<ExecuteQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let db = self.db.lock().await;
        respond(query::execute_query(&db, &params.query, params.params.as_deref()).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for PostgresMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PostgreSQL introspection MCP server (read-only). \
                Use list_tables to discover tables, describe_table for column \
                definitions, list_relationships for foreign keys, and \
                execute_query for ad-hoc SELECT statements."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
