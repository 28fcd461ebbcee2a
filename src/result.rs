//! Helpers for shaping tool responses
//!
//! Every tool answers with a well-formed JSON body: either the operation's
//! payload or an `{"error": message}` object, never both. Operation failures
//! never leave this layer as protocol faults.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::query::QueryError;

/// Successful pretty-printed JSON response.
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// `{"error": message}` carried as response data, flagged as a tool error.
pub fn json_error(err: &QueryError) -> CallToolResult {
    let body = serde_json::json!({ "error": err.to_string() });
    let json = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    CallToolResult::error(vec![Content::text(json)])
}

/// Map an operation outcome onto the either-or response shape.
pub fn respond<T: Serialize>(outcome: Result<T, QueryError>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(payload) => json_success(&payload),
        Err(err) => Ok(json_error(&err)),
    }
}
