//! Read-only query operations against the connected database
//!
//! Each operation is stateless apart from borrowing the shared connection:
//! it checks liveness first, runs one parameterized statement, and shapes
//! the rows into a serializable result. Failures are values; nothing here
//! panics or tears down the connection.

use crate::db::Database;
use crate::rows::{row_to_object, SqlParam};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio_postgres::types::ToSql;

/// Schema used when the caller does not name one.
pub const DEFAULT_SCHEMA: &str = "public";

/// Operation-level failures, surfaced to the caller as data.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No live connection when the operation was invoked; no SQL was sent.
    #[error("No active database connection")]
    NotConnected,

    /// A statement that is not lexically a SELECT was submitted.
    #[error("Only SELECT queries are allowed for security reasons")]
    NotReadOnly,

    /// Any failure reported by the driver during execution.
    #[error("{0}")]
    Driver(String),
}

/// Tables in one schema, ordered by name ascending.
#[derive(Debug, Serialize)]
pub struct TableList {
    pub schema: String,
    pub tables: Vec<String>,
    pub count: usize,
}

/// One column of a table, in declaration order.
#[derive(Debug, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

/// Columns of one table.
#[derive(Debug, Serialize)]
pub struct TableSchema {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    pub count: usize,
}

/// One foreign-key constraint edge.
#[derive(Debug, Serialize)]
pub struct RelationshipDescriptor {
    pub constraint_name: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Foreign-key relationships within a schema, optionally filtered to one
/// source table.
#[derive(Debug, Serialize)]
pub struct RelationshipList {
    pub schema: String,
    pub table: String,
    pub relationships: Vec<RelationshipDescriptor>,
    pub count: usize,
}

/// Result of an arbitrary SELECT: ordered column names plus one
/// column -> value object per row.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, Value>>,
    pub row_count: usize,
}

const LIST_TABLES_SQL: &str = "\
SELECT table_name \
 FROM information_schema.tables \
 WHERE table_schema = $1 \
 ORDER BY table_name";

const TABLE_COLUMNS_SQL: &str = "\
SELECT column_name, data_type, is_nullable, column_default \
 FROM information_schema.columns \
 WHERE table_schema = $1 AND table_name = $2 \
 ORDER BY ordinal_position";

const RELATIONSHIPS_SQL: &str = "\
SELECT tc.constraint_name, \
       tc.table_name AS source_table, \
       kcu.column_name AS source_column, \
       ccu.table_name AS target_table, \
       ccu.column_name AS target_column \
 FROM information_schema.table_constraints tc \
 JOIN information_schema.key_column_usage kcu \
   ON tc.constraint_name = kcu.constraint_name \
  AND tc.table_schema = kcu.table_schema \
 JOIN information_schema.constraint_column_usage ccu \
   ON ccu.constraint_name = tc.constraint_name \
  AND ccu.table_schema = tc.table_schema \
 WHERE tc.constraint_type = 'FOREIGN KEY' \
   AND tc.table_schema = $1";

/// List all tables in the given schema.
pub async fn list_tables(db: &Database, schema: &str) -> Result<TableList, QueryError> {
    let client = db.client().ok_or(QueryError::NotConnected)?;

    let rows = client
        .query(LIST_TABLES_SQL, &[&schema])
        .await
        .map_err(|e| driver("Error fetching tables", e))?;

    let tables: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
    let count = tables.len();

    Ok(TableList {
        schema: schema.to_string(),
        tables,
        count,
    })
}

/// Describe the columns of one table, in declaration order.
pub async fn describe_table(
    db: &Database,
    schema: &str,
    table: &str,
) -> Result<TableSchema, QueryError> {
    let client = db.client().ok_or(QueryError::NotConnected)?;

    let rows = client
        .query(TABLE_COLUMNS_SQL, &[&schema, &table])
        .await
        .map_err(|e| driver("Error fetching table schema", e))?;

    let columns: Vec<ColumnDescriptor> = rows
        .iter()
        .map(|row| ColumnDescriptor {
            name: row.get(0),
            data_type: row.get(1),
            nullable: row.get::<_, String>(2) == "YES",
            default: row.get(3),
        })
        .collect();
    let count = columns.len();

    Ok(TableSchema {
        schema: schema.to_string(),
        table: table.to_string(),
        columns,
        count,
    })
}

/// List foreign-key relationships in a schema, optionally for one source
/// table.
pub async fn list_relationships(
    db: &Database,
    schema: &str,
    table: Option<&str>,
) -> Result<RelationshipList, QueryError> {
    let client = db.client().ok_or(QueryError::NotConnected)?;

    let rows = match table {
        Some(table) => {
            let sql = format!("{} AND tc.table_name = $2", RELATIONSHIPS_SQL);
            client.query(&sql, &[&schema, &table]).await
        }
        None => client.query(RELATIONSHIPS_SQL, &[&schema]).await,
    }
    .map_err(|e| driver("Error fetching relationships", e))?;

    let relationships: Vec<RelationshipDescriptor> = rows
        .iter()
        .map(|row| RelationshipDescriptor {
            constraint_name: row.get(0),
            source_table: row.get(1),
            source_column: row.get(2),
            target_table: row.get(3),
            target_column: row.get(4),
        })
        .collect();
    let count = relationships.len();

    Ok(RelationshipList {
        schema: schema.to_string(),
        table: table.unwrap_or("all").to_string(),
        relationships,
        count,
    })
}

/// Execute an arbitrary SELECT with optional positional parameters
/// (`$1..$n`).
pub async fn execute_query(
    db: &Database,
    sql: &str,
    params: Option<&[Value]>,
) -> Result<QueryResult, QueryError> {
    let client = db.client().ok_or(QueryError::NotConnected)?;

    if !is_select(sql) {
        return Err(QueryError::NotReadOnly);
    }

    let bound: Vec<SqlParam> = params
        .unwrap_or_default()
        .iter()
        .map(SqlParam::from_json)
        .collect();
    let refs: Vec<&(dyn ToSql + Sync)> =
        bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

    // Prepare first so column names are known even for an empty result set.
    let statement = client
        .prepare(sql)
        .await
        .map_err(|e| driver("Error executing query", e))?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let rows = client
        .query(&statement, &refs)
        .await
        .map_err(|e| driver("Error executing query", e))?;

    let rows: Vec<_> = rows.iter().map(row_to_object).collect();
    let row_count = rows.len();

    Ok(QueryResult {
        columns,
        rows,
        row_count,
    })
}

/// Lexical guard for the arbitrary-query path.
///
/// A prefix check, not a parser: it does not catch a SELECT that invokes a
/// mutating function. Pair the configured user with read-only privileges
/// for a real guarantee.
pub fn is_select(sql: &str) -> bool {
    sql.trim_start().to_lowercase().starts_with("select")
}

fn driver(context: &str, err: tokio_postgres::Error) -> QueryError {
    tracing::error!("{}: {}", context, err);
    QueryError::Driver(format!("{}: {}", context, err))
}
