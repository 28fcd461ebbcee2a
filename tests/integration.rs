//! Integration tests for the postgres-mcp server
//!
//! These tests run against a real PostgreSQL instance. They require:
//! - a reachable database described by DB_HOST / DB_PORT / DB_NAME /
//!   DB_USER / DB_PASSWORD (a `.env` file works too)
//! - permission to create and drop tables in the `public` schema
//!
//! # Running tests
//!
//! ```bash
//! DB_NAME=postgres DB_USER=postgres DB_PASSWORD=postgres \
//!     cargo test --test integration -- --ignored
//! ```

use postgres_mcp::config::ConnectionConfig;
use postgres_mcp::db::Database;
use postgres_mcp::query::{self, QueryError};
use serde_json::json;

async fn connected_db() -> Database {
    dotenv::dotenv().ok();
    let mut db = Database::new(ConnectionConfig::load());
    assert!(db.connect().await, "could not connect to test database");
    db
}

async fn exec(db: &Database, sql: &str) {
    db.client()
        .expect("connected")
        .execute(sql, &[])
        .await
        .unwrap_or_else(|e| panic!("{}: {}", sql, e));
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn select_one_round_trip() {
    let db = connected_db().await;

    let result = query::execute_query(&db, "SELECT 1 AS x", None)
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["x".to_string()]);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0].get("x"), Some(&json!(1)));
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn execute_query_binds_positional_parameters() {
    let db = connected_db().await;

    let result = query::execute_query(
        &db,
        "SELECT $1::text AS greeting, $2::int4 AS n",
        Some(&[json!("hello"), json!(7)]),
    )
    .await
    .unwrap();

    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows[0].get("greeting"), Some(&json!("hello")));
    assert_eq!(result.rows[0].get("n"), Some(&json!(7)));
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn execute_query_rejects_non_select_without_executing() {
    let db = connected_db().await;
    exec(&db, "CREATE TABLE IF NOT EXISTS it_guard (id int)").await;

    let err = query::execute_query(&db, "DELETE FROM it_guard", None)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::NotReadOnly));

    // Empty statements are rejected by the same guard.
    let err = query::execute_query(&db, "", None).await.unwrap_err();
    assert!(matches!(err, QueryError::NotReadOnly));

    exec(&db, "DROP TABLE it_guard").await;
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn list_tables_is_ordered_by_name() {
    let db = connected_db().await;
    exec(&db, "CREATE TABLE IF NOT EXISTS it_list_b (id int)").await;
    exec(&db, "CREATE TABLE IF NOT EXISTS it_list_a (id int)").await;

    let result = query::list_tables(&db, "public").await.unwrap();

    assert_eq!(result.schema, "public");
    assert_eq!(result.count, result.tables.len());
    let pos_a = result
        .tables
        .iter()
        .position(|t| t == "it_list_a")
        .expect("it_list_a listed");
    let pos_b = result
        .tables
        .iter()
        .position(|t| t == "it_list_b")
        .expect("it_list_b listed");
    assert!(pos_a < pos_b, "tables not in ascending name order");

    exec(&db, "DROP TABLE it_list_a").await;
    exec(&db, "DROP TABLE it_list_b").await;
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn describe_table_preserves_declaration_order() {
    let db = connected_db().await;
    exec(
        &db,
        "CREATE TABLE IF NOT EXISTS it_describe (id int PRIMARY KEY, name text)",
    )
    .await;

    let result = query::describe_table(&db, "public", "it_describe")
        .await
        .unwrap();

    assert_eq!(result.schema, "public");
    assert_eq!(result.table, "it_describe");
    assert_eq!(result.count, 2);

    assert_eq!(result.columns[0].name, "id");
    assert_eq!(result.columns[0].data_type, "integer");
    assert!(!result.columns[0].nullable);
    assert_eq!(result.columns[0].default, None);

    assert_eq!(result.columns[1].name, "name");
    assert_eq!(result.columns[1].data_type, "text");
    assert!(result.columns[1].nullable);

    exec(&db, "DROP TABLE it_describe").await;
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn list_relationships_reports_foreign_keys() {
    let db = connected_db().await;
    exec(
        &db,
        "CREATE TABLE IF NOT EXISTS it_customers (id int PRIMARY KEY)",
    )
    .await;
    exec(
        &db,
        "CREATE TABLE IF NOT EXISTS it_orders (customer_id int REFERENCES it_customers(id))",
    )
    .await;

    let result = query::list_relationships(&db, "public", Some("it_orders"))
        .await
        .unwrap();

    assert_eq!(result.table, "it_orders");
    assert_eq!(result.count, 1);
    let rel = &result.relationships[0];
    assert_eq!(rel.source_table, "it_orders");
    assert_eq!(rel.source_column, "customer_id");
    assert_eq!(rel.target_table, "it_customers");
    assert_eq!(rel.target_column, "id");
    assert!(!rel.constraint_name.is_empty());

    // Unfiltered listing reports against the whole schema.
    let all = query::list_relationships(&db, "public", None).await.unwrap();
    assert_eq!(all.table, "all");
    assert!(all
        .relationships
        .iter()
        .any(|r| r.source_table == "it_orders"));

    exec(&db, "DROP TABLE it_orders").await;
    exec(&db, "DROP TABLE it_customers").await;
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn failed_query_leaves_the_connection_usable() {
    let db = connected_db().await;

    let err = query::execute_query(&db, "SELECT * FROM it_no_such_table", None)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Driver(_)));
    assert!(db.is_connected());

    let result = query::execute_query(&db, "SELECT 1 AS x", None)
        .await
        .unwrap();
    assert_eq!(result.row_count, 1);
}

#[tokio::test]
#[ignore = "integration test - requires a PostgreSQL database"]
async fn reconnect_replaces_the_handle() {
    let mut db = connected_db().await;

    assert!(db.connect().await, "second connect failed");
    assert!(db.is_connected());

    // The replacement handle is live and serves queries.
    let result = query::execute_query(&db, "SELECT 1 AS x", None)
        .await
        .unwrap();
    assert_eq!(result.row_count, 1);

    db.disconnect();
    assert!(!db.is_connected());
}
