//! Database connection lifecycle
//!
//! Owns the single tokio-postgres client handle. The handle moves through
//! `disconnected -> connected -> disconnected` and at most one live handle
//! exists at a time; reconnecting drops any prior handle first.

use crate::config::ConnectionConfig;
use tokio_postgres::{Client, NoTls};

/// Manages the single connection to the target database.
///
/// Query operations receive the handle through [`Database::client`] rather
/// than any process-wide state, so a disconnected instance can stand in for
/// the real thing in tests.
pub struct Database {
    config: ConnectionConfig,
    client: Option<Client>,
}

impl Database {
    /// A disconnected manager holding the given credentials.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    /// Open a new session, dropping any existing one first.
    ///
    /// Returns `false` on any driver-level failure (bad credentials,
    /// unreachable host, unknown database); the cause is logged for the
    /// operator. No retry here; the caller decides whether to try again.
    pub async fn connect(&mut self) -> bool {
        self.disconnect();

        match self.config.pg_config().connect(NoTls).await {
            Ok((client, connection)) => {
                // Drive the connection until the client is dropped.
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!("Database connection error: {}", e);
                    }
                });
                tracing::info!(
                    "Connected to database {} at {}:{}",
                    self.config.dbname,
                    self.config.host,
                    self.config.port
                );
                self.client = Some(client);
                true
            }
            Err(e) => {
                tracing::error!("Error connecting to database: {}", e);
                false
            }
        }
    }

    /// Idempotent: drops the handle if open, otherwise a no-op. Dropping the
    /// client terminates the spawned connection task.
    pub fn disconnect(&mut self) {
        if self.client.take().is_some() {
            tracing::info!("Database connection closed");
        }
    }

    /// True iff a handle exists and the driver has not observed it die.
    /// Dead-session detection is best-effort without a round trip.
    pub fn is_connected(&self) -> bool {
        self.client.as_ref().is_some_and(|c| !c.is_closed())
    }

    /// The live handle, if any.
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref().filter(|c| !c.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let db = Database::new(ConnectionConfig::default());
        assert!(!db.is_connected());
        assert!(db.client().is_none());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut db = Database::new(ConnectionConfig::default());
        db.disconnect();
        db.disconnect();
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn connect_failure_reports_false() {
        // Port 1 on localhost is not a PostgreSQL server.
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            dbname: "nope".to_string(),
            user: "nobody".to_string(),
            password: String::new(),
        };
        let mut db = Database::new(config);
        assert!(!db.connect().await);
        assert!(!db.is_connected());
    }
}
