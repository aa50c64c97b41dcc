//! Connection bootstrap and per-call context.
//!
//! The engine never owns tenant resolution: the external caller resolves
//! credentials and the database selector and hands them in per call as a
//! [`CallContext`]. [`ConnectOptions`] only bootstraps the base client.

use anyhow::{Context, Result};
use clickhouse::Client;
use std::sync::Arc;

/// Connection options for the ClickHouse engine.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// ClickHouse HTTP URL (e.g. <http://localhost:8123>).
    pub url: String,
    /// Default database.
    pub database: String,
    /// Username for authentication.
    pub user: String,
    /// Password for authentication.
    pub password: String,
}

impl ConnectOptions {
    /// Loads connection options from environment variables.
    ///
    /// - `SIGHTLINE_DB_URL` (default: <http://localhost:8123>)
    /// - `SIGHTLINE_DB_NAME` (default: "sightline")
    /// - `SIGHTLINE_DB_USER` (default: "sightline")
    /// - `SIGHTLINE_DB_PASSWORD` (default: "`sightline_dev`")
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable cannot be read.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: std::env::var("SIGHTLINE_DB_URL")
                .unwrap_or_else(|_| "http://localhost:8123".to_string()),
            database: std::env::var("SIGHTLINE_DB_NAME")
                .unwrap_or_else(|_| "sightline".to_string()),
            user: std::env::var("SIGHTLINE_DB_USER").unwrap_or_else(|_| "sightline".to_string()),
            password: std::env::var("SIGHTLINE_DB_PASSWORD")
                .unwrap_or_else(|_| "sightline_dev".to_string()),
        })
    }

    /// Builds the base client for these options.
    #[must_use]
    pub fn client(&self) -> Arc<Client> {
        Arc::new(
            Client::default()
                .with_url(&self.url)
                .with_database(&self.database)
                .with_user(&self.user)
                .with_password(&self.password),
        )
    }
}

/// Per-call tenant context, resolved by the external caller.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Database override for this call; `None` keeps the client default.
    pub database: Option<String>,
    /// Credential override for this call.
    pub credentials: Option<(String, String)>,
}

impl CallContext {
    /// Context that uses the engine's configured defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context pinned to one database.
    #[must_use]
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            credentials: None,
        }
    }

    /// Applies this context to a base client.
    #[must_use]
    pub fn apply(&self, client: &Client) -> Client {
        let mut client = client.clone();
        if let Some(database) = &self.database {
            client = client.with_database(database);
        }
        if let Some((user, password)) = &self.credentials {
            client = client.with_user(user).with_password(password);
        }
        client
    }
}

/// Verifies connectivity with a trivial query.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
pub async fn ping(client: &Client) -> Result<()> {
    client
        .query("SELECT 1")
        .fetch_one::<u8>()
        .await
        .context("Failed to ping database")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_defaults() {
        std::env::remove_var("SIGHTLINE_DB_URL");
        std::env::remove_var("SIGHTLINE_DB_NAME");
        std::env::remove_var("SIGHTLINE_DB_USER");
        std::env::remove_var("SIGHTLINE_DB_PASSWORD");

        let options = ConnectOptions::from_env().expect("Failed to load options");
        assert_eq!(options.url, "http://localhost:8123");
        assert_eq!(options.database, "sightline");
    }

    #[test]
    fn test_call_context_default_is_passthrough() {
        let ctx = CallContext::new();
        assert!(ctx.database.is_none());
        assert!(ctx.credentials.is_none());
    }

    #[test]
    fn test_call_context_for_database() {
        let ctx = CallContext::for_database("tenant_42");
        assert_eq!(ctx.database.as_deref(), Some("tenant_42"));
    }
}
