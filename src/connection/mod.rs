//! Connection management for MongoDB
//!
//! This module owns the driver client:
//! - Connection establishment and termination
//! - Health checks (ping, server version, latency)
//! - Database handles for the record store

use std::sync::Arc;
use std::time::{Duration, Instant};

use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{Result, StoreError};

/// Application name reported to the server
const APP_NAME: &str = "roster";

/// MongoDB connection manager
pub struct ConnectionManager {
    /// MongoDB client instance
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: Arc<RwLock<ConnectionState>>,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Currently connecting
    Connecting,

    /// Connected and ready
    Connected,

    /// Connection failed
    Failed(String),
}

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the connection is healthy
    pub is_healthy: bool,

    /// Response time in milliseconds
    pub response_time_ms: u64,

    /// Server version
    pub server_version: Option<String>,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `config` - Connection configuration (uri, database, timeout)
    ///
    /// # Returns
    /// * `Self` - New connection manager instance
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        }
    }

    /// Establish connection to MongoDB
    ///
    /// Parses the URI, applies the configured timeout and verifies the
    /// server answers a ping.
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        self.set_state(ConnectionState::Connecting).await;
        debug!("Connecting to {}", sanitize_uri(&self.config.uri));

        match self.try_connect().await {
            Ok(client) => {
                self.client = Some(client);
                self.set_state(ConnectionState::Connected).await;
                info!("Connected to {}", sanitize_uri(&self.config.uri));
                Ok(())
            }
            Err(e) => {
                warn!("Connection failed: {}", e);
                self.set_state(ConnectionState::Failed(e.to_string())).await;
                Err(StoreError::ConnectionFailed(e.to_string()).into())
            }
        }
    }

    async fn try_connect(&self) -> std::result::Result<Client, mongodb::error::Error> {
        let timeout = self.timeout();
        let mut options = ClientOptions::parse(&self.config.uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(client)
    }

    /// Disconnect from MongoDB
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("Disconnected from MongoDB");
        }
        self.set_state(ConnectionState::Disconnected).await;
        Ok(())
    }

    /// Perform health check on the connection
    ///
    /// # Returns
    /// * `Result<HealthStatus>` - Health check results or error
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let client = self.get_client()?;
        let admin = client.database("admin");

        let start = Instant::now();
        let ping = admin.run_command(doc! { "ping": 1 }).await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        if let Err(e) = ping {
            warn!("Ping failed: {}", e);
            return Ok(HealthStatus {
                is_healthy: false,
                response_time_ms,
                server_version: None,
            });
        }

        let server_version = admin
            .run_command(doc! { "buildInfo": 1 })
            .await
            .ok()
            .and_then(|info| info.get_str("version").ok().map(str::to_string));

        Ok(HealthStatus {
            is_healthy: true,
            response_time_ms,
            server_version,
        })
    }

    /// Get a handle to the configured database
    pub fn database(&self) -> Result<Database> {
        Ok(self.get_client()?.database(&self.config.database))
    }

    fn get_client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::NotConnected.into())
    }

    /// Get current connection state
    pub async fn get_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// Check if currently connected
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.read().await, ConnectionState::Connected)
    }

    /// Connection configuration in use
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout)
    }

    async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }
}

/// Hide credentials in a connection URI for display
///
/// # Arguments
/// * `uri` - The URI to sanitize
///
/// # Returns
/// * `String` - URI with everything between `://` and `@` replaced by `***`
pub fn sanitize_uri(uri: &str) -> String {
    if let (Some(proto_end), Some(host_start)) = (uri.find("://"), uri.rfind('@')) {
        if host_start > proto_end {
            return format!("{}***{}", &uri[..proto_end + 3], &uri[host_start..]);
        }
    }
    uri.to_string()
}
