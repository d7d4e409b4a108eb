//! MongoDB connection lifecycle with pool configuration and health checking

use crate::config::MongoConfig;
use bson::{doc, Document as BsonDocument};
use mongo_helper_common::{MongoHelperError, Result};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use std::time::Duration;
use tracing::{info, instrument};

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed (default: none)
    pub max_idle_time: Option<Duration>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: None,
            max_pool_size: Some(10),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("mongo-helper".to_string()),
        }
    }
}

impl PoolConfig {
    /// Copy every explicitly set value onto the driver options
    pub fn apply(&self, client_options: &mut ClientOptions) {
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = &self.app_name {
            client_options.app_name = Some(app.clone());
        }
    }
}

/// Explicitly constructed store handle shared by every helper
///
/// Cloning is cheap: the driver client is reference counted, so all clones
/// share one connection pool. Call [`Connection::shutdown`] once at teardown.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database: Database,
}

impl Connection {
    /// Connect using the URI and database name from `config`
    #[instrument(skip(config), fields(database = %config.database_name))]
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        if config.uri.is_empty() {
            return Err(MongoHelperError::Configuration(
                "Connection URI cannot be empty".to_string(),
            ));
        }

        let mut client_options = ClientOptions::parse(&config.uri).await?;
        config.pool.apply(&mut client_options);

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;
        let database = client.database(&config.database_name);

        info!("MongoDB client initialized");

        Ok(Self { client, database })
    }

    /// Connect with configuration read from the environment
    pub async fn from_env() -> Result<Self> {
        let config = MongoConfig::from_env()?;
        Self::connect(&config).await
    }

    /// Get a reference to the database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a collection by name (untyped documents)
    pub fn get_collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }

    /// Check if the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => Ok(true),
            Err(e) => Err(MongoHelperError::Connection(format!(
                "Ping failed: {}",
                e
            ))),
        }
    }

    /// Close the pool and wait for in-flight operations to finish
    #[instrument(skip(self), fields(database = %self.database.name()))]
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB client shut down");
    }
}
