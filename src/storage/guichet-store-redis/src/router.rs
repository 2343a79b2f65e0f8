//! Dual-mode Redis store.
//!
//! One `RedisStore` value fronts either a single-node connection or a
//! cluster connection. Every operation funnels through a single dispatch
//! point; results and errors are the driver's own, passed through without
//! translation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::cluster_routing::{MultipleNodeRoutingInfo, ResponsePolicy, RoutingInfo};
use redis::{Cmd, FromRedisValue, TlsMode, Value};
use tracing::{debug, info, warn};

use guichet_store::{KvBackend, StoreError};

use crate::config::{StoreConfig, StoreMode};

/// The active backend handle. Exactly one variant exists per store; the
/// choice is made in [`RedisStore::connect`] and never revisited.
#[derive(Clone)]
enum Driver {
    Single(ConnectionManager),
    Cluster(ClusterConnection),
}

/// Redis-backed [`KvBackend`] serving both topologies behind one interface.
///
/// Cloning is cheap; clones share the underlying connection, which carries
/// its own internal synchronization and is safe for concurrent callers.
#[derive(Clone)]
pub struct RedisStore {
    driver: Driver,
    mode: StoreMode,
}

impl RedisStore {
    /// Connects to the store and verifies liveness.
    ///
    /// Single mode probes the one endpoint with a `PING`; cluster mode
    /// probes every shard individually and fails if any shard does not
    /// respond. A store is only ever constructed fully verified: on error
    /// the host decides whether to abort, retry, or degrade, but it never
    /// holds a half-initialized handle.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let driver = match config.mode {
            StoreMode::Single => Self::connect_single(config).await?,
            StoreMode::Cluster => Self::connect_cluster(config).await?,
        };

        let store = Self {
            driver,
            mode: config.mode,
        };
        store.ping().await?;

        info!(mode = %config.mode, address = %config.address, "session store connected");
        Ok(store)
    }

    /// The topology this store was constructed with.
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    async fn connect_single(config: &StoreConfig) -> Result<Driver, StoreError> {
        let (host, port) = config.split_addr()?;

        let addr = if config.tls.enabled {
            if config.tls.accept_invalid_certs {
                warn!("certificate verification disabled for session store");
            }
            redis::ConnectionAddr::TcpTls {
                host,
                port,
                insecure: config.tls.accept_invalid_certs,
                tls_params: None,
            }
        } else {
            redis::ConnectionAddr::Tcp(host, port)
        };

        let info = redis::ConnectionInfo {
            addr,
            redis: redis::RedisConnectionInfo {
                username: config.username.clone(),
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(Driver::Single(manager))
    }

    async fn connect_cluster(config: &StoreConfig) -> Result<Driver, StoreError> {
        // The configured address is a one-element seed list; the remaining
        // shards are discovered from it.
        config.split_addr()?;
        let mut builder = ClusterClientBuilder::new(vec![config.seed_url()]);

        if let Some(username) = &config.username {
            builder = builder.username(username.clone());
        }
        if let Some(password) = &config.password {
            builder = builder.password(password.clone());
        }
        if config.tls.enabled {
            let tls = if config.tls.accept_invalid_certs {
                warn!("certificate verification disabled for session store cluster");
                TlsMode::Insecure
            } else {
                TlsMode::Secure
            };
            builder = builder.tls(tls);
        }

        let client = builder
            .build()
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let connection = client
            .get_async_connection()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(Driver::Cluster(connection))
    }

    /// Single dispatch point: runs a command on whichever driver is active.
    async fn run<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, StoreError> {
        let result = match &self.driver {
            Driver::Single(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            },
            Driver::Cluster(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            },
        };
        result.map_err(|e| StoreError::Driver(e.to_string()))
    }

    /// Executes a pipelined batch on the active driver.
    ///
    /// Build the batch with [`redis::pipe`]; the raw reply is returned so
    /// callers keep the driver's native result typing.
    pub async fn exec_pipeline(&self, pipe: &redis::Pipeline) -> Result<Value, StoreError> {
        let result = match &self.driver {
            Driver::Single(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await
            },
            Driver::Cluster(conn) => {
                let mut conn = conn.clone();
                pipe.query_async(&mut conn).await
            },
        };
        result.map_err(|e| StoreError::Driver(e.to_string()))
    }

    /// Probes every shard of the cluster; any shard failing fails the probe.
    async fn ping_all_shards(conn: &ClusterConnection) -> Result<(), StoreError> {
        let routing = RoutingInfo::MultiNode((
            MultipleNodeRoutingInfo::AllNodes,
            Some(ResponsePolicy::AllSucceeded),
        ));
        let mut conn = conn.clone();
        conn.route_command(&redis::cmd("PING"), routing)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl KvBackend for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.run(redis::cmd("GET").arg(key)).await
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl.as_millis() as u64);
        }
        self.run(&cmd).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.run::<i64>(redis::cmd("DEL").arg(key)).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.run(redis::cmd("INCR").arg(key)).await
    }

    async fn expire_at(&self, key: &str, unix_secs: u64) -> Result<bool, StoreError> {
        self.run(redis::cmd("EXPIREAT").arg(key).arg(unix_secs)).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.run(redis::cmd("KEYS").arg(pattern)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match &self.driver {
            Driver::Single(_) => {
                self.run::<String>(&redis::cmd("PING")).await?;
                Ok(())
            },
            Driver::Cluster(conn) => Self::ping_all_shards(conn).await,
        }
    }

    async fn close(&self) -> Result<(), StoreError> {
        // The driver tears the connection down when the last clone drops;
        // there is no explicit disconnect in the async client.
        debug!(mode = %self.mode, "session store closed");
        Ok(())
    }
}
