//! Store topology and connection configuration.

use std::fmt;

use guichet_store::StoreError;

/// Backend topology, chosen once at construction.
///
/// The choice is irreversible for the process lifetime; there is no runtime
/// mode switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// One connection to one endpoint.
    Single,
    /// Sharded deployment discovered from a seed endpoint.
    Cluster,
}

impl StoreMode {
    /// Derives the mode from a configuration tag.
    ///
    /// Only the exact literal `"single"` selects single-node; every other
    /// tag, including misspellings, selects cluster. Unknown tags fail
    /// toward the explicit sharded topology rather than silently defaulting
    /// to a lone node.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "single" {
            StoreMode::Single
        } else {
            StoreMode::Cluster
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Single => write!(f, "single"),
            StoreMode::Cluster => write!(f, "cluster"),
        }
    }
}

/// Transport encryption settings.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Whether to encrypt the transport.
    pub enabled: bool,
    /// Skip certificate verification. Off by default; turning this on is a
    /// deliberate operational relaxation and is logged as a warning.
    pub accept_invalid_certs: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            accept_invalid_certs: false,
        }
    }
}

/// Connection configuration for the Redis store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend topology.
    pub mode: StoreMode,
    /// Endpoint as `host:port`. In cluster mode this is the seed endpoint
    /// from which the remaining shards are discovered.
    pub address: String,
    /// ACL username, if the deployment requires one.
    pub username: Option<String>,
    /// ACL password, if the deployment requires one.
    pub password: Option<String>,
    /// Transport encryption. Cluster deployments default to encrypted.
    pub tls: TlsConfig,
}

impl StoreConfig {
    /// Creates a configuration for the given topology and endpoint.
    ///
    /// Cluster mode enables TLS by default (with certificate verification);
    /// single mode leaves the transport plain. Both can be overridden via
    /// the `tls` field.
    pub fn new(mode: StoreMode, address: impl Into<String>) -> Self {
        Self {
            mode,
            address: address.into(),
            username: None,
            password: None,
            tls: TlsConfig {
                enabled: mode == StoreMode::Cluster,
                ..TlsConfig::default()
            },
        }
    }

    /// Sets the ACL credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Splits the configured address into host and port.
    pub(crate) fn split_addr(&self) -> Result<(String, u16), StoreError> {
        let (host, port) = self
            .address
            .rsplit_once(':')
            .ok_or_else(|| StoreError::InvalidAddress(self.address.clone()))?;
        if host.is_empty() {
            return Err(StoreError::InvalidAddress(self.address.clone()));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| StoreError::InvalidAddress(self.address.clone()))?;
        Ok((host.to_string(), port))
    }

    /// Seed node URL for the cluster client.
    pub(crate) fn seed_url(&self) -> String {
        let scheme = if self.tls.enabled { "rediss" } else { "redis" };
        format!("{}://{}", scheme, self.address)
    }
}
