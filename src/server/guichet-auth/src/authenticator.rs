//! The authentication gate.
//!
//! Owns the session-store connection for the process lifetime and exposes
//! one decision procedure: decode the token's client identifier, look up the
//! presence marker written at session issuance, and return the identifier
//! only if the marker exists and is truthy.

use std::sync::Arc;

use tracing::{debug, info};

use guichet_store::{KvBackend, StoreError};
use guichet_store_redis::{RedisStore, StoreConfig};

use crate::claims;
use crate::error::AuthError;

/// Configuration for the authenticator.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session store connection settings (topology, endpoint, credentials).
    pub store: StoreConfig,
    /// Reserved for a future key-based authentication mode. Currently
    /// accepted and ignored.
    pub private_key: Option<String>,
}

impl AuthConfig {
    /// Creates a configuration over the given store settings.
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            private_key: None,
        }
    }
}

/// Token-presence authenticator.
///
/// Shared by all request handlers; the store handle carries its own internal
/// synchronization, so no external locking is needed. The connection is
/// established once and its configuration never changes afterwards.
pub struct Authenticator {
    store: Arc<dyn KvBackend>,
}

impl Authenticator {
    /// Connects to the session store and verifies liveness.
    ///
    /// Returns an error if the connection cannot be established or probed;
    /// an `Authenticator` is only ever constructed over a verified
    /// connection. Hosts that cannot serve without authentication should
    /// treat this as a startup failure.
    pub async fn connect(config: AuthConfig) -> Result<Self, AuthError> {
        let store = RedisStore::connect(&config.store).await?;
        if config.private_key.is_some() {
            debug!("private key supplied; key-based authentication is not implemented yet");
        }
        info!("authenticator ready");
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Creates an authenticator over an already-connected backend.
    ///
    /// Used by tests and by hosts running against the in-memory store.
    pub fn with_store(store: Arc<dyn KvBackend>) -> Self {
        Self { store }
    }

    /// Authenticates a bearer token.
    ///
    /// Returns the client identifier embedded in the token if a truthy
    /// presence marker exists for it, and the empty string otherwise. The
    /// empty string is the only failure signal: malformed tokens, absent or
    /// falsy markers, and store errors are all reported identically, as if
    /// no credentials had been presented. No retries are performed; a store
    /// error is a definitive rejection.
    pub async fn authenticate(&self, token: &str) -> String {
        match self.check_presence(token).await {
            Ok(client_id) => client_id,
            Err(err) => {
                debug!(error = %err, "authentication rejected");
                String::new()
            },
        }
    }

    async fn check_presence(&self, token: &str) -> Result<String, AuthError> {
        let payload = claims::decode(token)?;
        let client_id = payload.member_info.client_id;

        let key = presence_key(&client_id, token);
        let value = self
            .store
            .get(&key)
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        match parse_flag(&value) {
            Some(true) => Ok(client_id),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Releases the session store connection.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.store.close().await
    }
}

/// Presence-marker key for a client/token pair. The format must match what
/// the session-issuance path writes: `at_<clientId>:<fullToken>`.
fn presence_key(client_id: &str, token: &str) -> String {
    format!("at_{client_id}:{token}")
}

/// Boolean interpretation of a marker value. Anything outside the accepted
/// literals is treated as unreadable, not as false.
fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD_NO_PAD;
    use base64::Engine;
    use std::time::Duration;

    use guichet_store::MemoryStore;

    /// Backend whose reads always fail, for the store-error path.
    struct FailingStore;

    #[async_trait]
    impl KvBackend for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn incr(&self, _key: &str) -> Result<i64, StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn expire_at(&self, _key: &str, _unix_secs: u64) -> Result<bool, StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Driver("connection reset".into()))
        }

        async fn close(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn make_token(payload_json: &str) -> String {
        format!("h.{}.sig", STANDARD_NO_PAD.encode(payload_json))
    }

    async fn authenticator_with_marker(token: &str, client_id: &str, value: &str) -> Authenticator {
        let store = MemoryStore::new();
        store
            .set(&presence_key(client_id, token), value, None)
            .await
            .unwrap();
        Authenticator::with_store(Arc::new(store))
    }

    #[tokio::test]
    async fn test_valid_token_with_marker() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = authenticator_with_marker(&token, "abc123", "1").await;

        assert_eq!(auth.authenticate(&token).await, "abc123");
    }

    #[tokio::test]
    async fn test_marker_absent() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = Authenticator::with_store(Arc::new(MemoryStore::new()));

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_marker_falsy() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = authenticator_with_marker(&token, "abc123", "0").await;

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_marker_not_boolean() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = authenticator_with_marker(&token, "abc123", "session-blob").await;

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_truthy_spellings() {
        for value in ["1", "t", "T", "true", "True", "TRUE"] {
            let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
            let auth = authenticator_with_marker(&token, "abc123", value).await;
            assert_eq!(auth.authenticate(&token).await, "abc123", "value {value:?}");
        }
    }

    #[tokio::test]
    async fn test_token_with_one_segment() {
        let auth = Authenticator::with_store(Arc::new(MemoryStore::new()));

        assert_eq!(auth.authenticate("just-one-segment").await, "");
    }

    #[tokio::test]
    async fn test_token_with_invalid_base64_payload() {
        let auth = Authenticator::with_store(Arc::new(MemoryStore::new()));

        assert_eq!(auth.authenticate("h.!!!.sig").await, "");
    }

    #[tokio::test]
    async fn test_token_with_invalid_json_payload() {
        let auth = Authenticator::with_store(Arc::new(MemoryStore::new()));
        let token = format!("h.{}.sig", STANDARD_NO_PAD.encode("{broken"));

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_token_without_user_id() {
        // The payload decodes with an empty identifier; the lookup key is
        // `at_:<token>`, which no issuance path ever writes.
        let token = make_token(r#"{"memberInfo":{}}"#);
        let auth = Authenticator::with_store(Arc::new(MemoryStore::new()));

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_store_error_fails_closed() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = Authenticator::with_store(Arc::new(FailingStore));

        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[tokio::test]
    async fn test_idempotent_under_unchanged_store() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let auth = authenticator_with_marker(&token, "abc123", "1").await;

        assert_eq!(auth.authenticate(&token).await, "abc123");
        assert_eq!(auth.authenticate(&token).await, "abc123");

        let missing = make_token(r#"{"memberInfo":{"userId":"nobody"}}"#);
        assert_eq!(auth.authenticate(&missing).await, "");
        assert_eq!(auth.authenticate(&missing).await, "");
    }

    #[tokio::test]
    async fn test_marker_expiry_revokes() {
        let token = make_token(r#"{"memberInfo":{"userId":"abc123"}}"#);
        let store = MemoryStore::new();
        store
            .set(
                &presence_key("abc123", &token),
                "1",
                Some(Duration::from_millis(10)),
            )
            .await
            .unwrap();
        let auth = Authenticator::with_store(Arc::new(store));

        assert_eq!(auth.authenticate(&token).await, "abc123");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(auth.authenticate(&token).await, "");
    }

    #[test]
    fn test_presence_key_format() {
        assert_eq!(presence_key("abc123", "a.b.c"), "at_abc123:a.b.c");
        assert_eq!(presence_key("", "a.b.c"), "at_:a.b.c");
    }
}
