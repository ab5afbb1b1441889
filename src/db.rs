//! Database connection management
//!
//! The store hands out one connection at a time through a [`Session`] guard.
//! Unless connection reuse is enabled, the guard closes the underlying
//! connection when it goes out of scope, on success and failure alike.

pub mod queries;
pub mod service;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use deadpool_postgres::{
    ClientWrapper, Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime,
};
use std::ops::{Deref, DerefMut};
use tokio_postgres::NoTls;
use tracing::{debug, info};

pub use service::SchemaLifecycle;

/// Handle to the configured store
pub struct Store {
    pool: Pool,
    reuse_connections: bool,
}

impl Store {
    /// Build the store handle; no connection is opened until the first session
    pub fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = Self::create_pool(config)?;
        info!(
            "Store configured for {} (TLS: {}, reuse: {})",
            config.display_target(),
            config.tls,
            config.reuse_connections
        );

        Ok(Self {
            pool,
            reuse_connections: config.reuse_connections,
        })
    }

    /// Create a single-slot connection pool with the given configuration
    fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.database.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(1));

        let pool = if config.tls {
            let certs = rustls_native_certs::load_native_certs();
            let mut root_store = rustls::RootCertStore::empty();
            for cert in certs.certs {
                root_store.add(cert).ok();
            }

            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();

            let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
            cfg.create_pool(Some(Runtime::Tokio1), tls)?
        } else {
            cfg.create_pool(Some(Runtime::Tokio1), NoTls)?
        };

        Ok(pool)
    }

    /// Open a connection scoped to one operation
    pub async fn session(&self) -> Result<Session, AppError> {
        let client = self.pool.get().await?;
        debug!("Session opened");
        Ok(Session {
            client: Some(client),
            close_on_drop: !self.reuse_connections,
        })
    }

    /// Verify the target is reachable
    pub async fn ping(&self) -> Result<(), AppError> {
        let session = self.session().await?;
        session.query_one(queries::PING, &[]).await?;
        info!("✅ Database connection successful");
        Ok(())
    }
}

/// A connection borrowed for the duration of one operation
pub struct Session {
    // Only `Drop` takes the client out.
    client: Option<Object>,
    close_on_drop: bool,
}

impl Deref for Session {
    type Target = ClientWrapper;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref().expect("session client is present until drop")
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client.as_mut().expect("session client is present until drop")
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        if self.close_on_drop {
            // Detaching from the pool drops the client, which ends the connection.
            drop(Object::take(client));
            debug!("Session closed");
        } else {
            debug!("Session returned to pool");
        }
    }
}
