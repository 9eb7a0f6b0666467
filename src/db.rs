//! Document store
//!
//! The API talks to storage only through [`FormStore`] and [`UserStore`].
//! PostgreSQL backs production; the in-memory store serves development and tests.

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{Form, FormResponse, User};
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tracing::{debug, info};
use uuid::Uuid;

/// Forms and responses collections
#[async_trait]
pub trait FormStore: Send + Sync {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError>;

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError>;

    /// Forms owned by `owner`, most recently updated first
    async fn find_forms_by_owner(&self, owner: Uuid) -> Result<Vec<Form>, AppError>;

    /// Replace a stored form. Returns false when no form has this id.
    /// The stored response counter is kept, whatever `form.response_count` says.
    async fn update_form(&self, form: &Form) -> Result<bool, AppError>;

    /// Delete a form and every response to it as one unit.
    /// Returns the number of responses removed, or `None` if the form did not exist.
    async fn delete_form(&self, id: Uuid) -> Result<Option<u64>, AppError>;

    /// Insert a response and increment its form's counter as one unit
    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError>;

    /// Responses to a form, newest first
    async fn find_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, AppError>;

    /// Any earlier response to `form_id` from the same IP, or the same email when given
    async fn find_prior_submission(
        &self,
        form_id: Uuid,
        ip_address: &str,
        submitter_email: Option<&str>,
    ) -> Result<Option<FormResponse>, AppError>;
}

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Fails with `Conflict` when the new email belongs to another user
    async fn update_user(&self, user: &User) -> Result<(), AppError>;
}

/// Create a PostgreSQL connection pool and verify it can reach the server
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool, AppError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    let created = if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
        cfg.create_pool(Some(Runtime::Tokio1), tls)
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), tokio_postgres::NoTls)
    };
    let pool = created.map_err(|e| AppError::Internal(format!("Failed to create pool: {}", e)))?;

    // Test the connection
    let client = pool.get().await?;
    client.query_one("SELECT 1 as ok", &[]).await?;

    info!(
        "✅ Database connection successful ({}:{}/{}, TLS: {})",
        config.host, config.port, config.database, config.require_tls
    );
    Ok(pool)
}

/// Create tables and indexes if they don't exist
pub async fn init_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    for statement in queries::CREATE_SCHEMA {
        client.execute(*statement, &[]).await?;
    }
    debug!("Schema statements applied: {}", queries::CREATE_SCHEMA.len());
    info!("✅ Database tables initialized");
    Ok(())
}
