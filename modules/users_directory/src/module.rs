use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{layers, routes, token::TokenDecoder};
use crate::config::UsersDirectoryConfig;
use crate::contract::client::UsersDirectoryApi;
use crate::domain::ports::CachePort;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UsersDirectoryLocalClient;
use crate::infra::cache::InMemoryCache;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmUsersRepository;

/// Wired instance of the directory: domain service plus token handling.
#[derive(Clone)]
pub struct UsersDirectory {
    service: Arc<Service>,
    tokens: TokenDecoder,
}

impl UsersDirectory {
    /// Bring the schema up to date.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_directory database migrations");
        Migrator::up(db, None).await?;
        info!("users_directory database migrations completed successfully");
        Ok(())
    }

    /// Wire repositories and the in-memory cache onto `db`.
    pub fn init(db: DatabaseConnection, cfg: &UsersDirectoryConfig) -> Self {
        Self::with_cache(db, Arc::new(InMemoryCache::new()), cfg)
    }

    /// Like [`UsersDirectory::init`] with a caller-supplied cache.
    pub fn with_cache(
        db: DatabaseConnection,
        cache: Arc<dyn CachePort>,
        cfg: &UsersDirectoryConfig,
    ) -> Self {
        info!("Initializing users_directory module");
        debug!(
            "Loaded users_directory config: cache_ttl_secs={}, max_field_length={}, verify_tokens={}, backend={:?}",
            cfg.cache_ttl_secs,
            cfg.max_field_length,
            cfg.token.verify_secret.is_some(),
            db.get_database_backend()
        );

        let repo = Arc::new(SeaOrmUsersRepository::new(db));
        let service_config = ServiceConfig {
            max_field_length: cfg.max_field_length,
            list_cache_ttl: Duration::from_secs(cfg.cache_ttl_secs),
        };
        let service = Service::new(repo.clone(), repo, cache, service_config);

        Self {
            service: Arc::new(service),
            tokens: TokenDecoder::from_secret(cfg.token.verify_secret.as_deref()),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other crates.
    pub fn client(&self) -> Arc<dyn UsersDirectoryApi> {
        Arc::new(UsersDirectoryLocalClient::new(self.service.clone()))
    }

    /// Routes only, without middleware.
    pub fn routes(&self) -> Router {
        info!("Registering users_directory REST routes");
        routes::register_routes(Router::new(), self.service.clone(), self.tokens.clone())
    }

    /// Routes wrapped in the request-id, trace, timeout and body-limit stack.
    pub fn router(&self, timeout: Duration, cors_enabled: bool) -> Router {
        layers::with_http_layers(self.routes(), timeout, cors_enabled)
    }
}
