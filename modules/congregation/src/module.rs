use std::sync::Arc;

use modkit_db::DbHandle;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::{openapi::CongregationApiDoc, routes};
use crate::config::CongregationConfig;
use crate::contract::client::CongregationApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::CongregationLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmEventsRepository, SeaOrmUsersRepository};

/// The congregation module: users and events over one database.
///
/// Built once at startup; the REST routes and the in-process client share the
/// same domain service.
#[derive(Clone)]
pub struct Congregation {
    service: Arc<Service>,
}

impl Congregation {
    /// Wire repositories over the handle's SeaORM connection into the service.
    pub fn init(db: &DbHandle, cfg: CongregationConfig) -> anyhow::Result<Self> {
        Self::with_connection(db.sea(), cfg)
    }

    /// Same as [`Congregation::init`] for callers that already hold a connection.
    pub fn with_connection(conn: DatabaseConnection, cfg: CongregationConfig) -> anyhow::Result<Self> {
        info!("Initializing congregation module");
        if cfg.max_page_size == 0 {
            anyhow::bail!("modules.congregation.max_page_size must be greater than zero");
        }
        let default_page_size = if cfg.default_page_size > cfg.max_page_size {
            warn!(
                default_page_size = cfg.default_page_size,
                max_page_size = cfg.max_page_size,
                "default_page_size exceeds max_page_size; using max_page_size"
            );
            cfg.max_page_size
        } else {
            cfg.default_page_size
        };
        debug!(
            "Loaded congregation config: default_page_size={}, max_page_size={}",
            default_page_size, cfg.max_page_size
        );

        let users = SeaOrmUsersRepository::new(conn.clone());
        let events = SeaOrmEventsRepository::new(conn);
        let service = Service::new(
            Arc::new(users),
            Arc::new(events),
            ServiceConfig {
                default_page_size,
                max_page_size: cfg.max_page_size,
            },
        );
        Ok(Self {
            service: Arc::new(service),
        })
    }

    /// Create the `users` and `events` tables if they are missing.
    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running congregation database migrations");
        Migrator::up(db.seaorm(), None).await?;
        info!("Congregation database migrations completed successfully");
        Ok(())
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering congregation REST routes");
        routes::register_routes(router, self.service.clone())
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn CongregationApi> {
        Arc::new(CongregationLocalClient::new(self.service.clone()))
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        CongregationApiDoc::openapi()
    }
}
