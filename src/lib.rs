pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::application::{CatalogService, SessionOrderService};
use crate::domain::ports::{OrderRepository, ProductRepository};
use crate::infrastructure::logger::LogLogger;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;

pub use config::Config;
pub use db::{create_pool, run_migrations, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Services shared by every worker of the HTTP server and the cleanup job.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<CatalogService>,
    pub orders: Arc<SessionOrderService>,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        order_retention: chrono::Duration,
    ) -> Self {
        Self {
            products: Arc::new(ProductService::new(
                products,
                Arc::new(LogLogger::new("composable_commerce::catalog")),
            )),
            orders: Arc::new(
                OrderService::new(
                    orders,
                    Arc::new(LogLogger::new("composable_commerce::orders")),
                )
                .with_retention(order_retention),
            ),
        }
    }

    /// Wire the Diesel repositories over `pool`.
    pub fn from_pool(pool: DbPool, config: &Config) -> Result<Self, chrono::OutOfRangeError> {
        let retention = chrono::Duration::from_std(config.order_retention)?;
        Ok(Self::new(
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool)),
            retention,
        ))
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = handlers::ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(state.products.clone()))
            .app_data(web::Data::from(state.orders.clone()))
            .wrap(Logger::default())
            .configure(handlers::configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
