pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::address_service::AddressService;
use application::purchase_service::PurchaseService;
use domain::ports::IdentityProvider;
use infrastructure::address_repo::DieselAddressRepository;
use infrastructure::identity_repo::DieselIdentityProvider;
use infrastructure::purchase_repo::DieselPurchaseRepository;

pub use config::Settings;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let purchases = web::Data::new(PurchaseService::new(DieselPurchaseRepository::new(
        pool.clone(),
    )));
    let addresses = web::Data::new(AddressService::new(DieselAddressRepository::new(
        pool.clone(),
    )));
    let identity: web::Data<dyn IdentityProvider> =
        web::Data::from(Arc::new(DieselIdentityProvider::new(pool)) as Arc<dyn IdentityProvider>);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(purchases.clone())
            .app_data(addresses.clone())
            .app_data(identity.clone())
            .app_data(handlers::json_config())
            .wrap(Logger::default())
            .configure(handlers::routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
