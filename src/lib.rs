pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::intake::OrderIntake;
use application::materializer::OrderMaterializer;
use domain::ports::AuthGate;
use infrastructure::auth_gate::HttpAuthGate;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::price_client::{HttpPriceResolver, PriceClientConfig};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Addresses of the two remote collaborators plus the shared request
/// timeout for calls to them.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub products_service_url: String,
    pub auth_service_url: String,
    pub timeout: Duration,
}

/// Shared per-process state handed to every request handler.
pub struct AppState {
    pub materializer: OrderMaterializer<DieselOrderRepository, HttpPriceResolver>,
    pub intake: OrderIntake<DieselOrderRepository, HttpPriceResolver>,
    pub gate: Arc<dyn AuthGate>,
}

/// Wire the repository, price resolver and authorization gate into the
/// application services. Clients and pools are created once and shared
/// across requests.
pub fn build_state(pool: DbPool, remotes: &RemoteConfig) -> AppState {
    let repo = Arc::new(DieselOrderRepository::new(pool));
    let prices = Arc::new(HttpPriceResolver::new(PriceClientConfig {
        base_url: remotes.products_service_url.clone(),
        timeout: remotes.timeout,
    }));
    let gate: Arc<dyn AuthGate> =
        Arc::new(HttpAuthGate::new(&remotes.auth_service_url, remotes.timeout));

    AppState {
        materializer: OrderMaterializer::new(repo.clone(), prices.clone()),
        intake: OrderIntake::new(repo, prices),
        gate,
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
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
