use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use orders_api::{build_server, build_state, create_pool, run_migrations, RemoteConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let products_service_url =
        env::var("PRODUCTS_SERVICE_URL").expect("PRODUCTS_SERVICE_URL must be set");
    let auth_service_url = env::var("AUTH_SERVICE_URL").expect("AUTH_SERVICE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let timeout_ms: u64 = env::var("PRICE_RESOLVER_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .expect("PRICE_RESOLVER_TIMEOUT_MS must be a valid number");

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    let state = build_state(
        pool,
        &RemoteConfig {
            products_service_url,
            auth_service_url,
            timeout: Duration::from_millis(timeout_ms),
        },
    );

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(state, &host, port)?.await
}
