pub mod auth_gate;
pub mod models;
pub mod order_repo;
pub mod price_client;
