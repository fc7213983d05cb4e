mod db;
mod errors;
mod handlers;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::db::memory::MemoryStore;
use crate::db::sqlite::SqliteStore;
use crate::db::LogStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Pick the storage backend: SQLite when DATABASE_URL is set, otherwise
    // an in-memory store that resets on restart.
    let store: Arc<dyn LogStore> = match env::var("DATABASE_URL") {
        Ok(url) => {
            info!("Using SQLite storage at {}", url);
            Arc::new(
                SqliteStore::connect(&url)
                    .await
                    .expect("Failed to open the database"),
            )
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory storage");
            Arc::new(MemoryStore::new())
        }
    };
    let store = web::Data::from(store);

    // Fetch the listening port from an environment variable, default to 3000
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let bind_address = format!("0.0.0.0:{}", port);
    info!("Starting server at {}", bind_address);

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "gymtrack_backend".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .expect("Failed to create Prometheus metrics");

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // Logging middleware
            .wrap(prometheus.clone()) // Prometheus metrics middleware
            .wrap(Cors::permissive()) // CORS for local frontend access
            .app_data(store.clone()) // Injected log store
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
