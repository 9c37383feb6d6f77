use actix_multipart::form::MultipartFormConfig;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod api;
mod config;
mod db;
mod shutdown;
mod storage;
mod utils;

use crate::api::{
    health::health_config,
    job::{
        handlers::{job_config, status_config},
        JobService,
    },
    tracking::tracking_config,
    validation,
};
use crate::db::status_cache::StatusCache;
use crate::shutdown::ShutdownCoordinator;
use crate::storage::AttachmentStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from environment
    let cfg = config::Config::from_env().expect("Failed to load configuration");

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(&cfg.log_dir).expect("Failed to create logs directory");

    // Initialize file-based logging with daily rotation and level separation
    // Log files will be created as: logs/info.2024-12-22.log, logs/error.2024-12-22.log
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(&cfg.log_dir, "info.log");
    let error_file = tracing_appender::rolling::daily(&cfg.log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    // Console/stdout layer for terminal output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(error_layer)
        .init();

    // Connection pool against the hosted store. The backend owns the schema,
    // its row-level security and the tracking SQL functions; nothing is
    // migrated from here.
    let pool = db::connection::get_connection(&cfg.database_url, cfg.max_db_connections)
        .await
        .expect("Failed to connect to database");

    info!("Starting repairshop-jobs");
    info!("Configuration loaded successfully:");
    info!("  - Bind address: {}", cfg.bind_addr);
    info!("  - Max payload size: {} bytes", cfg.max_payload_size);
    info!("  - Max database connections: {}", cfg.max_db_connections);
    info!("  - Attachments dir: {}", cfg.attachments_dir);
    info!("  - Status cache TTL: {:?}", cfg.status_cache_ttl);
    info!("Database connection pool established");

    // Status reference cache shared across workers
    let status_cache = Arc::new(StatusCache::new(cfg.status_cache_ttl));

    // Clone pool for the HTTP server (original will be used for shutdown)
    let server_pool = pool.clone();
    let server_cfg = cfg.clone();

    let server = HttpServer::new(move || {
        let job_service = web::Data::new(JobService::new(
            server_pool.clone(),
            status_cache.clone(),
        ));
        let attachment_store = web::Data::new(AttachmentStore::new(
            &server_cfg.attachments_dir,
            &server_cfg.public_base_url,
        ));

        // Global payload and multipart/file upload size limits
        let payload_config = web::PayloadConfig::default().limit(server_cfg.max_payload_size);
        let multipart_config =
            MultipartFormConfig::default().total_limit(server_cfg.max_payload_size);

        App::new()
            .app_data(web::Data::new(server_pool.clone())) // Share DB pool across workers
            .app_data(job_service)
            .app_data(attachment_store)
            .app_data(payload_config)
            .app_data(multipart_config)
            .app_data(validation::json_config()) // Global validation config
            .configure(health_config)
            .configure(job_config)
            .configure(status_config)
            .configure(tracking_config)
    });

    info!("Server starting on http://{}", cfg.bind_addr);

    let server = server.bind(cfg.bind_addr.as_str())?.run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(server_handle, server_task, pool);
    coordinator.wait_for_shutdown().await
}
