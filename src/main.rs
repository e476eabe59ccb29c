use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use user_center_service::api;
use user_center_service::config::Config;
use user_center_service::database::{
    MongoCenterRepository, MongoDB, MongoMembershipRepository, MongoUserRepository,
};
use user_center_service::engine::ReconciliationEngine;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    log::info!("🚀 Starting User–Center Service...");
    log::info!("📊 Database: {}", config.database_url);

    // Initialize MongoDB connection
    let db = MongoDB::new(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    log::info!("✅ MongoDB connected successfully");

    let engine = ReconciliationEngine::new(
        Arc::new(MongoUserRepository::new(&db, &config.users_collection)),
        Arc::new(MongoCenterRepository::new(&db, &config.centers_collection)),
        Arc::new(MongoMembershipRepository::new(&db, &config.memberships_collection)),
    )
    .with_membership_timeout(config.membership_fetch_timeout);

    let engine_data = web::Data::new(engine);

    // Initial load; failures leave an empty view and the next reload retries
    log::info!("🔄 Running initial reconciliation...");
    let outcome = engine_data.reload().await;
    if outcome.ready {
        log::info!(
            "✅ Initial view ready ({} failed centers, {} anomalies, {} ambiguities)",
            outcome.failed_centers.len(),
            outcome.anomalies,
            outcome.ambiguities
        );
    } else {
        log::warn!("⚠️  Initial reconciliation failed; serving an empty view until the next reload");
    }

    let host = config.host.clone();
    let port = config.port;
    let config_data = web::Data::new(config);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = config_data
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CACHE_CONTROL,
                actix_web::http::header::PRAGMA,
            ])
            .expose_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(engine_data.clone())
            .app_data(config_data.clone())
            .app_data(web::QueryConfig::default().error_handler(api::users::query_error_handler))
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Reconciled users
            .configure(api::users::configure)
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
