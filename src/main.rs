//! Complaints Portal Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use complaints_portal_lib::api;
use complaints_portal_lib::api::auth::SessionTtl;
use complaints_portal_lib::auth::SessionSecret;
use complaints_portal_lib::config::Config;
use complaints_portal_lib::db::DbPool;
use complaints_portal_lib::middleware::RequestLogger;
use complaints_portal_lib::migration::Migrator;
use complaints_portal_lib::models::MAX_ATTACHMENT_SIZE_BYTES;
use complaints_portal_lib::services::{Mailer, Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, PORTAL_SESSION_SECRET, SMTP_HOST,");
            error!("    and S3 credentials must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Complaints Portal Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and S3 credentials");
    }

    // Initialize database
    let pool = DbPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    info!("Database connection established");

    // Run migrations
    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");
    info!("Database migrations complete");

    // Initialize attachment storage
    let storage = Storage::new(&config.s3)
        .await
        .expect("Failed to initialize attachment storage");

    // Initialize the notification mailer
    let mailer = web::Data::new(
        Mailer::new(&config.from_email, config.smtp.as_ref())
            .expect("Failed to initialize mailer"),
    );

    // Prepare shared state
    let bind_address = config.bind_address();
    let session_secret = SessionSecret::new(config.session_secret.clone());
    let session_ttl = SessionTtl(config.session_ttl_secs);
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                ])
                .max_age(3600)
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(mailer.clone())
            .app_data(web::Data::new(session_secret.clone()))
            .app_data(web::Data::new(session_ttl))
            // Leave room for a batch of attachments per submission; the
            // per-file ceiling is enforced in the intake code
            .app_data(web::PayloadConfig::new(MAX_ATTACHMENT_SIZE_BYTES * 12))
            // Configure API routes
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_auth_routes)
                    .configure(api::configure_complaint_routes)
                    .configure(api::configure_staff_routes)
                    .configure(api::configure_attachment_routes),
            )
            // Serve the OpenAPI document and Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            )
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
